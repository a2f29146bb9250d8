use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/users", user_routes())
        .nest("/items", item_routes())
        .nest("/orders", order_routes())
        .nest("/files", file_routes())
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::register))
        .routes(routes!(handlers::user::login))
        .routes(routes!(handlers::user::me, handlers::user::update_me))
        .routes(routes!(handlers::user::change_password))
        .routes(routes!(handlers::user::list_users))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user,
            handlers::user::delete_user
        ))
}

fn item_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::item::list_items,
            handlers::item::create_item
        ))
        .routes(routes!(
            handlers::item::get_item,
            handlers::item::update_item,
            handlers::item::delete_item
        ))
}

fn order_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::order::place_order,
            handlers::order::list_orders
        ))
        .routes(routes!(handlers::order::track_order))
        .routes(routes!(handlers::order::list_user_orders))
        .routes(routes!(handlers::order::get_order))
        .routes(routes!(handlers::order::update_order_status))
}

fn file_routes() -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::file::upload_file))
        .layer(handlers::file::upload_body_limit());

    let fetch = OpenApiRouter::new().routes(routes!(handlers::file::get_file));

    upload.merge(fetch)
}
