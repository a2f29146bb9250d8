use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::clothing_item;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::item::*;
use crate::models::shared::{Pagination, SuccessResponse, page_and_limit};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Items",
    operation_id = "listItems",
    summary = "Browse the catalog",
    description = "Public, paginated listing, newest first. Supports exact filters on code, \
        type and size, case-insensitive title search, an inclusive price range, and a \
        stock-status flag (`true`: in stock, `false`: sold out). snake_case query keys are \
        accepted alongside camelCase.",
    params(ItemListQuery),
    responses(
        (status = 200, description = "Page of catalog items", body = ItemListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<ItemListResponse>, AppError> {
    let (page, limit) = page_and_limit(query.page, query.limit);

    let mut select = clothing_item::Entity::find();

    if let Some(ref code) = query.code {
        select = select.filter(clothing_item::Column::Code.eq(code));
    }
    if let Some(ref item_type) = query.item_type {
        select = select.filter(clothing_item::Column::ItemType.eq(item_type));
    }
    if let Some(ref size) = query.size {
        select = select.filter(clothing_item::Column::Size.eq(size));
    }
    if let Some(ref title) = query.title {
        let term = escape_like(title.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(clothing_item::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(start_price) = query.start_price {
        select = select.filter(clothing_item::Column::Price.gte(start_price));
    }
    if let Some(end_price) = query.end_price {
        select = select.filter(clothing_item::Column::Price.lte(end_price));
    }
    match query.stock_status {
        Some(true) => select = select.filter(clothing_item::Column::Stock.gt(0)),
        Some(false) => select = select.filter(clothing_item::Column::Stock.lte(0)),
        None => {}
    }

    let total = select.clone().paginate(&state.db, limit).num_items().await?;

    let items = select
        .order_by_desc(clothing_item::Column::CreatedAt)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(ItemListResponse {
        items: items.into_iter().map(ItemResponse::from).collect(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Items",
    operation_id = "getItem",
    summary = "Get a catalog item by ID",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Catalog item", body = ItemResponse),
        (status = 404, description = "Item not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = find_item(&state.db, id).await?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Items",
    operation_id = "createItem",
    summary = "Create a catalog item",
    description = "Requires an admin token. The article code must be unique.",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Validation error or duplicate code", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(code = %payload.code))]
pub async fn create_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_item(&payload)?;

    let code = payload.code.trim().to_string();

    let existing = clothing_item::Entity::find()
        .filter(clothing_item::Column::Code.eq(&code))
        .count(&state.db)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(format!(
            "Item already exists with code {code}"
        )));
    }

    let now = chrono::Utc::now();
    let new_item = clothing_item::ActiveModel {
        code: Set(code.clone()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        item_type: Set(payload.item_type.trim().to_string()),
        size: Set(payload.size.trim().to_string()),
        image: Set(payload.image),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_item
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict(format!("Item already exists with code {code}"))
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(ItemResponse::from(model))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Items",
    operation_id = "updateItem",
    summary = "Update a catalog item",
    description = "Only provided fields are modified; the article code is immutable. \
        Requires an admin token.",
    params(("id" = i32, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_item(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_item(&txn, id).await?;
    let mut active: clothing_item::ActiveModel = existing.into();

    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(item_type) = payload.item_type {
        active.item_type = Set(item_type.trim().to_string());
    }
    if let Some(size) = payload.size {
        active.size = Set(size.trim().to_string());
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Items",
    operation_id = "deleteItem",
    summary = "Delete a catalog item",
    description = "Requires an admin token. Existing orders keep their frozen snapshots of \
        the item; canceling such an order afterwards simply finds no stock row to restore.",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Item not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_item(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    auth_user.require_admin()?;

    find_item(&state.db, id).await?;
    clothing_item::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

pub(crate) async fn find_item<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<clothing_item::Model, AppError> {
    clothing_item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))
}
