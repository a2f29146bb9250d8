use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::order::{self, LineItem, OrderLine, OrderLines};
use crate::entity::{clothing_item, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::order::*;
use crate::models::shared::{Pagination, page_and_limit};
use crate::state::AppState;
use crate::utils::tracking;

/// Re-rolls before giving up on an unclaimed tracking code. With a
/// 2^32 code space this only trips when the shop has sold out the
/// space itself.
const MAX_TRACKING_CODE_ATTEMPTS: u32 = 8;

#[utoipa::path(
    post,
    path = "/",
    tag = "Orders",
    operation_id = "placeOrder",
    summary = "Place an order",
    description = "Public endpoint; guest checkout is allowed via the optional `userId`. \
        Validation, stock decrements and the order insert run in one transaction: \
        every line is checked and decremented under a row lock, so concurrent orders \
        cannot jointly overdraw stock, and a failed line rolls the whole order back.",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Validation error or insufficient stock", body = ErrorBody),
        (status = 404, description = "A requested item does not exist", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn place_order(
    State(state): State<AppState>,
    AppJson(payload): AppJson<PlaceOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_place_order(&payload)?;

    let PlaceOrderRequest {
        items,
        contact_number: Some(contact_number),
        billing_address: Some(billing_address),
        shipping_address: Some(shipping_address),
        user_id,
    } = payload
    else {
        return Err(AppError::Validation("Missing required fields".into()));
    };

    let txn = state.db.begin().await?;

    if let Some(uid) = user_id {
        let known = user::Entity::find_by_id(uid).count(&txn).await?;
        if known == 0 {
            return Err(AppError::Validation("Unknown user for order".into()));
        }
    }

    let mut lines = Vec::with_capacity(items.len());
    for requested in &items {
        let item = find_item_for_update(&txn, requested.item_id).await?;
        if item.stock < requested.pieces {
            return Err(AppError::InsufficientStock(format!(
                "Not enough stock for item {}",
                item.title
            )));
        }

        decrement_stock(&txn, item.id, requested.pieces, &item.title).await?;

        lines.push(line_snapshot(
            LineItem {
                id: item.id,
                code: item.code,
                title: item.title,
                price: item.price,
                size: item.size,
                item_type: item.item_type,
                image: item.image,
            },
            requested.pieces,
        ));
    }

    let total = order_total(&lines);
    let tracking_code = unique_tracking_code(&txn).await?;

    let now = chrono::Utc::now();
    let new_order = order::ActiveModel {
        tracking_code: Set(tracking_code),
        status: Set(order::STATUS_PLACED.to_string()),
        payment_method: Set(order::PAYMENT_METHOD.to_string()),
        items: Set(OrderLines(lines)),
        total: Set(total),
        contact_number: Set(contact_number.trim().to_string()),
        billing_address: Set(billing_address),
        shipping_address: Set(shipping_address),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_order.insert(&txn).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/track/{tracking_code}",
    tag = "Orders",
    operation_id = "trackOrder",
    summary = "Look up an order by its tracking code",
    description = "Public, anonymous lookup for the code handed out at checkout.",
    params(("tracking_code" = String, Path, description = "8-character tracking code")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(tracking_code = %tracking_code))]
pub async fn track_order(
    State(state): State<AppState>,
    Path(tracking_code): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = order::Entity::find()
        .filter(order::Column::TrackingCode.eq(tracking_code))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    Ok(Json(order.into()))
}

#[utoipa::path(
    get,
    path = "/user",
    tag = "Orders",
    operation_id = "listOwnOrders",
    summary = "List the authenticated account's orders",
    description = "Paginated, newest first.",
    params(UserOrderListQuery),
    responses(
        (status = 200, description = "Page of orders", body = OrderListResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_user_orders(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserOrderListQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    let (page, limit) = page_and_limit(query.page, query.limit);

    let select = order::Entity::find().filter(order::Column::UserId.eq(auth_user.user_id));
    let total = select.clone().paginate(&state.db, limit).num_items().await?;

    let orders = select
        .order_by_desc(order::Column::CreatedAt)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(OrderListResponse {
        items: orders.into_iter().map(OrderResponse::from).collect(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Orders",
    operation_id = "getOrder",
    summary = "Get an order by ID",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_order(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, AppError> {
    auth_user.require_admin()?;

    let order = find_order(&state.db, id).await?;
    Ok(Json(order.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Orders",
    operation_id = "updateOrderStatus",
    summary = "Transition an order's status",
    description = "Requires an admin token. Entering `canceled` restores every line's pieces \
        to the item's stock; leaving `canceled` re-decrements them, failing the whole \
        transition when stock no longer covers a line. The stock adjustments and the status \
        update commit as one transaction, so repeating cancel/uncancel/cancel nets out to a \
        single cancel.",
    params(("id" = i32, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Invalid status or insufficient stock to uncancel", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_order_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateOrderStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    auth_user.require_admin()?;
    let status = validate_status(payload.status.as_deref())?.to_string();

    let txn = state.db.begin().await?;
    let existing = find_order_for_update(&txn, id).await?;

    // Stock side effects only on the cancellation boundary.
    if status == order::STATUS_CANCELED && existing.status != order::STATUS_CANCELED {
        restore_stock(&txn, &existing.items.0).await?;
    } else if status != order::STATUS_CANCELED && existing.status == order::STATUS_CANCELED {
        redecrement_stock(&txn, &existing.items.0).await?;
    }

    let mut active: order::ActiveModel = existing.into();
    active.status = Set(status);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Orders",
    operation_id = "listOrders",
    summary = "List all orders",
    description = "Requires an admin token. Paginated, newest first, optionally filtered by status.",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Page of orders", body = OrderListResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_orders(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderListResponse>, AppError> {
    auth_user.require_admin()?;

    let (page, limit) = page_and_limit(query.page, query.limit);

    let mut select = order::Entity::find();
    if let Some(ref status) = query.status {
        select = select.filter(order::Column::Status.eq(status));
    }

    let total = select.clone().paginate(&state.db, limit).num_items().await?;

    let orders = select
        .order_by_desc(order::Column::CreatedAt)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(OrderListResponse {
        items: orders.into_iter().map(OrderResponse::from).collect(),
        pagination: Pagination::new(total, page, limit),
    }))
}

async fn find_order<C: ConnectionTrait>(db: &C, id: i32) -> Result<order::Model, AppError> {
    order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))
}

async fn find_order_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<order::Model, AppError> {
    use sea_orm::sea_query::LockType;
    order::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))
}

async fn find_item_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<clothing_item::Model, AppError> {
    use sea_orm::sea_query::LockType;
    clothing_item::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with ID {id} not found")))
}

/// Conditionally take `pieces` units off an item's stock. The guard
/// keeps stock non-negative even if the caller's check is stale.
async fn decrement_stock<C: ConnectionTrait>(
    db: &C,
    item_id: i32,
    pieces: i32,
    title: &str,
) -> Result<(), AppError> {
    let result = clothing_item::Entity::update_many()
        .col_expr(
            clothing_item::Column::Stock,
            Expr::col(clothing_item::Column::Stock).sub(pieces),
        )
        .filter(clothing_item::Column::Id.eq(item_id))
        .filter(clothing_item::Column::Stock.gte(pieces))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::InsufficientStock(format!(
            "Not enough stock for item {title}"
        )));
    }
    Ok(())
}

/// Give every line's pieces back to its item. Items deleted from the
/// catalog since placement are skipped.
async fn restore_stock(txn: &DatabaseTransaction, lines: &[OrderLine]) -> Result<(), AppError> {
    for line in lines {
        clothing_item::Entity::update_many()
            .col_expr(
                clothing_item::Column::Stock,
                Expr::col(clothing_item::Column::Stock).add(line.pieces),
            )
            .filter(clothing_item::Column::Id.eq(line.item.id))
            .exec(txn)
            .await?;
    }
    Ok(())
}

/// Re-apply the decrements of a previously canceled order. Fails (and
/// thereby rolls back the transition) when any line can no longer be
/// covered, including lines whose item was deleted meanwhile.
async fn redecrement_stock(txn: &DatabaseTransaction, lines: &[OrderLine]) -> Result<(), AppError> {
    for line in lines {
        decrement_stock(txn, line.item.id, line.pieces, &line.item.title).await?;
    }
    Ok(())
}

/// Draw tracking codes until one is unclaimed. Runs inside the
/// placement transaction; the unique index on the column backs this up
/// against a concurrent claim of the same code.
async fn unique_tracking_code<C: ConnectionTrait>(db: &C) -> Result<String, AppError> {
    for _ in 0..MAX_TRACKING_CODE_ATTEMPTS {
        let code = tracking::generate_tracking_code();
        let taken = order::Entity::find()
            .filter(order::Column::TrackingCode.eq(&code))
            .count(db)
            .await?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::Internal(
        "Failed to allocate a unique tracking code".into(),
    ))
}
