use chrono::{DateTime, Utc};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::order::{self, Address, LineItem, OrderLine};
use crate::error::AppError;

pub use super::shared::Pagination;

/// One requested line at checkout.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    /// Catalog item id.
    #[serde(alias = "item_id")]
    pub item_id: i32,
    /// Requested quantity, must be positive.
    #[schema(example = 2)]
    pub pieces: i32,
}

/// Checkout request. Guest checkout is allowed: `userId` is optional
/// and never inferred from a token.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    #[serde(alias = "contact_number")]
    pub contact_number: Option<String>,
    #[serde(alias = "billing_address")]
    pub billing_address: Option<Address>,
    #[serde(alias = "shipping_address")]
    pub shipping_address: Option<Address>,
    #[serde(alias = "user_id")]
    pub user_id: Option<i32>,
}

fn validate_address(address: &Address, name: &str) -> Result<(), AppError> {
    let complete = !address.street.trim().is_empty()
        && !address.city.trim().is_empty()
        && !address.state.trim().is_empty()
        && !address.zip_code.trim().is_empty()
        && !address.country.trim().is_empty();
    if !complete {
        return Err(AppError::Validation(format!("{name} is incomplete")));
    }
    Ok(())
}

pub fn validate_place_order(payload: &PlaceOrderRequest) -> Result<(), AppError> {
    let contact = payload
        .contact_number
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let (Some(billing), Some(shipping)) = (
        payload.billing_address.as_ref(),
        payload.shipping_address.as_ref(),
    ) else {
        return Err(AppError::Validation("Missing required fields".into()));
    };
    if contact.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }
    validate_address(billing, "Billing address")?;
    validate_address(shipping, "Shipping address")?;

    if payload.items.is_empty() {
        return Err(AppError::Validation(
            "Order must contain at least one item".into(),
        ));
    }
    if payload.items.iter().any(|line| line.pieces <= 0) {
        return Err(AppError::Validation("Invalid item format in order".into()));
    }
    Ok(())
}

/// Build the frozen order line for a snapshot taken at validation time.
/// The subtotal is fixed here and never recomputed from the catalog.
pub fn line_snapshot(item: LineItem, pieces: i32) -> OrderLine {
    let subtotal = item.price * Decimal::from(pieces);
    OrderLine {
        item,
        pieces,
        subtotal,
    }
}

/// Sum of the frozen line subtotals.
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(|line| line.subtotal).sum()
}

/// Order as exposed over the API.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    #[schema(example = "3F9A01BC")]
    pub tracking_code: String,
    #[schema(example = "placed")]
    pub status: String,
    #[schema(example = "Cash on delivery")]
    pub payment_method: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub contact_number: String,
    pub billing_address: Address,
    pub shipping_address: Address,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order::Model> for OrderResponse {
    fn from(m: order::Model) -> Self {
        Self {
            id: m.id,
            tracking_code: m.tracking_code,
            status: m.status,
            payment_method: m.payment_method,
            items: m.items.0,
            total: m.total,
            contact_number: m.contact_number,
            billing_address: m.billing_address,
            shipping_address: m.shipping_address,
            user_id: m.user_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct OrderListResponse {
    pub items: Vec<OrderResponse>,
    pub pagination: Pagination,
}

/// Admin listing filters.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct OrderListQuery {
    /// Filter by order status.
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Pagination for the authenticated account's own history.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserOrderListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "processing")]
    pub status: Option<String>,
}

pub fn validate_status(status: Option<&str>) -> Result<&str, AppError> {
    match status {
        Some(s) if order::STATUSES.contains(&s) => Ok(s),
        _ => Err(AppError::Validation(
            "Invalid status. Must be one of: placed, processing, delivered, canceled".into(),
        )),
    }
}
