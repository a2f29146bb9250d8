use chrono::{DateTime, Utc};
use sea_orm::prelude::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::clothing_item;
use crate::error::AppError;

pub use super::shared::{Pagination, escape_like};
use super::shared::validate_required_text;

/// Catalog item as exposed over the API.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i32,
    #[schema(example = "TS-001")]
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    #[serde(rename = "type")]
    #[schema(example = "tshirt")]
    pub item_type: String,
    #[schema(example = "m")]
    pub size: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<clothing_item::Model> for ItemResponse {
    fn from(m: clothing_item::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            title: m.title,
            description: m.description,
            price: m.price,
            stock: m.stock,
            item_type: m.item_type,
            size: m.size,
            image: m.image,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub pagination: Pagination,
}

/// Catalog browse filters. snake_case keys are accepted alongside the
/// camelCase ones.
#[derive(Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    /// Exact article code.
    pub code: Option<String>,
    /// Exact garment category.
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    /// Exact size value.
    pub size: Option<String>,
    /// Case-insensitive substring match on the title.
    pub title: Option<String>,
    /// Inclusive lower price bound.
    #[serde(alias = "start_price")]
    pub start_price: Option<Decimal>,
    /// Inclusive upper price bound.
    #[serde(alias = "end_price")]
    pub end_price: Option<Decimal>,
    /// `true`: only items with stock > 0; `false`: only items out of stock.
    #[serde(alias = "stock_status")]
    pub stock_status: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[schema(example = "TS-001")]
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "19.90")]
    pub price: Decimal,
    #[schema(example = 25)]
    pub stock: i32,
    #[serde(rename = "type")]
    #[schema(example = "tshirt")]
    pub item_type: String,
    #[schema(example = "m")]
    pub size: String,
    /// Stored filename returned by the upload endpoint.
    pub image: Option<String>,
}

pub fn validate_create_item(req: &CreateItemRequest) -> Result<(), AppError> {
    validate_required_text(&req.code, "Code", 64)?;
    validate_required_text(&req.title, "Title", 256)?;
    validate_required_text(&req.item_type, "Type", 64)?;
    validate_required_text(&req.size, "Size", 64)?;
    if req.price <= Decimal::ZERO {
        return Err(AppError::Validation("Price must be positive".into()));
    }
    if req.stock < 0 {
        return Err(AppError::Validation("Stock cannot be negative".into()));
    }
    Ok(())
}

/// Partial update; the article code is immutable.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub size: Option<String>,
    pub image: Option<String>,
}

pub fn validate_update_item(req: &UpdateItemRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_required_text(title, "Title", 256)?;
    }
    if let Some(ref item_type) = req.item_type {
        validate_required_text(item_type, "Type", 64)?;
    }
    if let Some(ref size) = req.size {
        validate_required_text(size, "Size", 64)?;
    }
    if let Some(price) = req.price
        && price <= Decimal::ZERO
    {
        return Err(AppError::Validation("Price must be positive".into()));
    }
    if let Some(stock) = req.stock
        && stock < 0
    {
        return Err(AppError::Validation("Stock cannot be negative".into()));
    }
    Ok(())
}
