use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The only payment method the shop offers.
pub const PAYMENT_METHOD: &str = "Cash on delivery";

pub const STATUS_PLACED: &str = "placed";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_CANCELED: &str = "canceled";

/// Every status an order can take.
pub const STATUSES: &[&str] = &[
    STATUS_PLACED,
    STATUS_PROCESSING,
    STATUS_DELIVERED,
    STATUS_CANCELED,
];

/// Postal address as submitted at checkout.
/// Stored as JSON on the order document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(alias = "zip_code")]
    pub zip_code: String,
    pub country: String,
}

/// Frozen copy of a catalog item's descriptive fields at order time.
/// Later catalog edits never touch it; `id` is kept only for stock
/// adjustments on cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub price: Decimal,
    pub size: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub image: Option<String>,
}

/// One order line: the snapshot plus quantity and the subtotal
/// computed at placement time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item: LineItem,
    pub pieces: i32,
    pub subtotal: Decimal,
}

/// Line list stored as a JSON array in the database.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, utoipa::ToSchema)]
#[serde(transparent)]
pub struct OrderLines(pub Vec<OrderLine>);

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Public lookup code: 8 uppercase hex characters.
    #[sea_orm(unique)]
    pub tracking_code: String,
    /// One of: `placed`, `processing`, `delivered`, `canceled`.
    pub status: String,
    pub payment_method: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub items: OrderLines,
    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub total: Decimal,

    pub contact_number: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub billing_address: Address,
    #[sea_orm(column_type = "JsonBinary")]
    pub shipping_address: Address,

    /// NULL for guest checkouts.
    pub user_id: Option<i32>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: Option<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
