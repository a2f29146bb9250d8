use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clothing_item")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Merchant-facing article code, e.g. "TS-001".
    #[sea_orm(unique)]
    pub code: String,
    pub title: String,
    pub description: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((16, 2)))")]
    pub price: Decimal,
    /// Sellable units. Kept >= 0 by guarded decrements.
    pub stock: i32,

    /// Garment category (`tshirt`, `jeans`, ...). Serialized as `type`.
    pub item_type: String,
    pub size: String,
    /// Stored filename of the product image, served by the file routes.
    pub image: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
