use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uploaded_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Server-generated name on disk: `<uuid-v4><original extension>`.
    #[sea_orm(unique)]
    pub filename: String,
    pub original_name: String,
    pub content_type: String,
    pub size: i64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
