use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The role assigned to newly registered accounts.
pub const DEFAULT_ROLE: &str = "regular";

/// The role required for management endpoints.
pub const ADMIN_ROLE: &str = "admin";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub mobile: Option<String>,

    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC hash, never the plaintext.
    pub password: String,
    /// One of: `regular`, `admin`.
    pub role: String,

    #[sea_orm(has_many)]
    pub orders: HasMany<super::order::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
