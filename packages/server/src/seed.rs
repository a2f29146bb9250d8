use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AppConfig;
use crate::entity::{order, user};
use crate::utils::hash;

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for the admin order listing:
    // SELECT ... FROM "order" WHERE status = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_order_status_created")
        .table(order::Entity)
        .col(order::Column::Status)
        .col(order::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_order_status_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_order_status_created: {}", e);
        }
    }

    // Composite index for a user's order history:
    // SELECT ... FROM "order" WHERE user_id = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_order_user_created")
        .table(order::Entity)
        .col(order::Column::UserId)
        .col(order::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_order_user_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_order_user_created: {}", e);
        }
    }

    Ok(())
}

/// Create the bootstrap admin account when one is configured and no
/// admin exists yet. Registration only ever produces regular accounts,
/// so a fresh deployment needs this to get its first admin.
pub async fn seed_admin_user(db: &DatabaseConnection, config: &AppConfig) -> Result<(), DbErr> {
    let (Some(username), Some(password)) = (
        config.auth.bootstrap_admin_username.as_deref(),
        config.auth.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    let admin_count = user::Entity::find()
        .filter(user::Column::Role.eq(user::ADMIN_ROLE))
        .count(db)
        .await?;
    if admin_count > 0 {
        return Ok(());
    }

    let hashed = hash::hash_password(password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let admin = user::ActiveModel {
        first_name: Set("Admin".to_string()),
        last_name: Set("User".to_string()),
        username: Set(username.to_string()),
        password: Set(hashed),
        role: Set(user::ADMIN_ROLE.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match user::Entity::insert(admin)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
    {
        Ok(_) => {
            info!("Seeded bootstrap admin user '{}'", username);
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}
