use axum::{extract::FromRequestParts, http::request::Parts};

use crate::entity::user;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated account extracted from the `Authorization: Bearer <token>`
/// header.
///
/// Add this as a handler parameter to require authentication. Admin-only
/// handlers additionally call `require_admin()` in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    /// Returns `Ok(())` for admin accounts, `Err(AdminRequired)` otherwise.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == user::ADMIN_ROLE {
            Ok(())
        } else {
            Err(AppError::AdminRequired)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            role: claims.role,
        })
    }
}
