use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

pub use super::shared::Pagination;
use super::shared::validate_required_text;

/// Request body for account registration.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "first_name")]
    #[schema(example = "Alice")]
    pub first_name: String,
    #[serde(alias = "last_name")]
    #[schema(example = "Wonder")]
    pub last_name: String,
    #[schema(example = "12 Rabbit Hole Rd")]
    pub address: Option<String>,
    #[schema(example = "+35812345678")]
    pub mobile: Option<String>,
    /// Unique login name.
    #[schema(example = "alice@example.com")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_required_text(&payload.first_name, "First name", 64)?;
    validate_required_text(&payload.last_name, "Last name", 64)?;
    validate_required_text(&payload.username, "Username", 64)?;
    if payload.password.len() < 6 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".into(),
        ));
    }
    Ok(())
}

/// Account profile as exposed over the API. There is deliberately no
/// password field on this type.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<String>,
    pub mobile: Option<String>,
    pub username: String,
    /// Account role: `regular` or `admin`.
    #[serde(rename = "type")]
    #[schema(example = "regular")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            address: m.address,
            mobile: m.mobile,
            username: m.username,
            role: m.role,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token valid for 24 hours.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub user: UserResponse,
}

/// Self-service profile update. Only provided fields change.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub mobile: Option<String>,
}

pub fn validate_update_profile(payload: &UpdateProfileRequest) -> Result<(), AppError> {
    if let Some(ref v) = payload.first_name {
        validate_required_text(v, "First name", 64)?;
    }
    if let Some(ref v) = payload.last_name {
        validate_required_text(v, "Last name", 64)?;
    }
    Ok(())
}

/// Password change request for the authenticated account.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(alias = "current_password")]
    pub current_password: String,
    #[serde(alias = "new_password")]
    pub new_password: String,
}

pub fn validate_change_password(payload: &ChangePasswordRequest) -> Result<(), AppError> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(AppError::Validation(
            "Current password and new password are required".into(),
        ));
    }
    if payload.new_password.len() < 6 || payload.new_password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 6-128 characters".into(),
        ));
    }
    Ok(())
}

/// Admin edit of an arbitrary account. Only provided fields change.
#[derive(Deserialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub mobile: Option<String>,
    /// Target role: `regular` or `admin`.
    #[serde(rename = "type", alias = "role")]
    pub role: Option<String>,
}

pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref v) = payload.first_name {
        validate_required_text(v, "First name", 64)?;
    }
    if let Some(ref v) = payload.last_name {
        validate_required_text(v, "Last name", 64)?;
    }
    if let Some(ref role) = payload.role
        && role != user::DEFAULT_ROLE
        && role != user::ADMIN_ROLE
    {
        return Err(AppError::Validation(
            "Type must be one of: regular, admin".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
    pub pagination: Pagination,
}
