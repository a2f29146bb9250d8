use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{order, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, SuccessResponse, page_and_limit};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    operation_id = "registerUser",
    summary = "Register a new account",
    description = "Creates a regular account. The password is stored as an Argon2 hash.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation error or username taken", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let username = payload.username.trim().to_string();

    let taken = user::Entity::find()
        .filter(user::Column::Username.eq(&username))
        .count(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Username already exists".into()));
    }

    let hashed = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        address: Set(payload.address),
        mobile: Set(payload.mobile),
        username: Set(username),
        password: Set(hashed),
        role: Set(user::DEFAULT_ROLE.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_user
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                tracing::debug!("Registration race: unique constraint caught on insert");
                AppError::Conflict("Username already exists".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    operation_id = "login",
    summary = "Verify credentials and issue a bearer token",
    description = "Returns a JWT valid for 24 hours together with the account profile. \
        Unknown usernames and wrong passwords are indistinguishable.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.trim()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::sign(
        user.id,
        &user.username,
        &user.role,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    operation_id = "getOwnProfile",
    summary = "Fetch the authenticated account's profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/me",
    tag = "Users",
    operation_id = "updateOwnProfile",
    summary = "Update the authenticated account's profile",
    description = "Only provided fields are modified.",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Account no longer exists", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_update_profile(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_user(&txn, auth_user.user_id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(mobile) = payload.mobile {
        active.mobile = Set(Some(mobile));
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/me/password",
    tag = "Users",
    operation_id = "changeOwnPassword",
    summary = "Change the authenticated account's password",
    description = "Requires the current password; the new one is re-hashed with a fresh salt.",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized or current password incorrect", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    validate_change_password(&payload)?;

    let user = find_user(&state.db, auth_user.user_id).await?;

    let is_valid = hash::verify_password(&payload.current_password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let hashed = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: user::ActiveModel = user.into();
    active.password = Set(hashed);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List accounts",
    description = "Paginated, newest first. Requires an admin token.",
    params(UserListQuery),
    responses(
        (status = 200, description = "Account list", body = UserListResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_admin()?;

    let (page, limit) = page_and_limit(query.page, query.limit);

    let select = user::Entity::find();
    let total = select.clone().paginate(&state.db, limit).num_items().await?;

    let users = select
        .order_by_desc(user::Column::CreatedAt)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(UserListResponse {
        items: users.into_iter().map(UserResponse::from).collect(),
        pagination: Pagination::new(total, page, limit),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    operation_id = "getUser",
    summary = "Get an account by ID",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;

    let user = find_user(&state.db, id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update an account",
    description = "Only provided fields are modified; `type` may promote to or demote from admin.",
    params(("id" = i32, Path, description = "Account ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_user(&payload)?;

    let txn = state.db.begin().await?;
    let existing = find_user(&txn, id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(mobile) = payload.mobile {
        active.mobile = Set(Some(mobile));
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete an account",
    description = "Orders placed by the account keep their frozen snapshots; only the account row is removed.",
    params(("id" = i32, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted", body = SuccessResponse),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SuccessResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    find_user(&txn, id).await?;

    // Detach order history before the delete; snapshots stay intact.
    order::Entity::update_many()
        .col_expr(order::Column::UserId, Expr::value(Option::<i32>::None))
        .filter(order::Column::UserId.eq(id))
        .exec(&txn)
        .await?;

    user::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    Ok(Json(SuccessResponse::ok()))
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}
