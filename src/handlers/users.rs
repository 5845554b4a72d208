use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::CurrentUser,
    models::user::{Role, UserPublic},
    response::ApiResponse,
    services::{auth as auth_service, users as user_service},
    state::AppState,
};

/// The request payload for creating a user (admin).
#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
    #[garde(skip)]
    pub role: Option<Role>,
}

/// The request payload for profile updates. Role is immutable and has no
/// field here.
#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[garde(inner(length(min = 1, max = 100)))]
    pub name: Option<String>,
    #[garde(inner(email))]
    pub email: Option<String>,
}

fn validation(report: garde::Report) -> AppError {
    AppError::Validation(report.to_string())
}

/// Lists all users (admin).
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Response> {
    let users = user_service::list_users(&state).await?;
    let users: Vec<UserPublic> = users.into_iter().map(UserPublic::from).collect();

    let response = ApiResponse::success("Users retrieved successfully", users);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Fetches a user by ID (admin).
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response> {
    let user = user_service::get_user(&state, user_id).await?;

    let response = ApiResponse::success("User retrieved successfully", UserPublic::from(user));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// The authenticated user's own profile.
#[axum::debug_handler]
pub async fn get_me(Extension(current): Extension<CurrentUser>) -> Result<Response> {
    let response = ApiResponse::success("User retrieved successfully", UserPublic::from(current.0));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Creates a user (admin).
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    auth_service::register(
        &state,
        payload.name.trim(),
        &payload.email,
        &payload.password,
        payload.role,
    )
    .await?;

    let response = ApiResponse::message("User created successfully");
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Updates a user by ID (admin).
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    let user = user_service::update_user(
        &state,
        user_id,
        payload.name.as_deref(),
        payload.email.as_deref(),
    )
    .await?;

    let response = ApiResponse::success("User updated successfully", UserPublic::from(user));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Updates the authenticated user's own profile.
#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    let user = user_service::update_user(
        &state,
        current.0.id,
        payload.name.as_deref(),
        payload.email.as_deref(),
    )
    .await?;

    let response = ApiResponse::success("User updated successfully", UserPublic::from(user));
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Deletes a user by ID (admin).
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response> {
    user_service::delete_user(&state, user_id).await?;

    let response = ApiResponse::message("User deleted successfully");
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Deletes the authenticated user's own account. Their outstanding tokens
/// stop authenticating immediately.
#[axum::debug_handler]
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    user_service::delete_user(&state, current.0.id).await?;

    let response = ApiResponse::message("User deleted successfully");
    Ok((StatusCode::OK, Json(response)).into_response())
}
