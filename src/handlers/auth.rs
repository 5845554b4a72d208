use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::user::{Role, UserPublic},
    response::ApiResponse,
    services::auth as auth_service,
    state::AppState,
};

/// The request payload for user registration.
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[garde(length(min = 1, max = 100))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
    #[garde(skip)]
    pub role: Option<Role>,
}

/// The request payload for user login.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub password: String,
}

/// The request payload for refreshing a token pair.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[garde(length(min = 1))]
    pub refresh_token: String,
}

/// The token pair returned by login and refresh.
#[derive(Serialize)]
pub struct Tokens {
    pub access: String,
    pub refresh: String,
}

/// The data payload for successful login/refresh.
#[derive(Serialize)]
pub struct AuthData {
    pub tokens: Tokens,
    pub user: UserPublic,
}

fn validation(report: garde::Report) -> AppError {
    AppError::Validation(report.to_string())
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;
    tracing::info!("📝 Register attempt: {}", payload.email);

    auth_service::register(
        &state,
        payload.name.trim(),
        &payload.email,
        &payload.password,
        payload.role,
    )
    .await?;

    let response = ApiResponse::message("User registered successfully");
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    let (tokens, user) = auth_service::login(&state, &payload.email, &payload.password).await?;

    let response = ApiResponse::success(
        "Login successful",
        AuthData {
            tokens: Tokens {
                access: tokens.access,
                refresh: tokens.refresh,
            },
            user: user.into(),
        },
    );
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Exchanges a refresh token for a fresh pair.
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    let (tokens, user) = auth_service::refresh(&state, &payload.refresh_token).await?;

    let response = ApiResponse::success(
        "Token refreshed successfully",
        AuthData {
            tokens: Tokens {
                access: tokens.access,
                refresh: tokens.refresh,
            },
            user: user.into(),
        },
    );
    Ok((StatusCode::OK, Json(response)).into_response())
}
