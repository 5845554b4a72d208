use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::Result,
    middleware_layer::auth::CurrentUser,
    response::ApiResponse,
    services::chat as chat_service,
    state::AppState,
};

/// The request payload for a generation.
#[derive(Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// The query parameters for paging through chat history.
#[derive(Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Usage counters (shared by both providers - they draw on one budget).
#[axum::debug_handler]
pub async fn usage(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let usage = chat_service::usage(&state, current.0.id).await?;

    let response = ApiResponse::success("API usage fetched successfully", usage);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Generates a response through OpenAI.
#[axum::debug_handler]
pub async fn gpt_generate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Response> {
    let result =
        chat_service::generate(&state, &*state.openai, current.0.id, &payload.prompt).await?;

    let response = ApiResponse::success("Response generated successfully", result);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Generates a response through Gemini.
#[axum::debug_handler]
pub async fn gemini_generate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Response> {
    let result =
        chat_service::generate(&state, &*state.gemini, current.0.id, &payload.prompt).await?;

    let response = ApiResponse::success("Response generated successfully", result);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// A page of the caller's chat history, newest first.
#[axum::debug_handler]
pub async fn history(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response> {
    let history = chat_service::history(
        &state,
        current.0.id,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(10),
    )
    .await?;

    let response = ApiResponse::success("Chat history fetched successfully", history);
    Ok((StatusCode::OK, Json(response)).into_response())
}
