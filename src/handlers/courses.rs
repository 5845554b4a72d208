use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::{
    error::Result,
    response::ApiResponse,
    services::{courses as course_service, enrollments as enrollment_service},
    state::AppState,
};

/// Lists all courses (public).
#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> Result<Response> {
    let courses = course_service::list_courses(&state).await?;

    let response = ApiResponse::success("Courses fetched successfully", courses);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Fetches a course by ID (public).
#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    let course = course_service::get_course(&state, course_id).await?;

    let response = ApiResponse::success("Course fetched successfully", course);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Lists a course's active roster (instructor/admin).
#[axum::debug_handler]
pub async fn course_enrollments(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    let enrollments = enrollment_service::list_for_course(&state, course_id).await?;

    let response = ApiResponse::success("Enrollments fetched successfully", enrollments);
    Ok((StatusCode::OK, Json(response)).into_response())
}
