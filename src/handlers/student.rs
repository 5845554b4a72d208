use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::Result,
    middleware_layer::auth::CurrentUser,
    response::ApiResponse,
    services::enrollments as enrollment_service,
    state::AppState,
};

/// Enrolls the caller in a course.
///
/// A re-enrollment after a drop reactivates the pair's existing record; the
/// response carries the same enrollment id either way.
#[axum::debug_handler]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    let enrollment = enrollment_service::enroll(&state, current.0.id, course_id).await?;

    let response = ApiResponse::success("Enrolled in course successfully", enrollment);
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Lists the caller's current enrollments.
#[axum::debug_handler]
pub async fn enrolled_courses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let enrollments = enrollment_service::list_enrolled(&state, current.0.id).await?;

    let response = ApiResponse::success("Enrolled courses fetched successfully", enrollments);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Drops a course the caller is enrolled in.
#[axum::debug_handler]
pub async fn drop_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    enrollment_service::drop_course(&state, current.0.id, course_id).await?;

    let response = ApiResponse::message("Course dropped successfully");
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Completes a course the caller is enrolled in.
#[axum::debug_handler]
pub async fn complete_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    enrollment_service::complete_course(&state, current.0.id, course_id).await?;

    let response = ApiResponse::message("Course completed successfully");
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Lists the caller's completed courses.
#[axum::debug_handler]
pub async fn completed_courses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let enrollments = enrollment_service::list_completed(&state, current.0.id).await?;

    let response = ApiResponse::success("Completed courses fetched successfully", enrollments);
    Ok((StatusCode::OK, Json(response)).into_response())
}
