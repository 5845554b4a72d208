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
    models::course::CourseStatus,
    response::ApiResponse,
    services::courses as course_service,
    state::AppState,
};

/// The request payload for creating a course.
#[derive(Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[garde(length(min = 1, max = 200))]
    pub title: String,
    #[garde(length(min = 1, max = 1000))]
    pub description: String,
    #[garde(skip)]
    pub status: Option<CourseStatus>,
}

/// The request payload for updating a course.
#[derive(Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[garde(inner(length(min = 1, max = 200)))]
    pub title: Option<String>,
    #[garde(inner(length(min = 1, max = 1000)))]
    pub description: Option<String>,
    #[garde(skip)]
    pub status: Option<CourseStatus>,
}

fn validation(report: garde::Report) -> AppError {
    AppError::Validation(report.to_string())
}

/// Headline numbers for the instructor dashboard.
#[axum::debug_handler]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let stats = course_service::dashboard_stats(&state, current.0.id).await?;

    let response = ApiResponse::success("Dashboard stats fetched successfully", stats);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Creates a new course owned by the caller.
#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    let course = course_service::create_course(
        &state,
        current.0.id,
        payload.title.trim(),
        payload.description.trim(),
        payload.status,
    )
    .await?;

    let response = ApiResponse::success("Course created successfully", course);
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Lists the caller's own courses.
#[axum::debug_handler]
pub async fn my_courses(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let courses = course_service::list_own_courses(&state, current.0.id).await?;

    let response = ApiResponse::success("Courses fetched successfully", courses);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Updates one of the caller's courses (admins update any).
#[axum::debug_handler]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Response> {
    payload.validate().map_err(validation)?;

    let course = course_service::update_course(
        &state,
        current.0.id,
        current.0.role,
        course_id,
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.status,
    )
    .await?;

    let response = ApiResponse::success("Course updated successfully", course);
    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Deletes one of the caller's courses (admins delete any).
#[axum::debug_handler]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    let course =
        course_service::delete_course(&state, current.0.id, current.0.role, course_id).await?;

    let response = ApiResponse::success("Course deleted successfully", course);
    Ok((StatusCode::OK, Json(response)).into_response())
}
