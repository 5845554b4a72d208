use serde::Serialize;
use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::course::{Course, CourseStatus, CourseWithInstructor},
    models::user::Role,
    repositories::{course as course_repo, enrollment as enrollment_repo},
    state::AppState,
};

/// Lists all courses with instructor details.
pub async fn list_courses(state: &AppState) -> Result<Vec<CourseWithInstructor>> {
    course_repo::list_with_instructor(&state.db).await
}

/// Fetches a course by ID with instructor details.
pub async fn get_course(state: &AppState, course_id: Uuid) -> Result<CourseWithInstructor> {
    course_repo::find_with_instructor(&state.db, &course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}

/// Creates a course owned by the given instructor.
pub async fn create_course(
    state: &AppState,
    instructor_id: Uuid,
    title: &str,
    description: &str,
    status: Option<CourseStatus>,
) -> Result<Course> {
    let course = course_repo::insert(
        &state.db,
        Uuid::new_v4(),
        title,
        description,
        &instructor_id,
        status.unwrap_or(CourseStatus::Published),
    )
    .await?;
    tracing::info!("✅ Course created: {} by instructor {}", course.id, instructor_id);
    Ok(course)
}

/// Lists the courses owned by an instructor.
pub async fn list_own_courses(state: &AppState, instructor_id: Uuid) -> Result<Vec<Course>> {
    course_repo::list_by_instructor(&state.db, &instructor_id).await
}

/// Ownership scope for course mutations: admins reach every course,
/// instructors only their own.
fn owner_scope(actor_id: &Uuid, role: Role) -> Option<&Uuid> {
    match role {
        Role::Admin => None,
        _ => Some(actor_id),
    }
}

/// Updates a course. A non-owner instructor sees the same failure as a
/// missing course.
pub async fn update_course(
    state: &AppState,
    actor_id: Uuid,
    role: Role,
    course_id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    status: Option<CourseStatus>,
) -> Result<Course> {
    course_repo::update(
        &state.db,
        &course_id,
        owner_scope(&actor_id, role),
        title,
        description,
        status,
    )
    .await?
    .ok_or_else(|| {
        AppError::NotFound("Course not found or you are not authorized to update it".to_string())
    })
}

/// Deletes a course under the same ownership scope as [`update_course`].
pub async fn delete_course(
    state: &AppState,
    actor_id: Uuid,
    role: Role,
    course_id: Uuid,
) -> Result<Course> {
    let deleted = course_repo::delete(&state.db, &course_id, owner_scope(&actor_id, role))
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Course not found or you are not authorized to delete it".to_string())
        })?;
    tracing::info!("✅ Course deleted: {}", course_id);
    Ok(deleted)
}

/// Headline numbers for the instructor dashboard.
///
/// `total_students` counts students who ever had an enrollment row in any
/// of the instructor's courses, regardless of status; `active_enrollments`
/// counts only current `enrolled` rows. The two are different metrics and
/// are reported side by side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_courses: i64,
    pub total_students: i64,
    pub active_enrollments: i64,
}

/// Computes dashboard statistics over an instructor's courses.
pub async fn dashboard_stats(state: &AppState, instructor_id: Uuid) -> Result<DashboardStats> {
    let course_ids = course_repo::list_ids_by_instructor(&state.db, &instructor_id).await?;

    if course_ids.is_empty() {
        return Ok(DashboardStats {
            total_courses: 0,
            total_students: 0,
            active_enrollments: 0,
        });
    }

    let total_students = enrollment_repo::distinct_student_count(&state.db, &course_ids).await?;
    let active_enrollments = enrollment_repo::active_enrollment_count(&state.db, &course_ids).await?;

    Ok(DashboardStats {
        total_courses: course_ids.len() as i64,
        total_students,
        active_enrollments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_mutate_unscoped_and_instructors_stay_scoped() {
        let id = Uuid::new_v4();
        assert_eq!(owner_scope(&id, Role::Admin), None);
        assert_eq!(owner_scope(&id, Role::Instructor), Some(&id));
    }
}
