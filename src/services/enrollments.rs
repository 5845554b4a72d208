use uuid::Uuid;
use crate::{
    error::{AppError, Result},
    models::enrollment::{Enrollment, EnrollmentStatus, EnrollmentWithCourse, EnrollmentWithStudent},
    repositories::{course as course_repo, enrollment as enrollment_repo},
    state::AppState,
};

/// Enrolls a student in a course.
///
/// The pair's single record is the source of truth:
/// - a current `enrolled` record rejects the attempt,
/// - a `dropped` record is reactivated in place (no second row),
/// - otherwise a fresh record is inserted.
///
/// A concurrent first-time enroll for the same pair loses the insert race
/// on the unique constraint and surfaces as the same conflict. A prior
/// `completed` record takes that path too: no transition leaves
/// `completed`, so the insert collides with the existing row.
pub async fn enroll(state: &AppState, student_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
    if course_repo::find_by_id(&state.db, &course_id).await?.is_none() {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    if enrollment_repo::find_by_pair_in_status(&state.db, &student_id, &course_id, EnrollmentStatus::Enrolled)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Already enrolled in this course".to_string()));
    }

    if let Some(enrollment) =
        enrollment_repo::reactivate_dropped(&state.db, &student_id, &course_id).await?
    {
        tracing::info!(
            "✅ Enrollment reactivated: student {} course {}",
            student_id,
            course_id
        );
        return Ok(enrollment);
    }

    let enrollment =
        enrollment_repo::insert(&state.db, Uuid::new_v4(), &student_id, &course_id).await?;
    tracing::info!("✅ Enrollment created: student {} course {}", student_id, course_id);
    Ok(enrollment)
}

/// Drops a course. Only a currently `enrolled` pair can transition.
pub async fn drop_course(state: &AppState, student_id: Uuid, course_id: Uuid) -> Result<()> {
    let changed = enrollment_repo::transition_from_enrolled(
        &state.db,
        &student_id,
        &course_id,
        EnrollmentStatus::Dropped,
    )
    .await?;

    if !changed {
        return Err(AppError::NotFound(
            "You are not enrolled in this course or have already dropped/completed it".to_string(),
        ));
    }

    tracing::info!("✅ Course dropped: student {} course {}", student_id, course_id);
    Ok(())
}

/// Completes a course. Only a currently `enrolled` pair can transition;
/// `completed` is terminal.
pub async fn complete_course(state: &AppState, student_id: Uuid, course_id: Uuid) -> Result<()> {
    let changed = enrollment_repo::transition_from_enrolled(
        &state.db,
        &student_id,
        &course_id,
        EnrollmentStatus::Completed,
    )
    .await?;

    if !changed {
        return Err(AppError::NotFound(
            "You are not enrolled in this course".to_string(),
        ));
    }

    tracing::info!("✅ Course completed: student {} course {}", student_id, course_id);
    Ok(())
}

/// A student's current enrollments, course joined in.
pub async fn list_enrolled(state: &AppState, student_id: Uuid) -> Result<Vec<EnrollmentWithCourse>> {
    enrollment_repo::list_for_student(&state.db, &student_id, EnrollmentStatus::Enrolled).await
}

/// A student's completed enrollments, course joined in.
pub async fn list_completed(state: &AppState, student_id: Uuid) -> Result<Vec<EnrollmentWithCourse>> {
    enrollment_repo::list_for_student(&state.db, &student_id, EnrollmentStatus::Completed).await
}

/// The active roster of a course, student joined in.
pub async fn list_for_course(state: &AppState, course_id: Uuid) -> Result<Vec<EnrollmentWithStudent>> {
    enrollment_repo::list_for_course(&state.db, &course_id, EnrollmentStatus::Enrolled).await
}
