use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    db,
    error::{AppError, Result},
    models::course::Course,
    models::enrollment::{Enrollment, EnrollmentStatus, EnrollmentWithCourse, EnrollmentWithStudent},
    models::user::UserPublic,
};

/// A helper function to map a `tokio_postgres::Row` to an `Enrollment`.
fn row_to_enrollment(row: &Row) -> Result<Enrollment> {
    Ok(Enrollment {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        course_id: row.try_get("course_id")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_enrollment_with_course(row: &Row) -> Result<EnrollmentWithCourse> {
    Ok(EnrollmentWithCourse {
        enrollment: row_to_enrollment(row)?,
        course: Course {
            id: row.try_get("course_id")?,
            title: row.try_get("course_title")?,
            description: row.try_get("course_description")?,
            instructor_id: row.try_get("course_instructor_id")?,
            status: row.try_get("course_status")?,
            created_at: row.try_get("course_created_at")?,
            updated_at: row.try_get("course_updated_at")?,
        },
    })
}

fn row_to_enrollment_with_student(row: &Row) -> Result<EnrollmentWithStudent> {
    Ok(EnrollmentWithStudent {
        enrollment: row_to_enrollment(row)?,
        student: UserPublic {
            id: row.try_get("student_id")?,
            name: row.try_get("student_name")?,
            email: row.try_get("student_email")?,
            role: row.try_get("student_role")?,
            created_at: row.try_get("student_created_at")?,
        },
    })
}

/// Finds the pair's record if it is currently in the given status.
pub async fn find_by_pair_in_status(
    pool: &Pool,
    student_id: &Uuid,
    course_id: &Uuid,
    status: EnrollmentStatus,
) -> Result<Option<Enrollment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            "SELECT * FROM enrollments WHERE student_id = $1 AND course_id = $2 AND status = $3",
            &[student_id, course_id, &status],
        )
        .await?;
    row.map(|r| row_to_enrollment(&r)).transpose()
}

/// Reactivates a dropped enrollment, transitioning it back to `enrolled`.
///
/// A single conditional update, so the dropped-row check and the transition
/// cannot interleave with a concurrent enroll. Returns `None` when the pair
/// has no dropped record.
pub async fn reactivate_dropped(
    pool: &Pool,
    student_id: &Uuid,
    course_id: &Uuid,
) -> Result<Option<Enrollment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE enrollments
            SET status = 'enrolled', updated_at = NOW()
            WHERE student_id = $1 AND course_id = $2 AND status = 'dropped'
            RETURNING *
            "#,
            &[student_id, course_id],
        )
        .await?;
    row.map(|r| row_to_enrollment(&r)).transpose()
}

/// Inserts a fresh enrollment in `enrolled` state.
///
/// The unique (student_id, course_id) constraint is the arbiter for
/// concurrent first-time enrollments; the losing insert comes back as a
/// conflict rather than a second row.
pub async fn insert(pool: &Pool, id: Uuid, student_id: &Uuid, course_id: &Uuid) -> Result<Enrollment> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO enrollments (id, student_id, course_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
            &[&id, student_id, course_id],
        )
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict("Already enrolled in this course".to_string())
            } else {
                AppError::from(e)
            }
        })?;
    row_to_enrollment(&row)
}

/// Transitions the pair's record out of `enrolled` into `to`.
///
/// Returns whether a row changed; `false` means the pair is not currently
/// enrolled (never enrolled, dropped, or completed).
pub async fn transition_from_enrolled(
    pool: &Pool,
    student_id: &Uuid,
    course_id: &Uuid,
    to: EnrollmentStatus,
) -> Result<bool> {
    let client = pool.get().await?;
    let changed = client
        .execute(
            r#"
            UPDATE enrollments
            SET status = $3, updated_at = NOW()
            WHERE student_id = $1 AND course_id = $2 AND status = 'enrolled'
            "#,
            &[student_id, course_id, &to],
        )
        .await?;
    Ok(changed > 0)
}

/// Lists a student's enrollments in the given status, course joined in.
pub async fn list_for_student(
    pool: &Pool,
    student_id: &Uuid,
    status: EnrollmentStatus,
) -> Result<Vec<EnrollmentWithCourse>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT
                e.*,
                c.title AS course_title,
                c.description AS course_description,
                c.instructor_id AS course_instructor_id,
                c.status AS course_status,
                c.created_at AS course_created_at,
                c.updated_at AS course_updated_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.student_id = $1 AND e.status = $2
            ORDER BY e.created_at
            "#,
            &[student_id, &status],
        )
        .await?;
    rows.iter().map(row_to_enrollment_with_course).collect()
}

/// Lists a course's enrollments in the given status, student joined in.
pub async fn list_for_course(
    pool: &Pool,
    course_id: &Uuid,
    status: EnrollmentStatus,
) -> Result<Vec<EnrollmentWithStudent>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT
                e.*,
                u.name AS student_name,
                u.email AS student_email,
                u.role AS student_role,
                u.created_at AS student_created_at
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.course_id = $1 AND e.status = $2
            ORDER BY e.created_at
            "#,
            &[course_id, &status],
        )
        .await?;
    rows.iter().map(row_to_enrollment_with_student).collect()
}

/// Counts distinct students with any enrollment row in the given courses,
/// regardless of status ("ever enrolled"). Distinct from
/// [`active_enrollment_count`], which only counts current `enrolled` rows.
pub async fn distinct_student_count(pool: &Pool, course_ids: &[Uuid]) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            "SELECT COUNT(DISTINCT student_id) FROM enrollments WHERE course_id = ANY($1)",
            &[&course_ids],
        )
        .await?;
    Ok(row.try_get(0)?)
}

/// Counts rows currently in `enrolled` state across the given courses.
pub async fn active_enrollment_count(pool: &Pool, course_ids: &[Uuid]) -> Result<i64> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = ANY($1) AND status = 'enrolled'",
            &[&course_ids],
        )
        .await?;
    Ok(row.try_get(0)?)
}
