use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::Result,
    models::course::{Course, CourseStatus, CourseWithInstructor, InstructorInfo},
};

/// A helper function to map a `tokio_postgres::Row` to a `Course`.
fn row_to_course(row: &Row) -> Result<Course> {
    Ok(Course {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        instructor_id: row.try_get("instructor_id")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Maps a joined course + instructor row.
fn row_to_course_with_instructor(row: &Row) -> Result<CourseWithInstructor> {
    Ok(CourseWithInstructor {
        course: row_to_course(row)?,
        instructor: InstructorInfo {
            id: row.try_get("instructor_id")?,
            name: row.try_get("instructor_name")?,
            email: row.try_get("instructor_email")?,
        },
    })
}

/// Creates a new course.
pub async fn insert(
    pool: &Pool,
    id: Uuid,
    title: &str,
    description: &str,
    instructor_id: &Uuid,
    status: CourseStatus,
) -> Result<Course> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO courses (id, title, description, instructor_id, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
            &[&id, &title, &description, instructor_id, &status],
        )
        .await?;
    row_to_course(&row)
}

/// Lists all courses with their instructor's name and email joined in.
pub async fn list_with_instructor(pool: &Pool) -> Result<Vec<CourseWithInstructor>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT c.*, u.name AS instructor_name, u.email AS instructor_email
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            ORDER BY c.created_at
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_course_with_instructor).collect()
}

/// Finds a course by ID with its instructor joined in.
pub async fn find_with_instructor(pool: &Pool, course_id: &Uuid) -> Result<Option<CourseWithInstructor>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT c.*, u.name AS instructor_name, u.email AS instructor_email
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            WHERE c.id = $1
            "#,
            &[course_id],
        )
        .await?;
    row.map(|r| row_to_course_with_instructor(&r)).transpose()
}

/// Finds a course by ID.
pub async fn find_by_id(pool: &Pool, course_id: &Uuid) -> Result<Option<Course>> {
    let client = pool.get().await?;
    let row = client
        .query_opt("SELECT * FROM courses WHERE id = $1", &[course_id])
        .await?;
    row.map(|r| row_to_course(&r)).transpose()
}

/// Lists the courses owned by an instructor.
pub async fn list_by_instructor(pool: &Pool, instructor_id: &Uuid) -> Result<Vec<Course>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT * FROM courses WHERE instructor_id = $1 ORDER BY created_at",
            &[instructor_id],
        )
        .await?;
    rows.iter().map(row_to_course).collect()
}

/// The ids of the courses owned by an instructor.
pub async fn list_ids_by_instructor(pool: &Pool, instructor_id: &Uuid) -> Result<Vec<Uuid>> {
    let client = pool.get().await?;
    let rows = client
        .query("SELECT id FROM courses WHERE instructor_id = $1", &[instructor_id])
        .await?;
    rows.iter().map(|r| Ok(r.try_get("id")?)).collect()
}

/// Updates a course. With `owner` set the update is scoped to that
/// instructor's courses; `None` (admin) updates regardless of ownership.
/// Returns `None` when no matching row exists.
pub async fn update(
    pool: &Pool,
    course_id: &Uuid,
    owner: Option<&Uuid>,
    title: Option<&str>,
    description: Option<&str>,
    status: Option<CourseStatus>,
) -> Result<Option<Course>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE courses
            SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1 AND ($2::uuid IS NULL OR instructor_id = $2)
            RETURNING *
            "#,
            &[course_id, &owner, &title, &description, &status],
        )
        .await?;
    row.map(|r| row_to_course(&r)).transpose()
}

/// Deletes a course, scoped to `owner` the same way as [`update`].
/// Returns the deleted course, or `None` when no matching row exists.
pub async fn delete(pool: &Pool, course_id: &Uuid, owner: Option<&Uuid>) -> Result<Option<Course>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            DELETE FROM courses
            WHERE id = $1 AND ($2::uuid IS NULL OR instructor_id = $2)
            RETURNING *
            "#,
            &[course_id, &owner],
        )
        .await?;
    row.map(|r| row_to_course(&r)).transpose()
}
