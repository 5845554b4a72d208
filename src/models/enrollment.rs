use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::course::Course;
use crate::models::user::UserPublic;

/// The lifecycle state of an enrollment.
///
/// `enrolled → dropped` and `enrolled → completed` via explicit actions;
/// `dropped → enrolled` when the student re-enrolls (the same row is
/// reactivated). No transition leaves `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "enrollment_status")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[postgres(name = "enrolled")]
    Enrolled,
    #[postgres(name = "completed")]
    Completed,
    #[postgres(name = "dropped")]
    Dropped,
}

/// Represents a (student, course) enrollment record.
///
/// At most one row exists per pair regardless of status history; the
/// storage-level unique constraint on (student_id, course_id) enforces it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// The unique identifier for the enrollment.
    pub id: Uuid,
    /// The enrolled student.
    pub student_id: Uuid,
    /// The course enrolled in.
    pub course_id: Uuid,
    /// The current lifecycle state.
    pub status: EnrollmentStatus,
    /// The timestamp when the enrollment was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the enrollment was last updated.
    pub updated_at: DateTime<Utc>,
}

/// An enrollment with its course joined in (student-facing listings).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Course,
}

/// An enrollment with its student joined in (course-owner listings).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithStudent {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub student: UserPublic,
}
