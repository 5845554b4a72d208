use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A course's publication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "course_status")]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    #[postgres(name = "published")]
    Published,
    #[postgres(name = "draft")]
    Draft,
}

/// Represents a course.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// The unique identifier for the course.
    pub id: Uuid,
    /// The course title.
    pub title: String,
    /// The course description.
    pub description: String,
    /// The instructor who owns the course.
    pub instructor_id: Uuid,
    /// The publication state.
    pub status: CourseStatus,
    /// The timestamp when the course was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the course was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The instructor fields joined onto course listings.
#[derive(Clone, Debug, Serialize)]
pub struct InstructorInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A course with its instructor joined in.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithInstructor {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: InstructorInfo,
}
