use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `due_date` is stored exactly as supplied (no future-date validation);
/// `file_url` is an unused template field kept for client compatibility.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Assignment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub file_url: String,
    pub due_date: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

/// At most one submission per (assignment, student) pair; resubmission mutates
/// `file_url` and `submitted_at` in place. `grade` is only written by the
/// instructor-side grading path.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub file_url: String,
    pub submitted_at: DateTime<Utc>,
    pub grade: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub file_url: String,
}

/// Assignment annotated with the requesting student's own submission state.
#[derive(Debug, Serialize)]
pub struct AssignmentWithStatus {
    #[serde(flatten)]
    pub assignment: Assignment,
    #[serde(rename = "isSubmitted")]
    pub is_submitted: bool,
    pub submission_url: Option<String>,
    pub grade: Option<String>,
}
