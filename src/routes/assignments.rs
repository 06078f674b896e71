use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    auth::authz::{check_course_access, require_student},
    db,
    errors::{AppError, Result},
    models::{
        Assignment, AssignmentWithStatus, CreateAssignmentRequest, SubmitRequest, Submission,
        User, UserRole,
    },
    state::AppState,
};

/// Create an assignment under a course (course owner or admin)
pub async fn create_assignment(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<impl IntoResponse> {
    check_course_access(&state.pool, &actor, course_id).await?;

    let (title, description) = match (payload.title, payload.description) {
        (Some(t), Some(d)) if !t.trim().is_empty() && !d.trim().is_empty() => (t, d),
        _ => {
            return Err(AppError::BadRequest(
                "Title and description are required".to_string(),
            ))
        }
    };

    let assignment_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO assignments (id, course_id, title, description, file_url, due_date, created_at)
         VALUES ($1, $2, $3, $4, '', $5, $6)",
    )
    .bind(assignment_id)
    .bind(course_id)
    .bind(&title)
    .bind(&description)
    .bind(payload.due_date.as_deref())
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    let assignment = fetch_assignment(&state, assignment_id).await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

/// List a course's assignments. For students, each entry is annotated with
/// that student's own submission state; other students' work never shows.
pub async fn list_assignments(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Response> {
    let assignments = sqlx::query_as::<_, Assignment>(
        "SELECT id, course_id, title, description, file_url, due_date, created_at
         FROM assignments WHERE course_id = $1",
    )
    .bind(course_id)
    .fetch_all(&state.pool)
    .await?;

    if actor.role != UserRole::Student {
        return Ok(Json(assignments).into_response());
    }

    let submissions = sqlx::query_as::<_, Submission>(
        "SELECT id, assignment_id, student_id, student_name, file_url, submitted_at, grade
         FROM submissions WHERE student_id = $1",
    )
    .bind(actor.id)
    .fetch_all(&state.pool)
    .await?;

    let by_assignment: HashMap<Uuid, Submission> = submissions
        .into_iter()
        .map(|s| (s.assignment_id, s))
        .collect();

    let merged: Vec<AssignmentWithStatus> = assignments
        .into_iter()
        .map(|a| {
            let submission = by_assignment.get(&a.id);
            AssignmentWithStatus {
                is_submitted: submission.is_some(),
                submission_url: submission.map(|s| s.file_url.clone()),
                grade: submission.map(|s| s.grade.clone()),
                assignment: a,
            }
        })
        .collect();

    Ok(Json(merged).into_response())
}

/// Delete an assignment (course owner or admin). Submissions referencing the
/// assignment are left in place.
pub async fn delete_assignment(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let assignment = fetch_assignment(&state, assignment_id).await?;

    check_course_access(&state.pool, &actor, assignment.course_id).await?;

    sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(assignment_id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "message": "Assignment deleted successfully" })))
}

/// Submit an assignment for the first time. A pair that has already submitted
/// must use the update operation instead.
pub async fn submit_assignment(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse> {
    // Existence first: a missing assignment is 404 regardless of role.
    fetch_assignment(&state, assignment_id).await?;

    require_student(&actor, "submit assignments")?;

    let already = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM submissions WHERE assignment_id = $1 AND student_id = $2)",
    )
    .bind(assignment_id)
    .bind(actor.id)
    .fetch_one(&state.pool)
    .await?;
    if already {
        return Err(AppError::Duplicate(
            "You already submitted this assignment".to_string(),
        ));
    }

    let submission_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO submissions (id, assignment_id, student_id, student_name, file_url, submitted_at, grade)
         VALUES ($1, $2, $3, $4, $5, $6, '')",
    )
    .bind(submission_id)
    .bind(assignment_id)
    .bind(actor.id)
    .bind(&actor.name)
    .bind(&payload.file_url)
    .bind(Utc::now())
    .execute(&state.pool)
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            AppError::Duplicate("You already submitted this assignment".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    let submission = fetch_submission(&state, assignment_id, actor.id).await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Replace an existing submission's file. The submission id and grade are
/// preserved; only `file_url` and `submitted_at` change.
pub async fn update_submission(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse> {
    require_student(&actor, "update submissions")?;

    let existing = match fetch_submission(&state, assignment_id, actor.id).await {
        Ok(submission) => submission,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::NotFound("No existing submission found".to_string()))
        }
        Err(e) => return Err(e),
    };

    sqlx::query(
        "UPDATE submissions SET file_url = $1, submitted_at = $2 WHERE id = $3",
    )
    .bind(&payload.file_url)
    .bind(Utc::now())
    .bind(existing.id)
    .execute(&state.pool)
    .await?;

    let submission = fetch_submission(&state, assignment_id, actor.id).await?;

    Ok(Json(submission))
}

/// List the assignment ids the current student has submitted
pub async fn submitted_assignment_ids(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    require_student(&actor, "view submissions")?;

    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT assignment_id FROM submissions WHERE student_id = $1",
    )
    .bind(actor.id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ids))
}

/// List all submissions for one assignment (grading view)
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let submissions = sqlx::query_as::<_, Submission>(
        "SELECT id, assignment_id, student_id, student_name, file_url, submitted_at, grade
         FROM submissions WHERE assignment_id = $1",
    )
    .bind(assignment_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(submissions))
}

async fn fetch_assignment(state: &AppState, assignment_id: Uuid) -> Result<Assignment> {
    sqlx::query_as::<_, Assignment>(
        "SELECT id, course_id, title, description, file_url, due_date, created_at
         FROM assignments WHERE id = $1",
    )
    .bind(assignment_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
}

async fn fetch_submission(
    state: &AppState,
    assignment_id: Uuid,
    student_id: Uuid,
) -> Result<Submission> {
    sqlx::query_as::<_, Submission>(
        "SELECT id, assignment_id, student_id, student_name, file_url, submitted_at, grade
         FROM submissions WHERE assignment_id = $1 AND student_id = $2",
    )
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
}
