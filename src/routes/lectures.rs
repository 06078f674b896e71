use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::authz::check_course_access,
    errors::{AppError, Result},
    models::{CreateLectureRequest, Lecture, User},
    state::AppState,
};

/// Add a lecture to a course (course owner or admin)
pub async fn create_lecture(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateLectureRequest>,
) -> Result<impl IntoResponse> {
    check_course_access(&state.pool, &actor, course_id).await?;

    let lecture_id = Uuid::new_v4();

    sqlx::query(
        r#"INSERT INTO lectures (id, course_id, title, video_url, duration, "order", created_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(lecture_id)
    .bind(course_id)
    .bind(&payload.title)
    .bind(&payload.video_url)
    .bind(payload.duration)
    .bind(payload.order)
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    let lecture = fetch_lecture(&state, lecture_id).await?;

    Ok((StatusCode::CREATED, Json(lecture)))
}

/// List a course's lectures, ordered by their instructor-supplied position
pub async fn list_lectures(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let lectures = sqlx::query_as::<_, Lecture>(
        r#"SELECT id, course_id, title, video_url, duration, "order", created_at
           FROM lectures WHERE course_id = $1 ORDER BY "order" ASC"#,
    )
    .bind(course_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(lectures))
}

/// Delete a lecture (course owner or admin)
pub async fn delete_lecture(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(lecture_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let lecture = sqlx::query_as::<_, Lecture>(
        r#"SELECT id, course_id, title, video_url, duration, "order", created_at
           FROM lectures WHERE id = $1"#,
    )
    .bind(lecture_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))?;

    check_course_access(&state.pool, &actor, lecture.course_id).await?;

    sqlx::query("DELETE FROM lectures WHERE id = $1")
        .bind(lecture_id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "message": "Lecture deleted successfully" })))
}

async fn fetch_lecture(state: &AppState, lecture_id: Uuid) -> Result<Lecture> {
    sqlx::query_as::<_, Lecture>(
        r#"SELECT id, course_id, title, video_url, duration, "order", created_at
           FROM lectures WHERE id = $1"#,
    )
    .bind(lecture_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))
}
