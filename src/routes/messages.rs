use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    models::{CreateMessageRequest, Message},
    state::AppState,
};

/// Append a chat message to a course's log
pub async fn post_message(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse> {
    let message_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO messages (id, course_id, sender_id, sender_name, sender_role, message, timestamp)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(message_id)
    .bind(course_id)
    .bind(payload.sender_id)
    .bind(&payload.sender_name)
    .bind(payload.sender_role)
    .bind(&payload.message)
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    let message = sqlx::query_as::<_, Message>(
        "SELECT id, course_id, sender_id, sender_name, sender_role, message, timestamp
         FROM messages WHERE id = $1",
    )
    .bind(message_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// Return a course's full message log, oldest first. Ties at equal timestamps
/// fall back to insertion order. Clients consume this by periodic re-fetch.
pub async fn list_messages(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT id, course_id, sender_id, sender_name, sender_role, message, timestamp
         FROM messages WHERE course_id = $1
         ORDER BY timestamp ASC, rowid ASC",
    )
    .bind(course_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(messages))
}
