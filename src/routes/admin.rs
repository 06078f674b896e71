use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::authz::require_admin,
    db::cascade,
    errors::Result,
    models::{User, UserResponse},
    state::AppState,
};

/// List all users, without credential fields
pub async fn list_users(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    require_admin(&actor)?;

    let users = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, name, role, created_at FROM users",
    )
    .fetch_all(&state.pool)
    .await?;

    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(users))
}

/// Delete a user and cascade: their owned courses (with each course's
/// lectures, assignments and enrollments) and their own enrollments.
/// Deleting an unknown id is a no-op, not an error.
pub async fn delete_user(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_admin(&actor)?;

    cascade::delete_user_with_dependents(&state.pool, user_id).await?;

    Ok(Json(json!({ "message": "User deleted" })))
}

/// Remove orphaned course dependents. Idempotent; also runs at startup.
pub async fn reconcile(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    require_admin(&actor)?;

    let report = cascade::sweep_orphans(&state.pool).await?;

    if report.total() > 0 {
        tracing::warn!(
            lectures = report.lectures,
            assignments = report.assignments,
            enrollments = report.enrollments,
            "Reconciliation removed orphaned records"
        );
    }

    Ok(Json(report))
}
