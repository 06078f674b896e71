use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{auth::jwt::decode_jwt, errors::AppError, models::User, state::AppState};

/// Resolves the bearer credential to the current user record and attaches it
/// to the request for downstream handlers. Performs no authorization beyond
/// authentication: role and ownership checks happen per operation.
///
/// A token whose user no longer exists is treated as invalid (401), not as a
/// missing resource.
pub async fn auth_required(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Bearer token from Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let claims = decode_jwt(token, &state.config.jwt.secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    // Resolve to the live user record; stale tokens fail authentication.
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, name, role, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await
    .map_err(AppError::Database)?
    .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
