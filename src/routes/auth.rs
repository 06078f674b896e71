use axum::{
    extract::{Extension, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{hash_password, issue_jwt, verify_password},
    db,
    errors::{AppError, Result},
    models::{User, UserResponse, UserRole},
    state::AppState,
};

/// Register a new user and issue a token. The role is fixed at registration;
/// no role-change operation exists.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_one(&state.pool)
        .await?;
    if existing > 0 {
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let user_id = Uuid::new_v4();
    let password_hash = hash_password(&payload.password)?;

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, name, role, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(user_id)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.name)
    .bind(payload.role)
    .bind(Utc::now())
    .execute(&state.pool)
    .await
    .map_err(|e| {
        // The unique index on email is the authoritative guard; a lost race
        // surfaces the same error as the lookup above.
        if db::is_unique_violation(&e) {
            AppError::BadRequest("Email already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    let token = issue_jwt(
        user_id,
        payload.role,
        &state.config.jwt.secret,
        state.config.jwt.access_token_expiry,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: AuthUser {
            id: user_id,
            email: payload.email,
            name: payload.name,
            role: payload.role,
        },
    }))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, name, role, created_at FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(user) if verify_password(&payload.password, &user.password_hash) => user,
        _ => return Err(AppError::Unauthorized("Invalid credentials".to_string())),
    };

    let token = issue_jwt(
        user.id,
        user.role,
        &state.config.jwt.secret,
        state.config.jwt.access_token_expiry,
    )?;

    Ok(Json(AuthResponse {
        token,
        user: AuthUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        },
    }))
}

/// Get current user info
pub async fn me(Extension(actor): Extension<User>) -> Result<impl IntoResponse> {
    Ok(Json(UserResponse::from(actor)))
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}
