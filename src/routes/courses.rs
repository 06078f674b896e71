use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::{
    auth::authz::{can_create_course, check_course_access, require_student},
    db::{self, cascade},
    errors::{AppError, Result},
    models::{Course, CreateCourseRequest, Enrollment, UpdateCourseRequest, User, UserRole},
    state::AppState,
};

/// Create a new course, snapshotting the actor's display name as
/// `instructor_name`
pub async fn create_course(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse> {
    if !can_create_course(actor.role) {
        return Err(AppError::Forbidden(
            "Only instructors can create courses".to_string(),
        ));
    }

    let course_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO courses (id, title, description, instructor_id, instructor_name, thumbnail_url, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(course_id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(actor.id)
    .bind(&actor.name)
    .bind(&payload.thumbnail_url)
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    let course = fetch_course(&state, course_id).await?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// List all courses
pub async fn list_courses(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT id, title, description, instructor_id, instructor_name, thumbnail_url, created_at
         FROM courses",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(courses))
}

/// Get a specific course
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let course = fetch_course(&state, course_id).await?;
    Ok(Json(course))
}

/// Update course metadata. Ownership fields are never altered here.
pub async fn update_course(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse> {
    check_course_access(&state.pool, &actor, course_id).await?;

    sqlx::query(
        "UPDATE courses
         SET title = COALESCE($2, title),
             description = COALESCE($3, description),
             thumbnail_url = COALESCE($4, thumbnail_url)
         WHERE id = $1",
    )
    .bind(course_id)
    .bind(payload.title.as_deref())
    .bind(payload.description.as_deref())
    .bind(payload.thumbnail_url.as_deref())
    .execute(&state.pool)
    .await?;

    let course = fetch_course(&state, course_id).await?;
    Ok(Json(course))
}

/// Delete a course and cascade to its lectures, assignments and enrollments
pub async fn delete_course(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    check_course_access(&state.pool, &actor, course_id).await?;

    cascade::delete_course_with_dependents(&state.pool, course_id).await?;

    Ok(Json(json!({ "message": "Course deleted" })))
}

/// Enroll the current student in a course. A second enroll attempt for the
/// same pair is rejected, never silently merged.
pub async fn enroll(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    require_student(&actor, "enroll")?;

    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM courses WHERE id = $1)")
        .bind(course_id)
        .fetch_one(&state.pool)
        .await?;
    if !exists {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    let already = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
    )
    .bind(actor.id)
    .bind(course_id)
    .fetch_one(&state.pool)
    .await?;
    if already {
        return Err(AppError::Duplicate("Already enrolled".to_string()));
    }

    sqlx::query(
        "INSERT INTO enrollments (id, student_id, course_id, enrolled_at) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(actor.id)
    .bind(course_id)
    .bind(Utc::now())
    .execute(&state.pool)
    .await
    .map_err(|e| {
        // Two racing enrolls resolve at the unique index; the loser gets the
        // same duplicate error as the fast path above.
        if db::is_unique_violation(&e) {
            AppError::Duplicate("Already enrolled".to_string())
        } else {
            AppError::Database(e)
        }
    })?;

    Ok(Json(json!({ "message": "Enrolled successfully" })))
}

/// Check whether the current user is enrolled in a course
pub async fn check_enrollment(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let enrolled = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
    )
    .bind(actor.id)
    .bind(course_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({ "enrolled": enrolled })))
}

/// List the courses relevant to the current user: enrolled courses for
/// students, owned courses for instructors, everything for admins
pub async fn my_courses(
    Extension(actor): Extension<User>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let courses = match actor.role {
        UserRole::Student => {
            // Read-side fan-out: enrollments, then the courses they point at.
            let enrollments = sqlx::query_as::<_, Enrollment>(
                "SELECT id, student_id, course_id, enrolled_at FROM enrollments WHERE student_id = $1",
            )
            .bind(actor.id)
            .fetch_all(&state.pool)
            .await?;

            if enrollments.is_empty() {
                Vec::new()
            } else {
                let mut builder = QueryBuilder::<sqlx::Sqlite>::new(
                    "SELECT id, title, description, instructor_id, instructor_name, thumbnail_url, created_at
                     FROM courses WHERE id IN (",
                );
                let mut ids = builder.separated(", ");
                for enrollment in &enrollments {
                    ids.push_bind(enrollment.course_id);
                }
                ids.push_unseparated(")");

                builder
                    .build_query_as::<Course>()
                    .fetch_all(&state.pool)
                    .await?
            }
        }
        UserRole::Instructor => {
            sqlx::query_as::<_, Course>(
                "SELECT id, title, description, instructor_id, instructor_name, thumbnail_url, created_at
                 FROM courses WHERE instructor_id = $1",
            )
            .bind(actor.id)
            .fetch_all(&state.pool)
            .await?
        }
        UserRole::Admin => {
            sqlx::query_as::<_, Course>(
                "SELECT id, title, description, instructor_id, instructor_name, thumbnail_url, created_at
                 FROM courses",
            )
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(Json(courses))
}

async fn fetch_course(state: &AppState, course_id: Uuid) -> Result<Course> {
    sqlx::query_as::<_, Course>(
        "SELECT id, title, description, instructor_id, instructor_name, thumbnail_url, created_at
         FROM courses WHERE id = $1",
    )
    .bind(course_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
}
