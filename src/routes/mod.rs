pub mod admin;
pub mod assignments;
pub mod auth;
pub mod courses;
pub mod health;
pub mod lectures;
pub mod messages;
pub mod upload;

use axum::{extract::DefaultBodyLimit, middleware, routing, Router};

use crate::state::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_body = state.config.performance.max_upload_size_mb * 1024 * 1024;

    Router::new()
        .nest("/api", api_routes(state))
        .layer(DefaultBodyLimit::max(max_body))
}

/// API routes under /api prefix
fn api_routes(state: AppState) -> Router {
    // Public routes
    let public = Router::new()
        .merge(health::routes())
        .route("/auth/register", routing::post(auth::register))
        .route("/auth/login", routing::post(auth::login))
        .route(
            "/courses",
            routing::get(courses::list_courses),
        )
        .route("/courses/:course_id", routing::get(courses::get_course))
        .route(
            "/courses/:course_id/lectures",
            routing::get(lectures::list_lectures),
        )
        // Chat is deliberately open: senders are identified by the payload,
        // and clients consume the log by periodic re-fetch.
        .route(
            "/courses/:course_id/messages",
            routing::post(messages::post_message).get(messages::list_messages),
        )
        .route("/upload", routing::post(upload::upload));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/auth/me", routing::get(auth::me))
        .route("/courses", routing::post(courses::create_course))
        .route(
            "/courses/:course_id",
            routing::put(courses::update_course).delete(courses::delete_course),
        )
        .route("/courses/:course_id/enroll", routing::post(courses::enroll))
        .route(
            "/courses/:course_id/check-enrollment",
            routing::get(courses::check_enrollment),
        )
        .route("/my-courses", routing::get(courses::my_courses))
        .route(
            "/courses/:course_id/lectures",
            routing::post(lectures::create_lecture),
        )
        .route(
            "/lectures/:lecture_id",
            routing::delete(lectures::delete_lecture),
        )
        .route(
            "/courses/:course_id/assignments",
            routing::post(assignments::create_assignment).get(assignments::list_assignments),
        )
        .route(
            "/assignments/:assignment_id",
            routing::delete(assignments::delete_assignment),
        )
        .route(
            "/assignments/:assignment_id/submit",
            routing::post(assignments::submit_assignment).put(assignments::update_submission),
        )
        .route(
            "/assignments/submitted",
            routing::get(assignments::submitted_assignment_ids),
        )
        .route(
            "/submissions/:assignment_id",
            routing::get(assignments::list_submissions),
        )
        .route("/admin/users", routing::get(admin::list_users))
        .route(
            "/admin/users/:user_id",
            routing::delete(admin::delete_user),
        )
        .route(
            "/admin/maintenance/reconcile",
            routing::post(admin::reconcile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::auth_required,
        ));

    public.merge(protected).with_state(state)
}
