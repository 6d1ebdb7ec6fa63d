pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::feedback::handlers as feedback;
use crate::interviews::handlers as interviews;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/sign-up", post(auth::handle_sign_up))
        .route("/api/v1/auth/sign-in", post(auth::handle_sign_in))
        .route("/api/v1/auth/sign-out", post(auth::handle_sign_out))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Interviews
        .route("/api/v1/interviews", get(interviews::handle_list_mine))
        .route(
            "/api/v1/interviews/latest",
            get(interviews::handle_list_latest),
        )
        .route(
            "/api/v1/interviews/:id",
            get(interviews::handle_get_interview),
        )
        // Feedback
        .route(
            "/api/v1/interviews/:id/feedback",
            post(feedback::handle_create_feedback).get(feedback::handle_get_feedback),
        )
        .with_state(state)
}
