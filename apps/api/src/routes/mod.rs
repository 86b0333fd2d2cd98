pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::sessions::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Questionnaire
        .route("/api/v1/test/start", get(handlers::handle_start))
        .route(
            "/api/v1/test/questions/:page",
            get(handlers::handle_question_page),
        )
        // Session flow
        .route("/api/v1/test/answers", post(handlers::handle_create_session))
        .route(
            "/api/v1/test/:session_id/answers",
            post(handlers::handle_append_answers),
        )
        .route(
            "/api/v1/test/:session_id/demographics",
            post(handlers::handle_demographics),
        )
        .route(
            "/api/v1/test/:session_id/competency-questions",
            get(handlers::handle_competency_questions),
        )
        .route(
            "/api/v1/test/:session_id/competency-answers",
            post(handlers::handle_competency_answers),
        )
        .route(
            "/api/v1/test/:session_id/results",
            get(handlers::handle_results),
        )
        .route(
            "/api/v1/test/:session_id/status",
            get(handlers::handle_status),
        )
        .with_state(state)
}
