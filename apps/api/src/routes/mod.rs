pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::candidates::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/candidates", get(handlers::handle_list_candidates))
        .route("/api/candidates/upload", post(handlers::handle_upload))
        .route("/api/candidates/:id", get(handlers::handle_get_candidate))
        .route(
            "/api/candidates/:id/request-documents",
            post(handlers::handle_request_documents),
        )
        .route(
            "/api/candidates/:id/submit-documents",
            post(handlers::handle_submit_documents),
        )
        .route(
            "/api/candidates/:id/documents/:document_id",
            get(handlers::handle_get_document),
        )
        .with_state(state)
}
