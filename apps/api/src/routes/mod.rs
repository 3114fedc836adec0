pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::form::handlers as form;
use crate::generation::handlers as scripts;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form draft
        .route(
            "/api/v1/form",
            get(form::handle_get_form)
                .put(form::handle_save_form)
                .delete(form::handle_clear_form),
        )
        // Scripts and documents
        .route("/api/v1/scripts", post(scripts::handle_generate))
        .route("/api/v1/scripts/latest", get(scripts::handle_get_latest))
        .route(
            "/api/v1/scripts/latest/document",
            get(scripts::handle_download_document),
        )
        .with_state(state)
}
