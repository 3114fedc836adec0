//! Axum route handlers for the form draft.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::form::models::FormInput;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FormDraftResponse {
    /// `None` when no draft has been saved yet.
    pub draft: Option<FormInput>,
}

/// GET /api/v1/form
///
/// Returns the autosaved draft so the form can be repopulated.
pub async fn handle_get_form(
    State(state): State<AppState>,
) -> Result<Json<FormDraftResponse>, AppError> {
    let draft = state.store.load().await?;
    Ok(Json(FormDraftResponse { draft }))
}

/// PUT /api/v1/form
///
/// Autosaves the current form values. Drafts are not validated.
pub async fn handle_save_form(
    State(state): State<AppState>,
    Json(input): Json<FormInput>,
) -> Result<StatusCode, AppError> {
    state.store.save(&input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/form
///
/// Resets the form: the saved draft is removed.
pub async fn handle_clear_form(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.store.clear().await?;
    tracing::info!("Form draft cleared");
    Ok(StatusCode::NO_CONTENT)
}
