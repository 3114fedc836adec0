//! Axum route handlers for script generation and the PDF download.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::content::{ContentBlock, ContentExtractor};
use crate::document::{
    document_filename, fold_to_ascii, render_pdf, DocumentAssembler, RenderError,
};
use crate::errors::AppError;
use crate::form::validation::validate;
use crate::form::FormInput;
use crate::generation::generator::{generate_script, GeneratedScript};
use crate::layout::toc::TableOfContents;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScriptResponse {
    pub script: GeneratedScript,
    pub blocks: Vec<ContentBlock>,
    pub toc: TableOfContents,
}

impl ScriptResponse {
    fn new(script: GeneratedScript) -> Self {
        let blocks: Vec<ContentBlock> = ContentExtractor::new(&script.markup).blocks().collect();
        let toc = TableOfContents::from_blocks(&blocks);
        Self {
            script,
            blocks,
            toc,
        }
    }
}

fn busy() -> AppError {
    AppError::Conflict("A script is already being generated".to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/scripts
///
/// Validates the form, saves it as the current draft and generates a script.
/// Model failures never surface here: the sample script is returned instead.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(input): Json<FormInput>,
) -> Result<Json<ScriptResponse>, AppError> {
    let form = input.trimmed();
    validate(&form)?;

    let ticket = state.guard.try_acquire().ok_or_else(busy)?;
    info!(token = %ticket.token(), "Generation started");

    state.store.save(&form).await?;
    let script = generate_script(form, state.llm.as_ref(), Local::now().date_naive()).await;
    *state.latest.write().await = Some(script.clone());

    info!(
        token = %ticket.token(),
        id = %script.id,
        source = ?script.source,
        "Generation finished"
    );
    Ok(Json(ScriptResponse::new(script)))
}

/// GET /api/v1/scripts/latest
pub async fn handle_get_latest(
    State(state): State<AppState>,
) -> Result<Json<ScriptResponse>, AppError> {
    let script = state
        .latest
        .read()
        .await
        .clone()
        .ok_or_else(|| AppError::NotFound("No script has been generated yet".to_string()))?;
    Ok(Json(ScriptResponse::new(script)))
}

/// GET /api/v1/scripts/latest/document
///
/// Assembles and writes the PDF for the latest script. Rasterization and PDF
/// writing are CPU-bound and run on the blocking pool, which also owns the
/// generation ticket: a client that hangs up does not free the slot while the
/// render is still running.
pub async fn handle_download_document(
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let script = state
        .latest
        .read()
        .await
        .clone()
        .ok_or_else(|| AppError::NotFound("No script has been generated yet".to_string()))?;
    let ticket = state.guard.try_acquire().ok_or_else(busy)?;

    let filename = fold_to_ascii(&document_filename(
        &script.form.company_name,
        &script.form.job_position,
    ));

    let render_state = state.clone();
    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, RenderError> {
        let _ticket = ticket;
        let assembler = DocumentAssembler {
            branding: &render_state.config.branding,
            logo: render_state.logo.clone(),
            mode: render_state.config.body_mode,
            rasterizer: render_state.rasterizer.as_ref(),
        };
        let assembled = assembler.assemble(&script.form, &script.markup, script.generated_on)?;
        render_pdf(&assembled.document)
    })
    .await
    .map_err(|e| RenderError::Task(e.to_string()))??;

    info!(filename = %filename, bytes = bytes.len(), "Document rendered");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
