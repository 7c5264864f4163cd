//! Axum route handlers for the CV API: upload, parse, preview, export.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extract::{ensure_pdf, extract_pdf_text};
use crate::layout::paginate;
use crate::render::{export_filename, render_document, write_pdf};
use crate::state::AppState;
use crate::text::{parse_cv, sanitize, ParsedCv};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CvTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Text as reconstructed from the PDF.
    pub text: String,
    pub clean_text: String,
    pub page_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/cv/upload
///
/// Multipart upload with a single `file` field holding a PDF.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            if file.is_some() {
                return Err(AppError::Validation(
                    "upload accepts a single 'file' field".to_string(),
                ));
            }
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("could not read file: {e}")))?;
            file = Some((content_type, data));
        }
    }

    let (content_type, data) =
        file.ok_or_else(|| AppError::Validation("no 'file' field in upload".to_string()))?;
    ensure_pdf(content_type.as_deref(), &data)?;

    let extractor = state.config.extractor_config();
    let extracted = tokio::task::spawn_blocking(move || extract_pdf_text(&data, &extractor))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

    info!(
        pages = extracted.page_count,
        chars = extracted.text.len(),
        "PDF extracted"
    );

    Ok(Json(UploadResponse {
        clean_text: sanitize(&extracted.text),
        text: extracted.text,
        page_count: extracted.page_count,
    }))
}

/// POST /api/v1/cv/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    Json(request): Json<CvTextRequest>,
) -> Result<Json<ParsedCv>, AppError> {
    Ok(Json(parse_cv(&request.text, &state.matcher)))
}

/// POST /api/v1/cv/preview
///
/// Standalone HTML page for the on-screen preview.
pub async fn handle_preview(
    State(state): State<AppState>,
    Json(request): Json<CvTextRequest>,
) -> Result<Html<String>, AppError> {
    let parsed = parse_non_empty(&state, &request.text)?;
    Ok(Html(render_document(&parsed.sections)))
}

/// POST /api/v1/cv/export
///
/// Paginated PDF download of the parsed CV.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<CvTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    let parsed = parse_non_empty(&state, &request.text)?;
    let page_config = state.page_config.clone();

    // Layout and serialization are CPU-bound; keep them off the executor.
    let pdf = tokio::task::spawn_blocking(move || {
        let pages = paginate(&parsed.sections, &page_config);
        write_pdf(&pages, &page_config)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF export: {e}")))??;

    let disposition = format!("attachment; filename=\"{}\"", export_filename());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}

fn parse_non_empty(state: &AppState, text: &str) -> Result<ParsedCv, AppError> {
    let parsed = parse_cv(text, &state.matcher);
    if parsed.is_empty() {
        return Err(AppError::EmptyInput("some CV text"));
    }
    Ok(parsed)
}
