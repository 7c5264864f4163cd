//! Axum route handler for the Optimize API.

use axum::{extract::State, http::HeaderMap, Json};
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::optimize::service::{optimize_cv, OptimizeRequest, OptimizeResponse};
use crate::optimize::session::DEFAULT_SESSION;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

/// POST /api/v1/cv/optimize
///
/// Rewrites the CV for the job description and returns it sanitized and parsed.
/// One call per session at a time; a concurrent call gets 409.
pub async fn handle_optimize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let session = session_id(&headers);
    let span = tracing::info_span!("optimize", request_id = %Uuid::new_v4(), session = %session);

    let response = optimize_cv(&state, &session, request).instrument(span).await?;
    Ok(Json(response))
}
