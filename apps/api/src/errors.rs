use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm_client::{LlmError, ProviderKind};
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported file type: {0}. Please upload a PDF.")]
    InvalidFileType(String),

    #[error("Could not read the PDF: {0}")]
    PdfParse(String),

    #[error("No API key configured for {0}. Add one in settings or the server environment.")]
    MissingApiKey(ProviderKind),

    #[error("The AI provider is rate limiting requests. Please wait a moment and try again.")]
    ProviderRateLimited,

    #[error("The AI provider rejected the API key. Please check it and try again.")]
    ProviderUnauthorized,

    #[error("The CV and job description are too long: {0}")]
    InputTooLarge(String),

    #[error("The AI provider failed: {0}")]
    ProviderUnknown(String),

    #[error("Please provide {0}.")]
    EmptyInput(&'static str),

    #[error("An optimization is already running for this session.")]
    OptimizeInProgress,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RateLimited => AppError::ProviderRateLimited,
            LlmError::Unauthorized => AppError::ProviderUnauthorized,
            LlmError::InputTooLarge(detail) => AppError::InputTooLarge(detail),
            LlmError::EmptyContent => {
                AppError::ProviderUnknown("the response contained no text".to_string())
            }
            LlmError::Unknown(msg) => AppError::ProviderUnknown(msg),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::InvalidFileType(found) => AppError::InvalidFileType(found),
            ExtractError::Parse(reason) => AppError::PdfParse(reason),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Internal(anyhow::Error::new(e).context("PDF rendering failed"))
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidFileType(_) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, "INVALID_FILE_TYPE"),
            AppError::PdfParse(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PDF_PARSE_ERROR"),
            AppError::MissingApiKey(_) => (StatusCode::BAD_REQUEST, "MISSING_API_KEY"),
            AppError::ProviderRateLimited => (StatusCode::TOO_MANY_REQUESTS, "PROVIDER_RATE_LIMITED"),
            AppError::ProviderUnauthorized => (StatusCode::UNAUTHORIZED, "PROVIDER_UNAUTHORIZED"),
            AppError::InputTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "INPUT_TOO_LARGE"),
            AppError::ProviderUnknown(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            AppError::EmptyInput(_) => (StatusCode::BAD_REQUEST, "EMPTY_INPUT"),
            AppError::OptimizeInProgress => (StatusCode::CONFLICT, "OPTIMIZE_IN_PROGRESS"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::ProviderUnknown(msg) => {
                tracing::error!("Provider error: {msg}");
                self.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
