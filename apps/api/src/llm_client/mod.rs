//! LLM Client: the single point of entry for all completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call a provider API directly.
//! Handlers and services depend on the `CompletionProvider` trait; the two
//! concrete providers live in `openai` and `anthropic`.
//!
//! Calls are single attempts. Failures are mapped onto `LlmError` and surfaced
//! to the user, never retried.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod anthropic;
pub mod budget;
pub mod openai;
pub mod prompts;
#[cfg(test)]
pub mod stub;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Per-request timeout applied to the shared HTTP client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("the provider is rate limiting requests")]
    RateLimited,

    #[error("the provider rejected the API key")]
    Unauthorized,

    #[error("input too large: {0}")]
    InputTooLarge(String),

    #[error("the provider returned empty content")]
    EmptyContent,

    #[error("provider error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        LlmError::Unknown(e.to_string())
    }
}

/// Maps a non-success HTTP status (and the provider's error message) to an `LlmError`.
pub(crate) fn error_for_status(status: StatusCode, message: String) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized,
        StatusCode::PAYLOAD_TOO_LARGE => LlmError::InputTooLarge(message),
        StatusCode::BAD_REQUEST if mentions_context_length(&message) => {
            LlmError::InputTooLarge(message)
        }
        _ => LlmError::Unknown(format!("status {}: {message}", status.as_u16())),
    }
}

fn mentions_context_length(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["context length", "context_length", "too long", "too many tokens", "maximum context"]
        .iter()
        .any(|needle| lower.contains(needle))
}

// ────────────────────────────────────────────────────────────────────────────
// Provider selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => openai::DEFAULT_MODEL,
            ProviderKind::Anthropic => anthropic::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(format!(
                "unknown provider '{other}', expected 'openai' or 'anthropic'"
            )),
        }
    }
}

/// Everything needed to talk to one provider, resolved per request.
#[derive(Debug, Clone)]
pub struct OptimizerSettings {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub max_output_tokens: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Provider trait
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub cv_text: String,
    pub job_description: String,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn user_prompt(&self) -> String {
        prompts::optimize_user_prompt(&self.cv_text, &self.job_description)
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    /// Returns the completion text, or a typed failure.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Builds the provider named by `settings`, sharing the pooled HTTP client.
pub fn build_provider(settings: &OptimizerSettings, http: Client) -> Arc<dyn CompletionProvider> {
    match settings.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(
            http,
            settings.api_key.clone(),
            settings.model.clone(),
        )),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(
            http,
            settings.api_key.clone(),
            settings.model.clone(),
        )),
    }
}

/// Creates a provider for each request's resolved settings.
///
/// Handlers depend on this seam rather than on concrete providers.
pub trait ProviderFactory: Send + Sync {
    fn build(&self, settings: &OptimizerSettings) -> Arc<dyn CompletionProvider>;
}

/// Factory for the real HTTP providers.
pub struct HttpProviderFactory {
    http: Client,
}

impl HttpProviderFactory {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn build(&self, settings: &OptimizerSettings) -> Arc<dyn CompletionProvider> {
        build_provider(settings, self.http.clone())
    }
}

/// Builds the shared HTTP client used for every provider call.
pub fn http_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}
