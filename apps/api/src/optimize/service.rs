//! CV optimization: rewrites a CV for a job description through the LLM.
//!
//! Flow: validate input → resolve provider settings → token budget check →
//!       claim the session → provider call → sanitize → parse.
//!
//! Everything that can be rejected locally is rejected before the network
//! call. The provider's output is never trusted to follow the formatting
//! contract; it goes through the same sanitize/parse pipeline as pasted text.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::budget::check_input_budget;
use crate::llm_client::prompts::OPTIMIZE_SYSTEM;
use crate::llm_client::{CompletionRequest, OptimizerSettings, ProviderKind};
use crate::state::AppState;
use crate::text::{parse_cv, ParsedCv};

/// Request body for `POST /api/v1/cv/optimize`. Provider fields override the
/// server defaults for this request only.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeRequest {
    pub cv_text: String,
    pub job_description: String,
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse {
    /// Sanitized provider output.
    pub optimized_text: String,
    pub document: ParsedCv,
    pub provider: ProviderKind,
    pub model: String,
}

fn validate(request: &OptimizeRequest) -> Result<(), AppError> {
    if request.cv_text.trim().is_empty() {
        return Err(AppError::EmptyInput("the CV text"));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::EmptyInput("a job description"));
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Request overrides first, then the server configuration.
pub fn resolve_settings(
    request: &OptimizeRequest,
    config: &Config,
) -> Result<OptimizerSettings, AppError> {
    let provider = request.provider.unwrap_or(config.ai_provider);

    let api_key = non_blank(request.api_key.as_deref())
        .or_else(|| non_blank(config.api_key_for(provider)))
        .ok_or(AppError::MissingApiKey(provider))?
        .to_string();

    let model = non_blank(request.model.as_deref())
        .unwrap_or_else(|| config.model_for(provider))
        .to_string();

    Ok(OptimizerSettings {
        provider,
        api_key,
        model,
        max_output_tokens: config.max_output_tokens,
    })
}

/// Runs one optimize call on behalf of `session_id`.
pub async fn optimize_cv(
    state: &AppState,
    session_id: &str,
    request: OptimizeRequest,
) -> Result<OptimizeResponse, AppError> {
    validate(&request)?;
    let settings = resolve_settings(&request, &state.config)?;

    let estimated = check_input_budget(
        OPTIMIZE_SYSTEM,
        &request.cv_text,
        &request.job_description,
        state.config.max_input_tokens,
    )?;

    let _permit = state
        .sessions
        .try_acquire(session_id)
        .ok_or(AppError::OptimizeInProgress)?;

    info!(
        provider = %settings.provider,
        model = %settings.model,
        estimated_tokens = estimated,
        "Calling provider"
    );

    let provider = state.providers.build(&settings);
    let completion = provider
        .complete(&CompletionRequest {
            system_prompt: OPTIMIZE_SYSTEM.to_string(),
            cv_text: request.cv_text,
            job_description: request.job_description,
            max_tokens: settings.max_output_tokens,
        })
        .await
        .map_err(|e| {
            warn!("Optimize failed: {e}");
            AppError::from(e)
        })?;

    let document = parse_cv(&completion, &state.matcher);
    if document.is_empty() {
        return Err(AppError::ProviderUnknown(
            "the response contained no CV text".to_string(),
        ));
    }

    info!(sections = document.sections.len(), "Optimize complete");

    Ok(OptimizeResponse {
        optimized_text: document.clean_text.clone(),
        document,
        provider: settings.provider,
        model: settings.model,
    })
}
