use anyhow::{Context, Result};
use regex::Regex;

use crate::extract::{lines::DEFAULT_LINE_BREAK_THRESHOLD, ExtractorConfig};
use crate::llm_client::{budget::DEFAULT_MAX_INPUT_TOKENS, ProviderKind, DEFAULT_MAX_OUTPUT_TOKENS};
use crate::text::LocationMatcher;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_LOCATION_MARKER: &str = "Tel Aviv, Israel";

/// Application configuration loaded from environment variables.
/// Every variable is optional; provider API keys may also arrive per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ai_provider: ProviderKind,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub max_output_tokens: u32,
    pub max_input_tokens: usize,
    pub line_break_threshold: f32,
    /// Literal location markers, e.g. "Tel Aviv, Israel".
    pub location_markers: Vec<String>,
    /// Optional regex for locations not in the literal list.
    pub location_pattern: Option<String>,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            ai_provider: ProviderKind::OpenAi,
            openai_api_key: None,
            anthropic_api_key: None,
            openai_model: ProviderKind::OpenAi.default_model().to_string(),
            anthropic_model: ProviderKind::Anthropic.default_model().to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            line_break_threshold: DEFAULT_LINE_BREAK_THRESHOLD,
            location_markers: vec![DEFAULT_LOCATION_MARKER.to_string()],
            location_pattern: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            ai_provider: match optional_env("AI_PROVIDER") {
                Some(v) => v
                    .parse::<ProviderKind>()
                    .map_err(anyhow::Error::msg)
                    .context("AI_PROVIDER must be 'openai' or 'anthropic'")?,
                None => defaults.ai_provider,
            },
            openai_api_key: optional_env("OPENAI_API_KEY"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            openai_model: optional_env("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            anthropic_model: optional_env("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic_model),
            max_output_tokens: parse_env("LLM_MAX_OUTPUT_TOKENS", defaults.max_output_tokens)?,
            max_input_tokens: parse_env("LLM_MAX_INPUT_TOKENS", defaults.max_input_tokens)?,
            line_break_threshold: parse_env(
                "PDF_LINE_BREAK_THRESHOLD",
                defaults.line_break_threshold,
            )?,
            location_markers: optional_env("CV_LOCATION_MARKERS")
                .map(|v| split_markers(&v))
                .unwrap_or(defaults.location_markers),
            location_pattern: optional_env("CV_LOCATION_PATTERN"),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        };

        // Fail at startup rather than on the first request.
        config.location_matcher()?;
        Ok(config)
    }

    pub fn api_key_for(&self, provider: ProviderKind) -> Option<&str> {
        match provider {
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
            ProviderKind::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    pub fn model_for(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::OpenAi => &self.openai_model,
            ProviderKind::Anthropic => &self.anthropic_model,
        }
    }

    pub fn location_matcher(&self) -> Result<LocationMatcher> {
        let pattern = self
            .location_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("CV_LOCATION_PATTERN must be a valid regular expression")?;
        Ok(LocationMatcher::new(self.location_markers.clone(), pattern))
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            line_break_threshold: self.line_break_threshold,
        }
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(v) => v
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{v}'")),
        None => Ok(default),
    }
}

/// `;`-separated list; commas belong to the markers themselves.
fn split_markers(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
