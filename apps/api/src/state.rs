use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::layout::{default_page_config, PageConfig};
use crate::llm_client::{http_client, HttpProviderFactory, ProviderFactory};
use crate::optimize::session::SessionGuard;
use crate::text::LocationMatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Builds a completion provider from per-request settings.
    pub providers: Arc<dyn ProviderFactory>,
    /// In-flight optimize calls, keyed by session id.
    pub sessions: SessionGuard,
    pub matcher: Arc<LocationMatcher>,
    /// Page geometry for PDF export: A4 with 20/25 mm margins.
    pub page_config: PageConfig,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = http_client().context("Failed to build HTTP client")?;
        Self::with_providers(config, Arc::new(HttpProviderFactory::new(http)))
    }

    pub fn with_providers(config: Config, providers: Arc<dyn ProviderFactory>) -> Result<Self> {
        let matcher = config.location_matcher()?;
        Ok(AppState {
            config,
            providers,
            sessions: SessionGuard::new(),
            matcher: Arc::new(matcher),
            page_config: default_page_config(),
        })
    }
}
