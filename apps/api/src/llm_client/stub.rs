//! In-memory provider for tests. Records every call; never touches the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::llm_client::{
    CompletionProvider, CompletionRequest, LlmError, OptimizerSettings, ProviderFactory,
    ProviderKind,
};

type Reply = Box<dyn Fn() -> Result<String, LlmError> + Send + Sync>;

pub struct StubProvider {
    reply: Reply,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
    /// When set, `complete` waits for a notification before replying.
    hold: Option<Arc<Notify>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with_reply(Box::new(move || Ok(text.clone())))
    }

    pub fn failing(make: fn() -> LlmError) -> Self {
        Self::with_reply(Box::new(move || Err(make())))
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            hold: None,
        }
    }

    pub fn held_by(mut self, notify: Arc<Notify>) -> Self {
        self.hold = Some(notify);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        (self.reply)()
    }
}

/// Hands out one shared `StubProvider` and records the settings it was asked for.
pub struct StubFactory {
    pub provider: Arc<StubProvider>,
    pub last_settings: Mutex<Option<OptimizerSettings>>,
}

impl StubFactory {
    pub fn new(provider: StubProvider) -> Self {
        Self {
            provider: Arc::new(provider),
            last_settings: Mutex::new(None),
        }
    }
}

impl ProviderFactory for StubFactory {
    fn build(&self, settings: &OptimizerSettings) -> Arc<dyn CompletionProvider> {
        *self.last_settings.lock().unwrap() = Some(settings.clone());
        self.provider.clone()
    }
}
