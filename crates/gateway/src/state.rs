use std::sync::Arc;

use ob_assistant::Assistant;
use ob_domain::config::Config;
use ob_messaging::MessageGenerator;
use ob_providers::ProviderRegistry;
use ob_store::Store;

use crate::api::auth::Authenticator;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub store: Arc<Store>,
    pub llm: Arc<ProviderRegistry>,

    // ── Features ──────────────────────────────────────────────────────
    pub assistant: Arc<Assistant>,
    pub messages: Arc<MessageGenerator>,

    // ── Security (startup-computed) ───────────────────────────────────
    pub auth: Arc<Authenticator>,
}

impl AppState {
    /// Wire state from already-built parts. The assistant and message
    /// generator are derived from `llm` and `config`.
    pub fn new(
        config: Arc<Config>,
        store: Arc<Store>,
        llm: Arc<ProviderRegistry>,
        auth: Authenticator,
    ) -> Self {
        let assistant = Arc::new(Assistant::from_registry(&llm));
        let messages = Arc::new(MessageGenerator::from_config(&config.messaging));
        Self {
            config,
            store,
            llm,
            assistant,
            messages,
            auth: Arc::new(auth),
        }
    }

    /// Replace the assistant, e.g. with one backed by a scripted provider.
    pub fn with_assistant(mut self, assistant: Assistant) -> Self {
        self.assistant = Arc::new(assistant);
        self
    }
}
