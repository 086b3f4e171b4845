//! Provider registry.
//!
//! Constructs and holds all configured LLM provider instances. At startup the
//! registry reads the [`LlmConfig`], resolves API keys, and instantiates the
//! adapter for each configured provider.

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;
use crate::traits::LlmProvider;
use ob_domain::config::{LlmConfig, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Holds all instantiated LLM providers and role assignments.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    /// role name -> "provider_id/model"
    roles: HashMap<String, String>,
    /// provider id -> init error, for diagnostics.
    init_errors: HashMap<String, String>,
}

impl ProviderRegistry {
    /// Build the registry from the application's [`LlmConfig`].
    ///
    /// Providers that fail to initialize (usually a missing API key) are
    /// logged and skipped rather than aborting startup.
    pub fn from_config(config: &LlmConfig) -> Self {
        let timeout = Duration::from_millis(config.default_timeout_ms);
        let mut registry = Self::default();

        for pc in &config.providers {
            let result = match pc.kind {
                ProviderKind::OpenaiCompat => OpenAiCompatProvider::from_config(pc, timeout)
                    .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
                ProviderKind::Anthropic => AnthropicProvider::from_config(pc, timeout)
                    .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
            };

            match result {
                Ok(provider) => {
                    tracing::info!(provider_id = %pc.id, kind = ?pc.kind, "registered LLM provider");
                    registry.providers.insert(pc.id.clone(), provider);
                }
                Err(e) => {
                    tracing::warn!(
                        provider_id = %pc.id,
                        kind = ?pc.kind,
                        error = %e,
                        "failed to initialize LLM provider, skipping"
                    );
                    registry.init_errors.insert(pc.id.clone(), e.to_string());
                }
            }
        }

        if registry.providers.is_empty() {
            tracing::warn!("no LLM providers initialized; assistant will serve fallback content");
        }

        registry
            .roles
            .insert("assistant".into(), config.assistant_role.clone());
        for (name, spec) in &config.roles {
            registry.roles.insert(name.clone(), spec.clone());
        }
        registry
    }

    /// Register a provider directly (used by tests and embedders).
    pub fn insert(&mut self, provider: Arc<dyn LlmProvider>) {
        self.providers
            .insert(provider.provider_id().to_string(), provider);
    }

    /// Assign a role to a "provider_id/model" spec.
    pub fn set_role(&mut self, role: impl Into<String>, spec: impl Into<String>) {
        self.roles.insert(role.into(), spec.into());
    }

    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(provider_id).cloned()
    }

    /// Resolve a role to its provider and model name. The role spec is
    /// "provider_id/model_name"; a spec without a model uses the
    /// provider's default.
    pub fn for_role(&self, role: &str) -> Option<(Arc<dyn LlmProvider>, Option<String>)> {
        let spec = self.roles.get(role)?;
        let (provider_id, model) = match spec.split_once('/') {
            Some((p, m)) if !m.is_empty() => (p, Some(m.to_string())),
            Some((p, _)) => (p, None),
            None => (spec.as_str(), None),
        };
        self.providers
            .get(provider_id)
            .cloned()
            .map(|p| (p, model))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// List all registered provider IDs (sorted).
    pub fn list_providers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Providers that were configured but could not be initialized.
    pub fn init_errors(&self) -> &HashMap<String, String> {
        &self.init_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{ChatRequest, ChatResponse};
    use ob_domain::config::{ProviderAuth, ProviderConfig};
    use ob_domain::error::Result;

    struct Echo;

    #[async_trait::async_trait]
    impl LlmProvider for Echo {
        async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                content: req.model.clone().unwrap_or_default(),
                usage: None,
                model: "echo".into(),
                finish_reason: None,
            })
        }

        fn provider_id(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn provider_without_key_is_skipped() {
        let config = LlmConfig {
            providers: vec![ProviderConfig {
                id: "openai".into(),
                kind: ProviderKind::OpenaiCompat,
                base_url: "https://api.openai.com/v1".into(),
                auth: ProviderAuth {
                    env: Some("OB_TEST_REGISTRY_KEY_NEVER_SET".into()),
                    ..Default::default()
                },
                default_model: None,
            }],
            ..Default::default()
        };
        let registry = ProviderRegistry::from_config(&config);
        assert!(registry.is_empty());
        assert!(registry.init_errors().contains_key("openai"));
        assert!(registry.for_role("assistant").is_none());
    }

    #[test]
    fn role_splits_provider_and_model() {
        let mut registry = ProviderRegistry::default();
        registry.insert(Arc::new(Echo));
        registry.set_role("assistant", "echo/tiny-model");
        registry.set_role("bare", "echo");

        let (p, model) = registry.for_role("assistant").unwrap();
        assert_eq!(p.provider_id(), "echo");
        assert_eq!(model.as_deref(), Some("tiny-model"));

        let (_, model) = registry.for_role("bare").unwrap();
        assert!(model.is_none());
        assert_eq!(registry.list_providers(), vec!["echo"]);
    }
}
