use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider system
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "d_20000u")]
    pub default_timeout_ms: u64,
    /// Role used by the assistant. Format: "provider_id/model_name".
    #[serde(default = "d_assistant_role")]
    pub assistant_role: String,
    /// Extra named roles (key = role name, value = "provider_id/model").
    #[serde(default)]
    pub roles: HashMap<String, String>,
    /// Registered LLM providers.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: d_20000u(),
            assistant_role: d_assistant_role(),
            roles: HashMap::new(),
            providers: Vec::new(),
        }
    }
}

impl LlmConfig {
    /// Look up a role's "provider/model" spec. `assistant` always resolves
    /// to `assistant_role`.
    pub fn role(&self, name: &str) -> Option<&str> {
        if name == "assistant" {
            return Some(self.assistant_role.as_str());
        }
        self.roles.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub id: String,
    pub kind: ProviderKind,
    pub base_url: String,
    #[serde(default)]
    pub auth: ProviderAuth,
    #[serde(default)]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenaiCompat,
    Anthropic,
}

/// Where a provider's API key comes from and how it is sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderAuth {
    /// Header name (e.g. "Authorization", "x-api-key").
    #[serde(default)]
    pub header: Option<String>,
    /// Header value prefix (e.g. "Bearer ").
    #[serde(default)]
    pub prefix: Option<String>,
    /// Env var containing the key.
    #[serde(default)]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer `env`).
    #[serde(default)]
    pub key: Option<String>,
}

impl ProviderAuth {
    /// Resolve the key: the env var when set and non-empty, else `key`.
    pub fn resolve_key(&self) -> Option<String> {
        self.env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.key.clone().filter(|k| !k.is_empty()))
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_20000u() -> u64 {
    20_000
}
fn d_assistant_role() -> String {
    "openai/gpt-4o-mini".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_providers_and_roles() {
        let toml_str = r#"
            assistant_role = "claude/claude-3-5-haiku-latest"

            [roles]
            quotes = "openai/gpt-4o-mini"

            [[providers]]
            id = "claude"
            kind = "anthropic"
            base_url = "https://api.anthropic.com"
            auth = { env = "ANTHROPIC_API_KEY" }
        "#;
        let cfg: LlmConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.providers.len(), 1);
        assert_eq!(cfg.providers[0].kind, ProviderKind::Anthropic);
        assert_eq!(cfg.role("assistant"), Some("claude/claude-3-5-haiku-latest"));
        assert_eq!(cfg.role("quotes"), Some("openai/gpt-4o-mini"));
        assert_eq!(cfg.role("missing"), None);
    }

    #[test]
    fn direct_key_used_when_env_absent() {
        let auth = ProviderAuth {
            env: Some("OB_TEST_PROVIDER_KEY_NEVER_SET".into()),
            key: Some("sk-direct".into()),
            ..Default::default()
        };
        assert_eq!(auth.resolve_key().as_deref(), Some("sk-direct"));
    }

    #[test]
    fn no_key_resolves_to_none() {
        assert!(ProviderAuth::default().resolve_key().is_none());
    }
}
