use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request authentication
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How bearer tokens on protected routes are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Ask the hosted auth provider (`{url}/auth/v1/user`) who the token
    /// belongs to.
    #[default]
    Supabase,
    /// A single shared token read from the environment, mapped to a fixed
    /// user id. Intended for local development and tests.
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,
    /// Base URL of the auth provider (supabase mode).
    #[serde(default)]
    pub url: Option<String>,
    /// Environment variable holding the provider's service key.
    #[serde(default = "d_service_key_env")]
    pub service_key_env: String,
    /// Environment variable holding the shared token (static mode).
    #[serde(default = "d_static_token_env")]
    pub static_token_env: String,
    /// User id that the static token authenticates as.
    #[serde(default = "d_static_user_id")]
    pub static_user_id: String,
    /// Timeout for calls to the auth provider.
    #[serde(default = "d_5000")]
    pub timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            url: None,
            service_key_env: d_service_key_env(),
            static_token_env: d_static_token_env(),
            static_user_id: d_static_user_id(),
            timeout_ms: d_5000(),
        }
    }
}

impl AuthConfig {
    pub fn resolve_service_key(&self) -> Option<String> {
        non_empty_env(&self.service_key_env)
    }

    pub fn resolve_static_token(&self) -> Option<String> {
        non_empty_env(&self.static_token_env)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// ── serde default helpers ───────────────────────────────────────────

fn d_service_key_env() -> String {
    "ORBIT_AUTH_SERVICE_KEY".into()
}
fn d_static_token_env() -> String {
    "ORBIT_STATIC_TOKEN".into()
}
fn d_static_user_id() -> String {
    "local-user".into()
}
fn d_5000() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_mode() {
        let toml_str = r#"
            mode = "static"
            static_token_env = "MY_TOKEN"
        "#;
        let cfg: AuthConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.mode, AuthMode::Static);
        assert_eq!(cfg.static_token_env, "MY_TOKEN");
        assert_eq!(cfg.static_user_id, "local-user");
    }

    #[test]
    fn default_is_supabase() {
        let cfg: AuthConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.mode, AuthMode::Supabase);
        assert_eq!(cfg.service_key_env, "ORBIT_AUTH_SERVICE_KEY");
        assert_eq!(cfg.timeout_ms, 5_000);
    }
}
