mod auth;
mod database;
mod llm;
mod messaging;
mod observability;
mod server;

pub use auth::*;
pub use database::*;
pub use llm::*;
pub use messaging::*;
pub use observability::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Environment lookups (database path override, auth secrets) are done
    /// here so that a missing secret is reported before the server binds.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error(
                "server.port",
                "port must be greater than 0",
            ));
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }

        if self.database.resolve_path().is_none() {
            errors.push(ConfigError::error(
                "database.path",
                format!(
                    "no database path configured (set database.path or ${})",
                    self.database.path_env
                ),
            ));
        }

        match self.auth.mode {
            AuthMode::Supabase => {
                if self.auth.url.as_deref().map_or(true, str::is_empty) {
                    errors.push(ConfigError::error(
                        "auth.url",
                        "auth provider url is required in supabase mode",
                    ));
                }
                if self.auth.resolve_service_key().is_none() {
                    errors.push(ConfigError::error(
                        "auth.service_key_env",
                        format!("${} is not set", self.auth.service_key_env),
                    ));
                }
            }
            AuthMode::Static => {
                if self.auth.resolve_static_token().is_none() {
                    errors.push(ConfigError::error(
                        "auth.static_token_env",
                        format!("${} is not set", self.auth.static_token_env),
                    ));
                }
                if self.auth.static_user_id.is_empty() {
                    errors.push(ConfigError::error(
                        "auth.static_user_id",
                        "static user id must not be empty",
                    ));
                }
            }
        }

        if self.llm.providers.is_empty() {
            errors.push(ConfigError::warning(
                "llm.providers",
                "no LLM providers configured; assistant will use fallback content",
            ));
        }

        for (i, provider) in self.llm.providers.iter().enumerate() {
            if provider.id.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].id"),
                    "provider id must not be empty",
                ));
            }
            if provider.base_url.is_empty() {
                errors.push(ConfigError::error(
                    format!("llm.providers[{i}].base_url"),
                    "provider base_url must not be empty",
                ));
            }
        }

        if let Some((provider, _)) = self.llm.assistant_role.split_once('/') {
            if !self.llm.providers.is_empty()
                && !self.llm.providers.iter().any(|p| p.id == provider)
            {
                errors.push(ConfigError::warning(
                    "llm.assistant_role",
                    format!("provider '{provider}' is not configured"),
                ));
            }
        } else {
            errors.push(ConfigError::error(
                "llm.assistant_role",
                "expected \"provider_id/model\"",
            ));
        }

        if self.messaging.low_energy_threshold > 100 {
            errors.push(ConfigError::error(
                "messaging.low_energy_threshold",
                "threshold must be between 0 and 100",
            ));
        }

        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            errors.push(ConfigError::warning(
                "observability.sample_rate",
                "sample rate outside 0.0..=1.0 is clamped",
            ));
        }

        if self.observability.log_filter.trim().is_empty() {
            errors.push(ConfigError::warning(
                "observability.log_filter",
                "empty log filter only shows errors unless RUST_LOG is set",
            ));
        }

        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], field: &str) -> bool {
        errors
            .iter()
            .any(|e| e.severity == ConfigSeverity::Error && e.field == field)
    }

    #[test]
    fn port_zero_is_fatal() {
        let mut cfg = Config::default();
        cfg.server.port = 0;
        assert!(has_error(&cfg.validate(), "server.port"));
    }

    #[test]
    fn missing_providers_is_only_a_warning() {
        let cfg = Config::default();
        let errors = cfg.validate();
        let llm: Vec<_> = errors.iter().filter(|e| e.field == "llm.providers").collect();
        assert_eq!(llm.len(), 1);
        assert_eq!(llm[0].severity, ConfigSeverity::Warning);
    }

    #[test]
    fn supabase_mode_needs_url() {
        let mut cfg = Config::default();
        cfg.auth.mode = AuthMode::Supabase;
        cfg.auth.url = None;
        assert!(has_error(&cfg.validate(), "auth.url"));
    }

    #[test]
    fn static_mode_needs_token() {
        let mut cfg = Config::default();
        cfg.auth.mode = AuthMode::Static;
        cfg.auth.static_token_env = "OB_TEST_TOKEN_THAT_IS_NEVER_SET".into();
        assert!(has_error(&cfg.validate(), "auth.static_token_env"));
    }

    #[test]
    fn explicit_database_path_satisfies_validation() {
        let mut cfg = Config::default();
        cfg.database.path = Some("orbit.db".into());
        assert!(!has_error(&cfg.validate(), "database.path"));
    }

    #[test]
    fn malformed_assistant_role_is_fatal() {
        let mut cfg = Config::default();
        cfg.llm.assistant_role = "gpt-4o".into();
        assert!(has_error(&cfg.validate(), "llm.assistant_role"));
    }

    #[test]
    fn out_of_range_sample_rate_is_a_warning() {
        let mut cfg = Config::default();
        cfg.observability.sample_rate = 1.5;
        let errors = cfg.validate();
        let obs: Vec<_> = errors
            .iter()
            .filter(|e| e.field == "observability.sample_rate")
            .collect();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].severity, ConfigSeverity::Warning);
    }

    #[test]
    fn display_has_severity_tag() {
        let e = ConfigError::warning("a.b", "careful");
        assert_eq!(e.to_string(), "[WARN] a.b: careful");
    }
}
