//! AppState construction extracted from `main.rs`.
//!
//! `serve` and `doctor` share this path so both see the same wiring.

use std::sync::Arc;

use anyhow::Context;

use ob_domain::config::{Config, ConfigSeverity};
use ob_providers::ProviderRegistry;
use ob_store::Store;

use crate::api::auth::Authenticator;
use crate::state::AppState;

/// Log every config issue and fail when any of them is an error.
pub fn check_config(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Open the database at the configured path.
pub fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = config
        .database
        .resolve_path()
        .context("no database path configured")?;
    let store = Store::open(&path)
        .with_context(|| format!("opening database at {}", path.display()))?;
    tracing::info!(path = %path.display(), "database ready");
    Ok(store)
}

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    check_config(&config)?;

    // ── Database ─────────────────────────────────────────────────────
    let store = Arc::new(open_store(&config)?);

    // ── LLM providers ────────────────────────────────────────────────
    let llm = Arc::new(ProviderRegistry::from_config(&config.llm));
    if llm.is_empty() {
        tracing::warn!("no LLM providers available, assistant will serve fallbacks");
    } else {
        tracing::info!(providers = ?llm.list_providers(), "LLM providers ready");
    }
    for (id, err) in llm.init_errors() {
        tracing::warn!(provider = %id, error = %err, "LLM provider failed to initialize");
    }

    // ── Auth ─────────────────────────────────────────────────────────
    let auth = Authenticator::from_config(&config.auth).context("initializing auth")?;
    tracing::info!(mode = auth.mode(), "auth ready");

    let state = AppState::new(config, store, llm, auth);
    tracing::info!(online = state.assistant.is_online(), "assistant ready");
    Ok(state)
}
