use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Database
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file. `":memory:"` opens a private in-memory
    /// database.
    #[serde(default = "d_path")]
    pub path: Option<PathBuf>,
    /// Environment variable that, when set, overrides `path`.
    #[serde(default = "d_path_env")]
    pub path_env: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: d_path(),
            path_env: d_path_env(),
        }
    }
}

impl DatabaseConfig {
    /// The effective database path: the env override first, then `path`.
    pub fn resolve_path(&self) -> Option<PathBuf> {
        std::env::var(&self.path_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| self.path.clone().filter(|p| !p.as_os_str().is_empty()))
    }
}

fn d_path() -> Option<PathBuf> {
    Some(PathBuf::from("orbit.db"))
}
fn d_path_env() -> String {
    "ORBIT_DATABASE_PATH".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_empty_path_resolves_to_none() {
        let cfg = DatabaseConfig {
            path: Some(PathBuf::new()),
            path_env: "OB_TEST_DB_ENV_NEVER_SET".into(),
        };
        assert!(cfg.resolve_path().is_none());
    }

    #[test]
    fn configured_path_is_used_without_env() {
        let cfg = DatabaseConfig {
            path: Some("data/orbit.db".into()),
            path_env: "OB_TEST_DB_ENV_NEVER_SET".into(),
        };
        assert_eq!(cfg.resolve_path(), Some(PathBuf::from("data/orbit.db")));
    }
}
