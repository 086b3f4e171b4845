pub mod config;
pub mod doctor;
pub mod message;

use clap::{Parser, Subcommand};

/// Orbit: tasks, moods and focus sessions with an assistant on the side.
#[derive(Debug, Parser)]
#[command(name = "orbit", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the API server (default when no subcommand is given).
    Serve,
    /// Run diagnostic checks against the current configuration.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print a contextual message using the offline generator.
    Message {
        /// Trigger name, e.g. `no_task` or `energy_low`.
        trigger: String,
        /// Current mode (build, flow or restore).
        #[arg(long)]
        mode: Option<String>,
        /// Current mood, free text.
        #[arg(long)]
        mood: Option<String>,
        /// Time of day (morning, afternoon, evening or night).
        #[arg(long)]
        time_of_day: Option<String>,
        /// Output the full response as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `ORBIT_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
///
/// [`Config`]: ob_domain::config::Config
pub fn load_config() -> anyhow::Result<(ob_domain::config::Config, String)> {
    let config_path = std::env::var("ORBIT_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse the file at `path`, or return defaults when it does not exist.
pub fn load_config_from(path: &str) -> anyhow::Result<ob_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(ob_domain::config::Config::default());
    }
    let raw =
        std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, ob_domain::config::Config::default().server.port);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();
        let config = load_config_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = load_config_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn message_flags_parse() {
        let cli = Cli::try_parse_from([
            "orbit",
            "message",
            "energy_low",
            "--mode",
            "restore",
            "--time-of-day",
            "night",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Message { trigger, mode, time_of_day, .. }) => {
                assert_eq!(trigger, "energy_low");
                assert_eq!(mode.as_deref(), Some("restore"));
                assert_eq!(time_of_day.as_deref(), Some("night"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
