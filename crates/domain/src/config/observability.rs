use serde::{Deserialize, Serialize};

/// Name the gateway reports to a trace collector unless configured.
pub const GATEWAY_SERVICE_NAME: &str = "orbit-gateway";

/// Filter used by `orbit serve` when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info,ob_gateway=debug,ob_store=info";

/// `[observability]`: how the gateway logs and traces.
///
/// Logs are always JSON lines on stdout. An `otlp_endpoint` additionally
/// ships request spans (and the task/reflection/message trace events inside
/// them) to a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
    /// Share of traces exported, `0.0..=1.0`.
    pub sample_rate: f64,
    /// `EnvFilter` directives, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: GATEWAY_SERVICE_NAME.into(),
            sample_rate: 1.0,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl ObservabilityConfig {
    /// The configured endpoint, ignoring a blank value.
    pub fn endpoint(&self) -> Option<&str> {
        self.otlp_endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Sample rate forced into range; NaN samples nothing.
    pub fn sample_ratio(&self) -> f64 {
        if self.sample_rate.is_nan() {
            0.0
        } else {
            self.sample_rate.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_logs_locally_as_the_gateway() {
        let cfg: ObservabilityConfig = toml::from_str("").unwrap();
        assert!(cfg.endpoint().is_none());
        assert_eq!(cfg.service_name, "orbit-gateway");
        assert_eq!(cfg.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(cfg.sample_ratio(), 1.0);
    }

    #[test]
    fn blank_endpoint_disables_export() {
        let cfg: ObservabilityConfig = toml::from_str(r#"otlp_endpoint = "  ""#).unwrap();
        assert!(cfg.endpoint().is_none());
    }

    #[test]
    fn sample_rate_is_clamped() {
        let cfg: ObservabilityConfig = toml::from_str(
            r#"
            otlp_endpoint = "http://collector:4317"
            sample_rate = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.endpoint(), Some("http://collector:4317"));
        assert_eq!(cfg.sample_ratio(), 1.0);

        let cfg = ObservabilityConfig {
            sample_rate: -0.3,
            ..Default::default()
        };
        assert_eq!(cfg.sample_ratio(), 0.0);
    }
}
