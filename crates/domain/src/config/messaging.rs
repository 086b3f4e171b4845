use serde::{Deserialize, Serialize};

/// Contextual messaging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// IANA timezone used for time-of-day when a request names none (or an
    /// invalid one).
    #[serde(default = "d_timezone")]
    pub default_timezone: String,
    /// Energy readings strictly below this raise `EnergyLow`.
    #[serde(default = "d_30")]
    pub low_energy_threshold: u8,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            default_timezone: d_timezone(),
            low_energy_threshold: d_30(),
        }
    }
}

fn d_timezone() -> String {
    "UTC".into()
}
fn d_30() -> u8 {
    30
}
