//! Observability configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Telemetry configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TelemetryConfig {
    /// Fallback `tracing` filter directives when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    #[validate(length(min = 1))]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".into()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}
