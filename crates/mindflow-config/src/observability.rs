//! Logging, tracing export, and metrics settings.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LOG_LEVEL` | `info` |
//! | `LOG_DIR` | `storage/logs` |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset (no span export) |
//! | `ENVIRONMENT` | `development` |
//! | `METRICS_ENABLED` | `true` |
//! | `METRICS_PORT` | `9090` |

use std::env;

#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_dir: String,
    pub otlp_endpoint: Option<String>,
    pub environment: String,
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "storage/logs".to_string()),
            otlp_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: env::var("METRICS_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(9090),
        }
    }
}
