//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{MainStrandDetector, MainStrandRule};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Main-strand detection.
    pub main_strand: MainStrandConfig,

    /// Outbound client settings.
    pub client: ClientConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Main-strand detection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MainStrandConfig {
    /// Which caller name is compared with the entry point.
    pub rule: MainStrandRule,

    /// Entry-point function name (default: `onMessage`).
    pub entry_point: String,
}

impl Default for MainStrandConfig {
    fn default() -> Self {
        let detector = MainStrandDetector::default();
        Self {
            rule: detector.rule(),
            entry_point: detector.entry_point().to_string(),
        }
    }
}

impl From<&MainStrandConfig> for MainStrandDetector {
    fn from(config: &MainStrandConfig) -> Self {
        MainStrandDetector::new(config.rule, config.entry_point.clone())
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL request targets are resolved against.
    pub base_url: String,

    /// Headers added to every request unless the call overrides them.
    pub default_headers: BTreeMap<String, String>,

    /// Optional User-Agent header.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            default_headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}

/// Logging and metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Record invocation counters and latency through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "resource_dispatch=info".to_string(),
            metrics_enabled: true,
        }
    }
}
