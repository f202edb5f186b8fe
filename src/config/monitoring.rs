use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

const DEFAULT_METRICS_PORT: u16 = 9090;

/// Prometheus `/metrics` endpoint. Off unless `prometheus_enabled` is set.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub prometheus_enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub prometheus_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            prometheus_enabled: false,
            prometheus_port: DEFAULT_METRICS_PORT,
        }
    }
}

impl MonitoringConfig {
    /// Port the metrics endpoint binds, if it is served at all.
    pub fn metrics_port(&self) -> Option<u16> {
        self.prometheus_enabled.then_some(self.prometheus_port)
    }

    /// The port is only checked when the endpoint is served. Ports below
    /// 1024, 0 included, are refused since the watcher runs unprivileged.
    pub fn validate(&self) -> Result<()> {
        match self.metrics_port() {
            Some(port) if port < 1024 => Err(Error::InvalidConfig(format!(
                "monitoring.prometheus_port must be within 1024..=65535 when enabled, got {port}"
            ))),
            _ => Ok(()),
        }
    }
}

fn default_metrics_port() -> u16 {
    DEFAULT_METRICS_PORT
}
