use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::validate_namespace;
use crate::Error;
use crate::Result;

/// Reconnect behaviour of a namespace watch.
///
/// Two fixed delays, no exponential growth and no retry cap: the first is
/// waited after the upstream closes a stream, the second after a failed
/// attempt to reopen it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Delay before reopening a stream the upstream closed (unit: milliseconds)
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Delay between failed reopen attempts (unit: milliseconds)
    #[serde(default = "default_resubscribe_backoff_ms")]
    pub resubscribe_backoff_ms: u64,

    /// Namespaces persisted as watched when the process boots
    #[serde(default)]
    pub seed_namespaces: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            resubscribe_backoff_ms: default_resubscribe_backoff_ms(),
            seed_namespaces: vec![],
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.reconnect_delay_ms == 0 {
            return Err(Error::InvalidConfig("watch.reconnect_delay_ms must be greater than 0".into()));
        }

        if self.resubscribe_backoff_ms < self.reconnect_delay_ms {
            return Err(Error::InvalidConfig(format!(
                "watch.resubscribe_backoff_ms ({}) must not be shorter than watch.reconnect_delay_ms ({})",
                self.resubscribe_backoff_ms, self.reconnect_delay_ms
            )));
        }

        for namespace in &self.seed_namespaces {
            validate_namespace(namespace).map_err(|_| {
                Error::InvalidConfig(format!("watch.seed_namespaces contains invalid name {namespace:?}"))
            })?;
        }

        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn resubscribe_backoff(&self) -> Duration {
        Duration::from_millis(self.resubscribe_backoff_ms)
    }
}

fn default_reconnect_delay_ms() -> u64 {
    1000
}

fn default_resubscribe_backoff_ms() -> u64 {
    5000
}
