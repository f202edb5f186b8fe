//! Configuration management for the event watcher process.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Component-wise validation
mod kube;
mod logging;
mod monitoring;
mod storage;
mod watch;
pub use self::kube::*;
pub use logging::*;
pub use monitoring::*;
pub use storage::*;
pub use watch::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Prefix of environment variables that override configuration values,
/// e.g. `EVENTWATCH__WATCH__RECONNECT_DELAY_MS=500`.
pub const ENV_PREFIX: &str = "EVENTWATCH";

/// Main configuration container
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct EventWatchConfig {
    /// Durable storage location and sizing
    #[serde(default)]
    pub storage: StorageConfig,
    /// Reconnect policy and namespaces seeded at boot
    #[serde(default)]
    pub watch: WatchConfig,
    /// Kubernetes client settings
    #[serde(default)]
    pub kube: KubeConfig,
    /// Prometheus endpoint
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Debug for EventWatchConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EventWatchConfig")
            .field("storage", &self.storage)
            .field("watch", &self.watch)
            .finish()
    }
}

impl EventWatchConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `EVENTWATCH__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred so that `with_override_config()` can still be
    /// applied. Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/eventwatch.toml");
    /// std::env::set_var("EVENTWATCH__WATCH__RESUBSCRIBE_BACKOFF_MS", "10000");
    /// let cfg = EventWatchConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    ///
    /// Must be called after all overrides are applied.
    pub fn validate(self) -> Result<Self> {
        self.storage.validate()?;
        self.watch.validate()?;
        self.kube.validate()?;
        self.monitoring.validate()?;
        self.logging.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("watch.seed_namespaces")
}
