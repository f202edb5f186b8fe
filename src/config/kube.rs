use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Watch requests must time out below 295 seconds or the client rejects them.
const MAX_WATCH_TIMEOUT_SECS: u32 = 294;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KubeConfig {
    /// Kubeconfig context to use; in-cluster or current context when unset
    #[serde(default)]
    pub context: Option<String>,

    /// Server-side timeout of one watch request, after which the upstream
    /// closes the stream and the watch reconnects
    #[serde(default = "default_watch_timeout_secs")]
    pub watch_timeout_secs: u32,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            context: None,
            watch_timeout_secs: default_watch_timeout_secs(),
        }
    }
}

impl KubeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.watch_timeout_secs == 0 || self.watch_timeout_secs > MAX_WATCH_TIMEOUT_SECS {
            return Err(Error::InvalidConfig(format!(
                "kube.watch_timeout_secs must be within 1..={MAX_WATCH_TIMEOUT_SECS}, got {}",
                self.watch_timeout_secs
            )));
        }

        if matches!(&self.context, Some(ctx) if ctx.trim().is_empty()) {
            return Err(Error::InvalidConfig("kube.context cannot be blank".into()));
        }

        Ok(())
    }
}

fn default_watch_timeout_secs() -> u32 {
    290
}
