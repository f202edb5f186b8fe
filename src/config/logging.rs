use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory of the log file; logs go to stdout when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.log_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("logging.log_dir cannot be empty".into()));
            }
        }
        Ok(())
    }
}
