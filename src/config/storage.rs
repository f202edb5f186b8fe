use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory of the embedded database
    #[serde(default = "default_db_root_dir")]
    pub db_root_dir: PathBuf,

    /// Sled page cache size for the event and namespace trees
    #[serde(default = "default_cache_capacity_bytes")]
    pub cache_capacity_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_root_dir: default_db_root_dir(),
            cache_capacity_bytes: default_cache_capacity_bytes(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.db_root_dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("storage.db_root_dir cannot be empty".into()));
        }
        if self.cache_capacity_bytes == 0 {
            return Err(Error::InvalidConfig(
                "storage.cache_capacity_bytes must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_db_root_dir() -> PathBuf {
    PathBuf::from("./db")
}

fn default_cache_capacity_bytes() -> u64 {
    64 * 1024 * 1024 //64MB
}
