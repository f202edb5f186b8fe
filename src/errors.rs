//! Event Watcher Error Hierarchy
//!
//! Errors are grouped by the layer that produced them: durable storage,
//! the upstream event source, the query surface and configuration.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Namespace registry or event sink failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Upstream event source failures
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Rejected read requests
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Namespace name rejected before any state was touched
    #[error("Invalid namespace name: {0:?}")]
    InvalidNamespace(String),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization failures for persisted records
    #[error(transparent)]
    BincodeError(#[from] bincode::Error),

    /// Embedded database errors
    #[error(transparent)]
    SledError(#[from] sled::Error),

    /// Backend specific failures that carry only a message
    #[error("Embedded database error: {0}")]
    DbError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Opening a watch subscription failed
    #[error("Failed to subscribe to events in namespace {namespace}: {source}")]
    Subscribe {
        namespace: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An error item reported inside an open subscription
    #[error("Event stream error: {0}")]
    Stream(String),

    /// An upstream item that cannot be turned into an `Event`
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// Kubeconfig could not be loaded
    #[error("Kubernetes client config error: {0}")]
    ClientConfig(String),

    /// Kubernetes client construction or request failures
    #[error(transparent)]
    Kube(#[from] Box<kube::Error>),
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("limit must be positive, got {0}")]
    InvalidLimit(i64),
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Error::Storage(StorageError::SledError(e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Storage(StorageError::BincodeError(e))
    }
}

impl From<kube::Error> for Error {
    fn from(e: kube::Error) -> Self {
        Error::Source(SourceError::Kube(Box::new(e)))
    }
}
