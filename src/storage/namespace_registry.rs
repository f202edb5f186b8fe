//! Durable set of namespaces that should be watched.
//!
//! The registry is the source of truth the watch manager reconciles against
//! on startup. Membership is idempotent in both directions.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NamespaceRegistry: Send + Sync + 'static {
    /// Persists `namespace`. Adding an already-present namespace is a no-op
    /// and keeps its original creation time.
    async fn add(
        &self,
        namespace: &str,
    ) -> Result<()>;

    /// Deletes `namespace`. Removing an absent namespace is a no-op.
    async fn remove(
        &self,
        namespace: &str,
    ) -> Result<()>;

    /// All persisted namespaces, most recently added first.
    async fn list_all(&self) -> Result<Vec<String>>;
}
