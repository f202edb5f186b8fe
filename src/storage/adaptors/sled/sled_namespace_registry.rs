use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::error;

use crate::constants::WATCHED_NAMESPACES_TREE;
use crate::NamespaceRegistry;
use crate::Result;
use crate::WatchedNamespace;

/// Namespace registry persisted in its own sled tree, one key per namespace.
#[derive(Clone)]
pub struct SledNamespaceRegistry {
    db: Arc<::sled::Db>,
    tree: ::sled::Tree,
}

impl std::fmt::Debug for SledNamespaceRegistry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledNamespaceRegistry")
            .field("tree_len", &self.tree.len())
            .finish()
    }
}

impl SledNamespaceRegistry {
    pub fn new(db: Arc<::sled::Db>) -> Result<Self> {
        let tree = db.open_tree(WATCHED_NAMESPACES_TREE)?;
        Ok(Self { db, tree })
    }

    /// Full records, most recently added first.
    pub fn list_records(&self) -> Result<Vec<WatchedNamespace>> {
        let mut records = Vec::with_capacity(self.tree.len());
        for item in self.tree.iter() {
            let (key, value) = item?;
            match bincode::deserialize::<WatchedNamespace>(&value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    error!(
                        "skip undecodable namespace record {:?}: {:?}",
                        String::from_utf8_lossy(&key),
                        e
                    );
                }
            }
        }
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.namespace.cmp(&b.namespace))
        });
        Ok(records)
    }

    /// Synchronously flushes the whole database. Used on shutdown.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }
}

#[async_trait]
impl NamespaceRegistry for SledNamespaceRegistry {
    async fn add(
        &self,
        namespace: &str,
    ) -> Result<()> {
        let record = bincode::serialize(&WatchedNamespace::new(namespace))?;

        // Insert only when absent so the original creation time survives.
        match self
            .tree
            .compare_and_swap(namespace.as_bytes(), None::<&[u8]>, Some(record))?
        {
            Ok(()) => debug!(namespace, "namespace persisted"),
            Err(_) => debug!(namespace, "namespace already persisted"),
        }

        self.tree.flush_async().await?;
        Ok(())
    }

    async fn remove(
        &self,
        namespace: &str,
    ) -> Result<()> {
        if self.tree.remove(namespace.as_bytes())?.is_some() {
            debug!(namespace, "namespace removed");
        }
        self.tree.flush_async().await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        Ok(self
            .list_records()?
            .into_iter()
            .map(|record| record.namespace)
            .collect())
    }
}
