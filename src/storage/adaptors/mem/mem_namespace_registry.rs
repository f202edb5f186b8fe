use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::NamespaceRegistry;
use crate::Result;
use crate::WatchedNamespace;

/// In-memory namespace registry for embedding and tests. Nothing survives
/// the process.
#[derive(Debug, Default)]
pub struct MemNamespaceRegistry {
    entries: RwLock<HashMap<String, WatchedNamespace>>,
}

impl MemNamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `namespaces`, as if each was added in order.
    pub fn with_namespaces<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        {
            let mut entries = registry.entries.write();
            for ns in namespaces {
                let record = WatchedNamespace::new(ns);
                entries.entry(record.namespace.clone()).or_insert(record);
            }
        }
        registry
    }

    pub fn contains(
        &self,
        namespace: &str,
    ) -> bool {
        self.entries.read().contains_key(namespace)
    }
}

#[async_trait]
impl NamespaceRegistry for MemNamespaceRegistry {
    async fn add(
        &self,
        namespace: &str,
    ) -> Result<()> {
        self.entries
            .write()
            .entry(namespace.to_string())
            .or_insert_with(|| WatchedNamespace::new(namespace));
        Ok(())
    }

    async fn remove(
        &self,
        namespace: &str,
    ) -> Result<()> {
        self.entries.write().remove(namespace);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<String>> {
        let mut records: Vec<WatchedNamespace> = self.entries.read().values().cloned().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.namespace.cmp(&b.namespace))
        });
        Ok(records.into_iter().map(|r| r.namespace).collect())
    }
}
