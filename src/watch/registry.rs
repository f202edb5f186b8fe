//! Live watches, keyed by namespace.
//!
//! The registry is the only place that decides whether a watch is running,
//! so "at most one handle per namespace" is enforced here: registering over
//! an existing handle cancels the displaced one.
use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::ACTIVE_WATCHES;

/// Cancellation control of one running namespace watch.
#[derive(Debug)]
pub struct WatchHandle {
    namespace: String,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn new(
        namespace: impl Into<String>,
        token: CancellationToken,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            token,
            task,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signals the watch task to stop. Consuming the handle makes this
    /// happen exactly once; the task can still be awaited through the
    /// returned join handle.
    pub fn cancel(mut self) -> Option<JoinHandle<()>> {
        self.token.cancel();
        self.task.take()
    }
}

#[derive(Debug, Default)]
pub struct WatchRegistry {
    watches: Mutex<HashMap<String, WatchHandle>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handle` for its namespace. A handle already registered for
    /// that namespace is cancelled and replaced; returns whether that happened.
    pub fn register(
        &self,
        handle: WatchHandle,
    ) -> bool {
        let namespace = handle.namespace.clone();
        let displaced = {
            let mut watches = self.watches.lock();
            let displaced = watches.insert(namespace.clone(), handle);
            ACTIVE_WATCHES.set(watches.len() as i64);
            displaced
        };

        match displaced {
            Some(previous) => {
                warn!(namespace = %namespace, "replacing running watch");
                previous.cancel();
                true
            }
            None => {
                debug!(namespace = %namespace, "watch registered");
                false
            }
        }
    }

    /// Cancels and removes the watch of `namespace`. Returns false when
    /// there was none.
    pub fn unregister(
        &self,
        namespace: &str,
    ) -> bool {
        let removed = {
            let mut watches = self.watches.lock();
            let removed = watches.remove(namespace);
            ACTIVE_WATCHES.set(watches.len() as i64);
            removed
        };

        match removed {
            Some(handle) => {
                handle.cancel();
                debug!(namespace, "watch cancelled");
                true
            }
            None => false,
        }
    }

    /// Namespaces with a registered watch, sorted.
    pub fn snapshot(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self.watches.lock().keys().cloned().collect();
        namespaces.sort();
        namespaces
    }

    pub fn contains(
        &self,
        namespace: &str,
    ) -> bool {
        self.watches.lock().contains_key(namespace)
    }

    pub fn len(&self) -> usize {
        self.watches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.lock().is_empty()
    }

    /// Cancels every watch and empties the registry. The returned join
    /// handles let the caller wait for the tasks to wind down.
    pub fn shutdown(&self) -> Vec<JoinHandle<()>> {
        let drained: Vec<WatchHandle> = {
            let mut watches = self.watches.lock();
            let drained = watches.drain().map(|(_, handle)| handle).collect();
            ACTIVE_WATCHES.set(0);
            drained
        };

        drained.into_iter().filter_map(WatchHandle::cancel).collect()
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        for (_, handle) in self.watches.get_mut().drain() {
            handle.cancel();
        }
    }
}
