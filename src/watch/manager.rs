//! Reconciles live watches with the durable namespace set.
//!
//! Membership changes are persisted first and only then applied to the live
//! registry, so a crash between the two steps is repaired by the next
//! [`WatchManager::start`].
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::NamespaceWatch;
use super::ReconnectPolicy;
use super::WatchHandle;
use super::WatchRegistry;
use crate::alias::KOF;
use crate::alias::ROF;
use crate::alias::SOF;
use crate::validate_namespace;
use crate::NamespaceRegistry;
use crate::Result;
use crate::TypeConfig;

pub struct WatchManager<T: TypeConfig> {
    namespaces: Arc<ROF<T>>,
    sink: Arc<KOF<T>>,
    source: Arc<SOF<T>>,
    policy: ReconnectPolicy,

    watches: WatchRegistry,
    /// Serializes add / remove / start so that persisting a change and
    /// applying it to `watches` happen as one step per namespace
    admin_lock: Mutex<()>,
    started: AtomicBool,
}

impl<T: TypeConfig> WatchManager<T> {
    pub fn new(
        namespaces: Arc<ROF<T>>,
        sink: Arc<KOF<T>>,
        source: Arc<SOF<T>>,
        policy: ReconnectPolicy,
    ) -> Self {
        Self {
            namespaces,
            sink,
            source,
            policy,
            watches: WatchRegistry::new(),
            admin_lock: Mutex::new(()),
            started: AtomicBool::new(false),
        }
    }

    /// Starts a watch for every persisted namespace that has none yet.
    ///
    /// A namespace whose watch cannot be started is logged and skipped; it
    /// stays persisted and is retried by the next `start` after a restart.
    /// Returns the number of watches started. Calling `start` again is a
    /// no-op returning 0.
    pub async fn start(&self) -> Result<usize> {
        let _guard = self.admin_lock.lock().await;

        if self.started.swap(true, Ordering::AcqRel) {
            debug!("watch manager already started");
            return Ok(0);
        }

        let persisted = match self.namespaces.list_all().await {
            Ok(namespaces) => namespaces,
            Err(e) => {
                self.started.store(false, Ordering::Release);
                error!("failed to read persisted namespaces: {:?}", e);
                return Err(e);
            }
        };

        let mut started = 0;
        for namespace in &persisted {
            if self.watches.contains(namespace) {
                debug!(namespace = %namespace, "watch already running");
                continue;
            }
            match self.start_watch(namespace).await {
                Ok(()) => started += 1,
                Err(e) => {
                    warn!(namespace = %namespace, "failed to start watch, skipping: {:?}", e);
                }
            }
        }

        info!(
            "watch manager started: {} of {} persisted namespaces watched",
            started,
            persisted.len()
        );
        Ok(started)
    }

    /// Persists `namespace` and starts watching it.
    ///
    /// If persisting fails nothing is started. If the first subscription
    /// fails the error is returned but the namespace stays persisted, so it
    /// is picked up again by the next `start`. Adding a namespace that is
    /// already watched restarts its watch; if that restart cannot subscribe,
    /// the running watch is kept.
    pub async fn add_namespace(
        &self,
        namespace: &str,
    ) -> Result<()> {
        validate_namespace(namespace)?;
        let _guard = self.admin_lock.lock().await;

        self.namespaces.add(namespace).await?;
        debug!(namespace, "namespace persisted");

        self.start_watch(namespace).await.inspect_err(|e| {
            error!(namespace, "namespace persisted but its watch failed to start: {:?}", e);
        })?;

        info!(namespace, "namespace added");
        Ok(())
    }

    /// Stops watching `namespace` and removes it from the persisted set.
    ///
    /// The watch is only cancelled once the removal is durable. Removing a
    /// namespace that is not watched succeeds.
    pub async fn remove_namespace(
        &self,
        namespace: &str,
    ) -> Result<()> {
        validate_namespace(namespace)?;
        let _guard = self.admin_lock.lock().await;

        self.namespaces.remove(namespace).await?;

        if self.watches.unregister(namespace) {
            info!(namespace, "namespace removed");
        } else {
            debug!(namespace, "namespace removed, no watch was running");
        }
        Ok(())
    }

    /// Persisted namespaces, most recently added first.
    pub async fn list_namespaces(&self) -> Result<Vec<String>> {
        self.namespaces.list_all().await
    }

    /// Namespaces with a running watch, sorted.
    pub fn active_namespaces(&self) -> Vec<String> {
        self.watches.snapshot()
    }

    /// Cancels every watch and waits for the tasks to finish. The persisted
    /// namespace set is left untouched.
    pub async fn stop(&self) {
        let _guard = self.admin_lock.lock().await;

        let tasks = self.watches.shutdown();
        let count = tasks.len();
        for task in tasks {
            if let Err(e) = task.await {
                warn!("watch task ended abnormally: {:?}", e);
            }
        }

        self.started.store(false, Ordering::Release);
        info!("watch manager stopped, {} watches cancelled", count);
    }

    /// Callers hold `admin_lock`.
    ///
    /// A watch already running for `namespace` keeps running until the
    /// replacement is subscribed; registering the replacement cancels it.
    async fn start_watch(
        &self,
        namespace: &str,
    ) -> Result<()> {
        let token = CancellationToken::new();
        let mut watch = NamespaceWatch::<T>::new(
            namespace,
            self.source.clone(),
            self.sink.clone(),
            self.policy,
            token.clone(),
        );
        let stream = watch.connect().await?;
        let task = tokio::spawn(watch.run(stream));

        if self.watches.register(WatchHandle::new(namespace, token, Some(task))) {
            debug!(namespace, "previous watch replaced");
        }
        Ok(())
    }
}
