use async_trait::async_trait;
use futures::future;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Event as KubeEvent;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::Api;
use kube::api::ListParams;
use kube::api::WatchEvent;
use kube::api::WatchParams;
use kube::config::KubeConfigOptions;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use super::EventSource;
use super::RawEventStream;
use crate::KubeConfig;
use crate::RawEvent;
use crate::Result;
use crate::SourceError;

/// Resource version "0" starts the watch from any cached state; the server
/// first replays current events as `Added`, then streams changes.
const WATCH_FROM_ANY_VERSION: &str = "0";

/// Event source backed by the Kubernetes API server's core/v1 Event watch.
#[derive(Clone)]
pub struct KubeEventSource {
    client: Client,
    watch_timeout_secs: u32,
}

impl std::fmt::Debug for KubeEventSource {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KubeEventSource")
            .field("watch_timeout_secs", &self.watch_timeout_secs)
            .finish()
    }
}

impl KubeEventSource {
    pub fn new(
        client: Client,
        config: &KubeConfig,
    ) -> Self {
        Self {
            client,
            watch_timeout_secs: config.watch_timeout_secs,
        }
    }

    /// Builds a client from the named kubeconfig context, or infers one
    /// (in-cluster service account, then current context) when unset.
    pub async fn connect(config: &KubeConfig) -> Result<Self> {
        let client = match &config.context {
            Some(context) => {
                info!("using kubeconfig context {}", context);
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..Default::default()
                };
                let kube_config = kube::Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| SourceError::ClientConfig(e.to_string()))?;
                Client::try_from(kube_config)?
            }
            None => Client::try_default().await?,
        };
        Ok(Self::new(client, config))
    }

    /// Names of all namespaces that currently exist in the cluster.
    pub async fn cluster_namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api.list(&ListParams::default()).await?;
        Ok(namespaces
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }
}

#[async_trait]
impl EventSource for KubeEventSource {
    async fn subscribe(
        &self,
        namespace: &str,
        cancel: CancellationToken,
    ) -> Result<RawEventStream> {
        debug!(namespace, "opening event watch");

        let api: Api<KubeEvent> = Api::namespaced(self.client.clone(), namespace);
        let params = WatchParams::default().timeout(self.watch_timeout_secs);
        let stream = api
            .watch(&params, WATCH_FROM_ANY_VERSION)
            .await
            .map_err(|e| SourceError::Subscribe {
                namespace: namespace.to_string(),
                source: Box::new(e),
            })?;

        Ok(stream
            .filter_map(|item| future::ready(translate_watch_event(item)))
            .take_until(async move { cancel.cancelled().await })
            .boxed())
    }
}

/// Maps one watch item; bookmarks carry no event and are dropped.
pub(crate) fn translate_watch_event(item: kube::Result<WatchEvent<KubeEvent>>) -> Option<Result<RawEvent>> {
    match item {
        Ok(WatchEvent::Added(event)) | Ok(WatchEvent::Modified(event)) | Ok(WatchEvent::Deleted(event)) => {
            Some(Ok(raw_from_kube(event)))
        }
        Ok(WatchEvent::Bookmark(_)) => None,
        Ok(WatchEvent::Error(e)) => Some(Err(SourceError::Stream(format!(
            "{} ({}): {}",
            e.reason, e.code, e.message
        ))
        .into())),
        Err(e) => Some(Err(e.into())),
    }
}

pub(crate) fn raw_from_kube(event: KubeEvent) -> RawEvent {
    RawEvent {
        uid: event.metadata.uid,
        namespace: event.metadata.namespace,
        name: event.metadata.name,
        reason: event.reason,
        message: event.message,
        event_type: event.type_,
        involved_kind: event.involved_object.kind,
        involved_name: event.involved_object.name,
        first_timestamp: event.first_timestamp.map(|t| t.0),
        last_timestamp: event.last_timestamp.map(|t| t.0),
        deletion_timestamp: event.metadata.deletion_timestamp.map(|t| t.0),
        count: event.count,
    }
}
