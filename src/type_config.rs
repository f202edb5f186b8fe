use std::fmt::Debug;

use crate::EventSink;
use crate::EventSource;
use crate::KubeEventSource;
use crate::NamespaceRegistry;
use crate::SledEventSink;
use crate::SledNamespaceRegistry;

/// Bundles the collaborators the watch core is generic over.
///
/// **This coding style learned from OpenRaft project type config.**
pub trait TypeConfig:
    Sync + Send + Sized + Debug + Clone + Copy + Default + Eq + PartialEq + Ord + PartialOrd + 'static
{
    /// Durable set of namespaces that should be watched
    type R: NamespaceRegistry;

    /// Durable event store
    type K: EventSink;

    /// Upstream event subscriptions
    type S: EventSource;
}

/// Production wiring: sled storage and the Kubernetes API server.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct KubeTypeConfig;

impl TypeConfig for KubeTypeConfig {
    type R = SledNamespaceRegistry;

    type K = SledEventSink;

    type S = KubeEventSource;
}

pub mod alias {
    use super::TypeConfig;

    pub type ROF<T> = <T as TypeConfig>::R;

    pub type KOF<T> = <T as TypeConfig>::K;

    pub type SOF<T> = <T as TypeConfig>::S;
}
