//! Durable collaborators of the watch manager: the set of namespaces that
//! should be watched and the append-only event store.
mod adaptors;
mod event_sink;
mod namespace_registry;

pub use adaptors::*;
pub use event_sink::*;
pub use namespace_registry::*;
