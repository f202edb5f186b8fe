//! Namespace-scoped event watches.
//!
//! ```text
//! NamespaceRegistry (durable) --start()/add/remove--> WatchManager
//!                                                         |
//!                               WatchRegistry (live) <----+
//!                                     |
//!                    one NamespaceWatch task per namespace
//!                                     |
//!            EventSource::subscribe --> forward loop --> EventSink::save
//! ```
mod manager;
mod namespace_watch;
mod registry;

pub use manager::*;
pub use namespace_watch::*;
pub use registry::*;
