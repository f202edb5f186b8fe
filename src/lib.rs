//! Namespace-scoped Kubernetes event watcher.
//!
//! A [`WatchManager`] keeps one watch per persisted namespace, forwards
//! every upstream event into an [`EventSink`] and survives upstream
//! disconnects. [`EventQuery`] reads the forwarded events back.
mod config;
pub mod constants;
mod errors;
mod event;
mod metrics;
mod namespace;
mod query;
mod source;
mod storage;
mod type_config;
mod watch;

pub use config::*;
pub use errors::*;
pub use event::*;
pub use metrics::*;
pub use namespace::*;
pub use query::*;
pub use source::*;
pub use storage::*;
pub use type_config::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
