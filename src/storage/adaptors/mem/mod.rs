mod mem_event_sink;
mod mem_namespace_registry;

pub use mem_event_sink::*;
pub use mem_namespace_registry::*;
