// -
// Database namespaces

/// Sled database tree namespaces
pub(crate) const WATCHED_NAMESPACES_TREE: &str = "_watched_namespaces";
pub(crate) const EVENTS_TREE: &str = "_events";

/// Separates the namespace prefix from the event id inside event keys
pub(crate) const EVENT_KEY_SEPARATOR: u8 = 0;

/// Sled database directory under the configured root
pub(crate) const SLED_DB_DIR: &str = "eventwatch";

/// Log file written when a log directory is configured
pub const LOG_FILE_NAME: &str = "eventwatch.log";

/// Kubernetes namespace names are DNS-1123 labels
pub(crate) const MAX_NAMESPACE_LEN: usize = 63;
