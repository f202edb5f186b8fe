use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::MAX_NAMESPACE_LEN;
use crate::Error;
use crate::Result;

/// A namespace the process has been told to monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedNamespace {
    pub namespace: String,
    pub created_at: DateTime<Utc>,
}

impl WatchedNamespace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            created_at: Utc::now(),
        }
    }
}

/// Checks that `namespace` is a valid Kubernetes namespace name
/// (an RFC 1123 label: lowercase alphanumerics and '-', at most 63 chars,
/// starting and ending with an alphanumeric).
pub fn validate_namespace(namespace: &str) -> Result<()> {
    let bytes = namespace.as_bytes();
    let valid = !bytes.is_empty()
        && bytes.len() <= MAX_NAMESPACE_LEN
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-';

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidNamespace(namespace.to_string()))
    }
}
