//! Error types for the registry.

use super::id::NodeId;

/// Errors returned by registry mutations and reads.
///
/// Mutations fail atomically: when any of these is returned no node,
/// tree index entry, counter or event has been touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The caller has no recognized owner, or does not own the node
    #[error("not authorized")]
    NotAuthorized,

    /// Malformed id / kind combination, wrong parent kind,
    ///  bad referenced asset list, or id derivation mismatch
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Lookup on the sentinel or an unknown id
    #[error("node does not exist: {0}")]
    NodeDoesNotExist(NodeId),

    /// Id collision on create
    #[error("node already exists: {0}")]
    NodeAlreadyExists(NodeId),

    /// The stored state broke one of its own invariants, e.g. a
    ///  dangling parent token or an uninstalled auth module
    #[error("registry integrity fault: {0}")]
    Integrity(String),
}

impl RegistryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RegistryError::InvalidParams(msg.into())
    }

    pub(crate) fn integrity(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("registry integrity fault: {}", msg);
        RegistryError::Integrity(msg)
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
