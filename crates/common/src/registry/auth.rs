//! # Auth Modules
//!
//! An auth module is an external decision function a node designates to
//! govern either direct access to its content or whether others may
//! reference it. Nodes never hold a module directly; they hold a
//! [`ModuleId`] handle naming a module installed in the registry.
//!
//! [`Policy`] is a small set of stock modules that can be persisted
//! alongside a registry snapshot. Anything implementing [`AuthModule`]
//! can be installed instead.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

use super::id::NodeId;

/// Principals are identified by their Ed25519 public key
pub type Principal = PublicKey;

/// A grant / deny decision for a principal against a node.
///
/// Implementations must be deterministic for the duration of a single
///  resolution: the resolver may consult the same module several times
///  while walking one chain or composing one collection.
pub trait AuthModule: fmt::Debug + Send + Sync {
    fn decide(&self, node: &NodeId, principal: &Principal) -> bool;
}

/// Handle naming an installed auth module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        ModuleId::new(name)
    }
}

/// Stock, serializable auth modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "principals", rename_all = "snake_case")]
pub enum Policy {
    /// Grants everyone
    Open,
    /// Denies everyone
    Closed,
    /// Grants only the listed principals
    AllowList(BTreeSet<Principal>),
    /// Grants everyone except the listed principals
    DenyList(BTreeSet<Principal>),
}

impl AuthModule for Policy {
    fn decide(&self, _node: &NodeId, principal: &Principal) -> bool {
        match self {
            Policy::Open => true,
            Policy::Closed => false,
            Policy::AllowList(allowed) => allowed.contains(principal),
            Policy::DenyList(denied) => !denied.contains(principal),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Open => write!(f, "open"),
            Policy::Closed => write!(f, "closed"),
            Policy::AllowList(p) => write!(f, "allow-list ({} principals)", p.len()),
            Policy::DenyList(p) => write!(f, "deny-list ({} principals)", p.len()),
        }
    }
}
