//! Content registry data structures and operations
//!
//! This module defines the core types for Canopy's hierarchical content registry:
//!
//! - **[`NodeStore`]**: the arena of nodes keyed by token, plus the id and counter indexes
//! - **[`TreeIndex`]**: ordered child lists and the reverse position index
//! - **[`Registry`]**: the store behind one API, with ownership checks, auth
//!   resolution ([`Registry::auth`], [`Registry::ref_auth`]) and change events
//! - **[`AuthModule`]**: pluggable grant / deny decisions, with stock [`Policy`] modules
//! - **[`OwnershipProvider`]**: the identity / ownership seam, with [`MemoryOwnership`]
//!
//! # Architecture
//!
//! ## Nodes as a forest
//!
//! Nodes form a forest under a sentinel root:
//! ```text
//!                           ROOT (token 0)
//!                               |
//!              +----------------+----------------+
//!              |                                 |
//!         Container                          Container
//!        (access: A)                              |
//!              |                          +-------+-------+
//!      +-------+-------+                  |               |
//!      |               |                Asset        Collection
//!    Asset         Reference ----------------------> [Asset, ...]
//! ```
//!
//! ## Identity
//!
//! Every node has a caller-facing [`NodeId`] and a sequential [`Token`].
//! Asset ids are free-form (usually content hashes, first writer wins);
//! all other ids are derived from the creating owner and that owner's
//! creation counter, see [`NodeId::derive`].
//!
//! ## Authorization
//!
//! Nodes name auth modules by [`ModuleId`]. A node without a module
//! inherits from its parent; see the [`resolver`] docs for the exact
//! precedence rules.

mod auth;
mod error;
mod events;
mod id;
mod node;
mod ownership;
mod publish;
#[allow(clippy::module_inception)]
mod registry;
pub mod resolver;
mod snapshot;
mod store;
mod tree;

pub use auth::{AuthModule, ModuleId, Policy, Principal};
pub use error::{RegistryError, Result};
pub use events::{EventBus, RegistryEvent};
pub use id::{NodeId, NodeIdError, Token, NODE_ID_SIZE, NO_TOKEN};
pub use node::{Node, NodeKind, NodeView};
pub use ownership::{MemoryOwnership, OwnershipError, OwnershipProvider, DELEGATE_DOMAIN};
pub use publish::AssetRef;
pub use registry::{NodeSpec, Registry, MAX_BATCH_SIZE};
pub use snapshot::{RegistrySnapshot, SnapshotError};
pub use store::NodeStore;
pub use tree::TreeIndex;
