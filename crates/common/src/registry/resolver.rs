//! # Authorization resolution
//!
//! Both resolvers walk from a node up to its top-level ancestor,
//! consulting the auth module of every node on the way that has one.
//! Nodes without a module are transparent. The walk carries a single
//! `rejected` flag recording that some module nearer the node denied.
//!
//! ## Direct access ([`Registry::auth`])
//!
//! - A grant anywhere on the chain answers `true`, overriding any
//!   denial recorded below it.
//! - A denial sets `rejected` and the walk keeps climbing; a denial at
//!   the top-level node answers `false`.
//! - Reaching the top-level node without a module answers `!rejected`,
//!   so a chain without any module allows.
//!
//! References additionally require that the reference's owner may still
//! reference the asset. Collections additionally require, for every
//! referenced asset, that the principal may access the asset and that
//! the collection's owner may still reference it.
//!
//! ## Reference eligibility ([`Registry::ref_auth`])
//!
//! Only assets can be referenced. The walk follows the same rules over
//! the reference modules, with one twist: once a denial has been
//! recorded, the next node up must itself grant. Climbing past a node
//! without a module after a denial answers `false`.

use super::auth::{ModuleId, Principal};
use super::error::{RegistryError, Result};
use super::id::NodeId;
use super::node::{Node, NodeKind};
use super::ownership::OwnershipProvider;
use super::registry::Registry;

/// Which module slot a walk consults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Access,
    Reference,
}

impl Slot {
    fn module(self, node: &Node) -> Option<&ModuleId> {
        match self {
            Slot::Access => node.access_module.as_ref(),
            Slot::Reference => node.reference_module.as_ref(),
        }
    }
}

impl<O: OwnershipProvider> Registry<O> {
    /// Whether `principal` may access the content of `id`
    pub fn auth(&self, id: &NodeId, principal: &Principal) -> Result<bool> {
        let node = self.store.by_id(id)?;
        if !self.walk(node, principal, Slot::Access)? {
            return Ok(false);
        }

        match node.kind {
            NodeKind::Container | NodeKind::Asset => Ok(true),
            NodeKind::Reference => {
                let owner = self.token_owner(node.token)?;
                for asset in &node.referenced_assets {
                    if !self.ref_auth_of(self.referenced(asset)?, &owner)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            NodeKind::Collection => {
                let owner = self.token_owner(node.token)?;
                for asset in &node.referenced_assets {
                    let asset = self.referenced(asset)?;
                    if !self.walk(asset, principal, Slot::Access)?
                        || !self.ref_auth_of(asset, &owner)?
                    {
                        tracing::debug!(
                            "collection {} denied to {} by asset {}",
                            id,
                            principal,
                            asset.id
                        );
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Whether `principal` may reference `id` from a reference or collection
    pub fn ref_auth(&self, id: &NodeId, principal: &Principal) -> Result<bool> {
        let node = self.store.by_id(id)?;
        self.ref_auth_of(node, principal)
    }

    fn ref_auth_of(&self, node: &Node, principal: &Principal) -> Result<bool> {
        if node.kind != NodeKind::Asset {
            return Ok(false);
        }
        self.walk(node, principal, Slot::Reference)
    }

    /// A node named by a reference list. By the time it is read it must
    ///  exist; a dangling entry is an integrity fault, not a denial.
    pub(crate) fn referenced(&self, id: &NodeId) -> Result<&Node> {
        match self.store.by_id(id) {
            Err(RegistryError::NodeDoesNotExist(_)) => Err(RegistryError::integrity(format!(
                "referenced asset {} does not exist",
                id
            ))),
            other => other,
        }
    }

    fn walk(&self, start: &Node, principal: &Principal, slot: Slot) -> Result<bool> {
        let mut rejected = false;
        let mut node = start;

        // every step climbs one level, so a sound chain ends within total_supply steps
        for _ in 0..=self.store.total_supply() {
            match slot.module(node) {
                Some(module) => {
                    if self.module(module)?.decide(&node.id, principal) {
                        tracing::debug!("{:?} granted to {} at {}", slot, principal, node.id);
                        return Ok(true);
                    }
                    if node.is_top_level() {
                        return Ok(false);
                    }
                    rejected = true;
                }
                None => {
                    if rejected && slot == Slot::Reference {
                        return Ok(false);
                    }
                    if node.is_top_level() {
                        return Ok(!rejected);
                    }
                }
            }
            node = self.store.node(node.parent).ok_or_else(|| {
                RegistryError::integrity(format!(
                    "node {} points at missing parent token {}",
                    node.id, node.parent
                ))
            })?;
        }
        Err(RegistryError::integrity(format!(
            "ancestor chain of {} does not terminate",
            start.id
        )))
    }
}
