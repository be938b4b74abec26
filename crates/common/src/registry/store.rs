use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

use super::error::{RegistryError, Result};
use super::id::{NodeId, Token, NO_TOKEN};
use super::node::{Node, NodeKind};
use super::tree::TreeIndex;

/// The arena of nodes plus every counter that goes with it.
///
/// The node store checks the rules it can check on its own (id
///  derivation, id reuse, parent kinds, referenced asset shape), and
///  keeps `tokens`, `nodes` and the tree index in step with each other.
///  Ownership and authorization checks live a layer up in the
///  [`Registry`](super::Registry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStore {
    /// token -> node record
    nodes: HashMap<Token, Node>,
    /// external id -> token
    tokens: HashMap<NodeId, Token>,
    /// number of nodes ever created, also the last assigned token
    total_supply: u64,
    /// owner -> number of nodes that owner created
    counters: HashMap<PublicKey, u64>,
    tree: TreeIndex,
}

/// Everything needed to insert a node that has already been validated
#[derive(Debug, Clone)]
pub(crate) struct NewNode {
    pub id: NodeId,
    pub parent: Token,
    pub kind: NodeKind,
    pub uri: Option<String>,
    pub referenced_assets: Vec<NodeId>,
    pub creator: PublicKey,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Number of nodes of any kind `owner` has created so far
    pub fn creation_count(&self, owner: &PublicKey) -> u64 {
        self.counters.get(owner).copied().unwrap_or(0)
    }

    /// The id `owner` must use for its next non-asset node
    pub fn next_id(&self, owner: &PublicKey) -> NodeId {
        self.next_id_after(owner, 0)
    }

    /// The derived id `owner` must use once `skip` more nodes of its own
    ///  have been created
    pub fn next_id_after(&self, owner: &PublicKey, skip: u64) -> NodeId {
        NodeId::derive(owner, self.creation_count(owner) + skip)
    }

    /// Token for `id`, `NO_TOKEN` if unknown. The root maps to `NO_TOKEN`.
    pub fn token_of(&self, id: &NodeId) -> Token {
        self.tokens.get(id).copied().unwrap_or(NO_TOKEN)
    }

    pub fn id_of(&self, token: Token) -> Option<NodeId> {
        if token == NO_TOKEN {
            return Some(NodeId::ROOT);
        }
        self.nodes.get(&token).map(|n| n.id)
    }

    pub fn node(&self, token: Token) -> Option<&Node> {
        self.nodes.get(&token)
    }

    pub(crate) fn node_mut(&mut self, token: Token) -> Option<&mut Node> {
        self.nodes.get_mut(&token)
    }

    pub fn by_id(&self, id: &NodeId) -> Result<&Node> {
        match self.token_of(id) {
            NO_TOKEN => Err(RegistryError::NodeDoesNotExist(*id)),
            token => self.nodes.get(&token).ok_or_else(|| {
                RegistryError::integrity(format!("id {} maps to missing token {}", id, token))
            }),
        }
    }

    /// Parent of a live node as an external id
    pub fn parent_id(&self, node: &Node) -> Result<NodeId> {
        self.id_of(node.parent).ok_or_else(|| {
            RegistryError::integrity(format!(
                "node {} points at missing parent token {}",
                node.id, node.parent
            ))
        })
    }

    /// Ordered child tokens of `parent` (`NO_TOKEN` for top-level nodes)
    pub fn child_tokens(&self, parent: Token) -> &[Token] {
        self.tree.children(parent)
    }

    pub fn position_of(&self, token: Token) -> Option<usize> {
        self.tree.position(token)
    }

    /// Ordered child ids of `parent`
    pub fn children(&self, parent: &NodeId) -> Result<Vec<NodeId>> {
        let parent = self.resolve_parent(parent)?;
        self.child_tokens(parent)
            .iter()
            .map(|t| {
                self.id_of(*t).ok_or_else(|| {
                    RegistryError::integrity(format!("child token {} has no node", t))
                })
            })
            .collect()
    }

    /// Resolve `id` as a parent: the root sentinel, or a live container.
    pub fn resolve_parent(&self, id: &NodeId) -> Result<Token> {
        if id.is_root() {
            return Ok(NO_TOKEN);
        }
        let parent = self.by_id(id)?;
        if !parent.kind.can_parent() {
            return Err(RegistryError::invalid(format!(
                "parent {} is a {}, not a container",
                id, parent.kind
            )));
        }
        Ok(parent.token)
    }

    /// Whether `ancestor` appears on the chain from `token` up to the root
    pub fn is_ancestor(&self, ancestor: Token, token: Token) -> Result<bool> {
        let mut current = token;
        let mut steps = 0;
        while current != NO_TOKEN {
            if current == ancestor {
                return Ok(true);
            }
            current = self
                .node(current)
                .ok_or_else(|| RegistryError::integrity(format!("missing token {}", current)))?
                .parent;
            steps += 1;
            if steps > self.total_supply {
                return Err(RegistryError::integrity("cycle in parent chain"));
            }
        }
        Ok(false)
    }

    /// Check every creation rule the store can check on its own.
    ///  Returns the parent token on success.
    pub(crate) fn check_create(
        &self,
        owner: &PublicKey,
        id: &NodeId,
        parent: &NodeId,
        kind: NodeKind,
        referenced_assets: &[NodeId],
    ) -> Result<Token> {
        if id.is_root() {
            return Err(RegistryError::invalid("the zero id is reserved for the root"));
        }
        if self.token_of(id) != NO_TOKEN {
            return Err(RegistryError::NodeAlreadyExists(*id));
        }
        if kind.requires_derived_id() && *id != self.next_id(owner) {
            return Err(RegistryError::invalid(format!(
                "{} id {} does not match the creator's next derived id",
                kind, id
            )));
        }
        let parent = self.resolve_parent(parent)?;
        self.check_referenced_assets(kind, referenced_assets)?;
        Ok(parent)
    }

    /// Shape rules for a node's referenced asset list
    pub(crate) fn check_referenced_assets(
        &self,
        kind: NodeKind,
        assets: &[NodeId],
    ) -> Result<()> {
        match kind {
            NodeKind::Reference if assets.len() != 1 => {
                return Err(RegistryError::invalid(
                    "a reference must point at exactly one asset",
                ))
            }
            NodeKind::Collection if assets.is_empty() => {
                return Err(RegistryError::invalid(
                    "a collection must reference at least one asset",
                ))
            }
            NodeKind::Container | NodeKind::Asset if !assets.is_empty() => {
                return Err(RegistryError::invalid(format!(
                    "a {} cannot reference assets",
                    kind
                )))
            }
            _ => {}
        }
        for asset in assets {
            let node = match self.by_id(asset) {
                Ok(node) => node,
                Err(RegistryError::NodeDoesNotExist(_)) => {
                    return Err(RegistryError::invalid(format!(
                        "referenced asset {} does not exist",
                        asset
                    )))
                }
                Err(e) => return Err(e),
            };
            if node.kind != NodeKind::Asset {
                return Err(RegistryError::invalid(format!(
                    "referenced node {} is a {}, not an asset",
                    asset, node.kind
                )));
            }
        }
        Ok(())
    }

    /// Insert a validated node, returning its token
    pub(crate) fn insert(&mut self, new: NewNode) -> Token {
        self.total_supply += 1;
        let token = self.total_supply;
        // every creation advances the creator's counter, assets included
        *self.counters.entry(new.creator).or_insert(0) += 1;

        let node = Node {
            id: new.id,
            token,
            kind: new.kind,
            parent: new.parent,
            uri: new.uri,
            access_module: None,
            reference_module: None,
            referenced_assets: new.referenced_assets,
            creator: new.creator,
        };
        self.tokens.insert(new.id, token);
        self.nodes.insert(token, node);
        self.tree.insert(new.parent, token);
        token
    }

    /// Move `token` under `new_parent`, keeping sibling order at both ends
    pub(crate) fn reparent(&mut self, token: Token, new_parent: Token) -> Result<()> {
        let old_parent = self
            .node(token)
            .ok_or_else(|| RegistryError::integrity(format!("missing token {}", token)))?
            .parent;
        self.tree.relocate(token, old_parent, new_parent)?;
        if let Some(node) = self.nodes.get_mut(&token) {
            node.parent = new_parent;
        }
        Ok(())
    }

    /// Every node, in token (creation) order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        (1..=self.total_supply).filter_map(move |t| self.nodes.get(&t))
    }
}
