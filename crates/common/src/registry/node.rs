use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;

use super::auth::ModuleId;
use super::id::{NodeId, Token, NO_TOKEN};

/**
 * Nodes
 * =====
 * Nodes are the records of the registry. They live in a flat
 *  arena keyed by token, and point at their parent by token;
 *  the parent never holds a structural reference to its children,
 *  that relation lives in the tree index.
 * There are four kinds of node:
 *  - Containers: organize other nodes, can't be referenced
 *  - Assets: leaf content with a uri, can be referenced
 *  - References: a pointer at exactly one asset
 *  - Collections: an ordered list of referenced assets
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    Asset,
    Reference,
    Collection,
}

impl NodeKind {
    /// Only containers may parent other nodes
    pub fn can_parent(&self) -> bool {
        matches!(self, NodeKind::Container)
    }

    /// Whether the node's content is composed from referenced assets
    pub fn is_reference_like(&self) -> bool {
        matches!(self, NodeKind::Reference | NodeKind::Collection)
    }

    /// Asset ids are free-form; every other kind must derive its id
    pub fn requires_derived_id(&self) -> bool {
        !matches!(self, NodeKind::Asset)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Container => write!(f, "container"),
            NodeKind::Asset => write!(f, "asset"),
            NodeKind::Reference => write!(f, "reference"),
            NodeKind::Collection => write!(f, "collection"),
        }
    }
}

impl std::str::FromStr for NodeKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(NodeKind::Container),
            "asset" => Ok(NodeKind::Asset),
            "reference" => Ok(NodeKind::Reference),
            "collection" => Ok(NodeKind::Collection),
            other => Err(format!("unknown node kind: {}", other)),
        }
    }
}

/// A stored node record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub token: Token,
    pub kind: NodeKind,
    /// parent token, `NO_TOKEN` for top-level nodes
    pub parent: Token,
    // NOTE: never set for references, their uri is
    //  read through from the referenced asset
    pub uri: Option<String>,
    pub access_module: Option<ModuleId>,
    pub reference_module: Option<ModuleId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referenced_assets: Vec<NodeId>,
    /// the owning principal that created this node
    pub creator: PublicKey,
}

impl Node {
    pub fn is_top_level(&self) -> bool {
        self.parent == NO_TOKEN
    }
}

/// A node as returned to readers, with derived fields filled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub token: Token,
    pub kind: NodeKind,
    pub parent: NodeId,
    pub uri: Option<String>,
    pub access_module: Option<ModuleId>,
    pub reference_module: Option<ModuleId>,
    pub referenced_assets: Vec<NodeId>,
    pub creator: PublicKey,
    pub owner: Option<PublicKey>,
}
