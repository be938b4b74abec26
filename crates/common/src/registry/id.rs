use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::PublicKey;

/// Size of an external node id in bytes
pub const NODE_ID_SIZE: usize = 32;

/// Domain tag mixed into every derived node id
const NODE_ID_DOMAIN: &[u8] = b"canopy:node-id:v1";

/// Sequential identity assigned to a node at creation.
///  `0` is reserved and means "does not exist" (or "root"
///  when it appears as a parent).
pub type Token = u64;

/// The sentinel token
pub const NO_TOKEN: Token = 0;

#[derive(Debug, thiserror::Error)]
pub enum NodeIdError {
    #[error("node id hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Opaque fixed-width external identifier of a node.
///
/// Asset ids are chosen by the caller (usually a content hash).
/// Every other kind must use [`NodeId::derive`] over the creating
/// owner and that owner's creation counter, which keeps one principal
/// from claiming ids in another principal's namespace.
///
/// The all-zero id is [`NodeId::ROOT`], the "no parent" sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId([u8; NODE_ID_SIZE]);

impl NodeId {
    pub const ROOT: NodeId = NodeId([0; NODE_ID_SIZE]);

    pub fn new(bytes: [u8; NODE_ID_SIZE]) -> Self {
        NodeId(bytes)
    }

    /// Derive the id the given owner must use for its `counter`-th creation
    pub fn derive(owner: &PublicKey, counter: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(NODE_ID_DOMAIN);
        hasher.update(&owner.to_bytes());
        hasher.update(&counter.to_le_bytes());
        NodeId(*hasher.finalize().as_bytes())
    }

    /// Content-addressed id for an asset, the blake3 hash of its bytes
    pub fn from_content(data: &[u8]) -> Self {
        NodeId(*blake3::hash(data).as_bytes())
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    pub fn as_bytes(&self) -> &[u8; NODE_ID_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, NodeIdError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; NODE_ID_SIZE];
        hex::decode_to_slice(hex, &mut buff)?;
        Ok(NodeId(buff))
    }
}

impl From<[u8; NODE_ID_SIZE]> for NodeId {
    fn from(bytes: [u8; NODE_ID_SIZE]) -> Self {
        NodeId(bytes)
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the short form is plenty to tell nodes apart in logs
        write!(f, "NodeId({}..)", &self.to_hex()[..12])
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        NodeId::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}
