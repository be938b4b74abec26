//! Shared test utilities for registry integration tests
#![allow(dead_code)]

use ::common::crypto::{PublicKey, SecretKey};
use ::common::registry::{NodeId, NodeSpec, Registry};

/// A fresh registry plus one principal to own things
pub fn setup_test_env() -> (Registry, PublicKey) {
    let registry = Registry::default();
    let owner = SecretKey::generate().public();
    (registry, owner)
}

pub fn principal() -> PublicKey {
    SecretKey::generate().public()
}

/// Create a container under `parent` owned by `owner`
pub fn container(registry: &mut Registry, owner: &PublicKey, parent: NodeId) -> NodeId {
    let id = registry.next_node_id(owner).unwrap();
    registry
        .create(owner, NodeSpec::container(id, parent))
        .unwrap();
    id
}

/// Create an asset under `parent`, its id the hash of `name`
pub fn asset(registry: &mut Registry, owner: &PublicKey, parent: NodeId, name: &str) -> NodeId {
    let id = NodeId::from_content(name.as_bytes());
    registry
        .create(owner, NodeSpec::asset(id, parent, format!("ipfs://{}", name)))
        .unwrap();
    id
}
