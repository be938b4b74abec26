//! Integration tests for collections and their composed access

mod common;

use std::collections::BTreeSet;

use ::common::registry::{NodeId, NodeSpec, Policy, Registry, RegistryError};
use ::common::crypto::PublicKey;

/// Two authors each publish an asset; a curator collects both
struct Gallery {
    registry: Registry,
    alice: PublicKey,
    bob: PublicKey,
    curator: PublicKey,
    a: NodeId,
    b: NodeId,
    collection: NodeId,
}

fn gallery() -> Gallery {
    let (mut registry, alice) = common::setup_test_env();
    let bob = common::principal();
    let curator = common::principal();
    registry.install_policy("closed".into(), Policy::Closed);

    let a_shelf = common::container(&mut registry, &alice, NodeId::ROOT);
    let b_shelf = common::container(&mut registry, &bob, NodeId::ROOT);
    let a = common::asset(&mut registry, &alice, a_shelf, "a");
    let b = common::asset(&mut registry, &bob, b_shelf, "b");

    let collection = registry.next_node_id(&curator).unwrap();
    registry
        .create(
            &curator,
            NodeSpec::collection(collection, NodeId::ROOT, vec![a, b]).with_uri("ipfs://set"),
        )
        .unwrap();

    Gallery {
        registry,
        alice,
        bob,
        curator,
        a,
        b,
        collection,
    }
}

#[test]
fn test_collection_open_by_default() {
    let g = gallery();
    let reader = common::principal();
    assert!(g.registry.auth(&g.collection, &reader).unwrap());
    let view = g.registry.get(&g.collection).unwrap();
    assert_eq!(view.referenced_assets, vec![g.a, g.b]);
    assert_eq!(view.uri.as_deref(), Some("ipfs://set"));
    assert_eq!(view.owner, Some(g.curator));
}

#[test]
fn test_revoking_reference_auth_denies_collection() {
    let mut g = gallery();
    let reader = common::principal();

    g.registry
        .set_reference_module(&g.bob, &g.b, Some("closed".into()))
        .unwrap();
    assert!(!g.registry.auth(&g.collection, &reader).unwrap());

    // the asset itself stays readable
    assert!(g.registry.auth(&g.b, &reader).unwrap());

    g.registry.set_reference_module(&g.bob, &g.b, None).unwrap();
    assert!(g.registry.auth(&g.collection, &reader).unwrap());
}

#[test]
fn test_asset_access_denies_collection() {
    let mut g = gallery();
    let reader = common::principal();
    let friend = common::principal();
    g.registry.install_policy(
        "friend-only".into(),
        Policy::AllowList(BTreeSet::from([friend])),
    );

    g.registry
        .set_access_module(&g.alice, &g.a, Some("friend-only".into()))
        .unwrap();
    assert!(!g.registry.auth(&g.collection, &reader).unwrap());
    assert!(g.registry.auth(&g.collection, &friend).unwrap());
}

#[test]
fn test_collection_own_access_module_applies() {
    let mut g = gallery();
    let reader = common::principal();
    g.registry
        .set_access_module(&g.curator, &g.collection, Some("closed".into()))
        .unwrap();
    assert!(!g.registry.auth(&g.collection, &reader).unwrap());
}

#[test]
fn test_asset_order_does_not_change_decision() {
    let mut g = gallery();
    let friend = common::principal();
    let reader = common::principal();
    g.registry.install_policy(
        "friend-only".into(),
        Policy::AllowList(BTreeSet::from([friend])),
    );
    g.registry
        .set_access_module(&g.bob, &g.b, Some("friend-only".into()))
        .unwrap();

    let reversed = g.registry.next_node_id(&g.curator).unwrap();
    g.registry
        .create(
            &g.curator,
            NodeSpec::collection(reversed, NodeId::ROOT, vec![g.b, g.a]),
        )
        .unwrap();

    for who in [&friend, &reader, &g.alice, &g.bob] {
        assert_eq!(
            g.registry.auth(&g.collection, who).unwrap(),
            g.registry.auth(&reversed, who).unwrap()
        );
    }
    assert!(g.registry.auth(&reversed, &friend).unwrap());
    assert!(!g.registry.auth(&reversed, &reader).unwrap());
}

#[test]
fn test_collection_must_reference_assets() {
    let (mut registry, owner) = common::setup_test_env();
    let shelf = common::container(&mut registry, &owner, NodeId::ROOT);
    let a = common::asset(&mut registry, &owner, shelf, "a");
    let pointer = registry.next_node_id(&owner).unwrap();
    registry
        .create(&owner, NodeSpec::reference(pointer, shelf, a))
        .unwrap();
    let missing = NodeId::from_content(b"missing");

    for assets in [vec![], vec![shelf], vec![pointer], vec![a, missing]] {
        let id = registry.next_node_id(&owner).unwrap();
        assert!(matches!(
            registry.create(&owner, NodeSpec::collection(id, shelf, assets)),
            Err(RegistryError::InvalidParams(_))
        ));
    }
    assert_eq!(registry.total_supply(), 3);
}

#[test]
fn test_set_referenced_assets() {
    let mut g = gallery();
    let c = common::asset(&mut g.registry, &g.alice, NodeId::ROOT, "c");

    g.registry
        .set_referenced_assets(&g.curator, &g.collection, vec![c, g.a])
        .unwrap();
    assert_eq!(
        g.registry.get(&g.collection).unwrap().referenced_assets,
        vec![c, g.a]
    );

    assert!(matches!(
        g.registry.set_referenced_assets(&g.curator, &g.collection, vec![]),
        Err(RegistryError::InvalidParams(_))
    ));
    assert!(matches!(
        g.registry
            .set_referenced_assets(&g.curator, &g.collection, vec![g.collection]),
        Err(RegistryError::InvalidParams(_))
    ));
    assert_eq!(
        g.registry.set_referenced_assets(&g.alice, &g.collection, vec![g.a]),
        Err(RegistryError::NotAuthorized)
    );
    assert!(matches!(
        g.registry.set_referenced_assets(&g.alice, &g.a, vec![c]),
        Err(RegistryError::InvalidParams(_))
    ));
    assert_eq!(
        g.registry.get(&g.collection).unwrap().referenced_assets,
        vec![c, g.a]
    );
}

#[test]
fn test_set_referenced_assets_requires_reference_auth() {
    let mut g = gallery();
    let c = common::asset(&mut g.registry, &g.bob, NodeId::ROOT, "c");
    g.registry
        .set_reference_module(&g.bob, &c, Some("closed".into()))
        .unwrap();

    assert_eq!(
        g.registry
            .set_referenced_assets(&g.curator, &g.collection, vec![g.a, c]),
        Err(RegistryError::NotAuthorized)
    );
}

#[test]
fn test_collection_cannot_parent() {
    let g = gallery();
    let mut registry = g.registry;
    let x = NodeId::from_content(b"x");
    assert!(matches!(
        registry.create(&g.curator, NodeSpec::asset(x, g.collection, "ipfs://x")),
        Err(RegistryError::InvalidParams(_))
    ));
}
