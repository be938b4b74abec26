//! Integration tests for node creation and identity rules

mod common;

use ::common::registry::{NodeId, NodeKind, NodeSpec, RegistryError, NO_TOKEN};

#[test]
fn test_tokens_are_contiguous_from_one() {
    let (mut registry, owner) = common::setup_test_env();
    let other = common::principal();

    let c0 = common::container(&mut registry, &owner, NodeId::ROOT);
    common::asset(&mut registry, &owner, c0, "a");
    let c1 = common::container(&mut registry, &other, NodeId::ROOT);
    common::asset(&mut registry, &other, c1, "b");
    common::container(&mut registry, &owner, c0);

    let tokens: Vec<u64> = registry.store().iter().map(|n| n.token).collect();
    assert_eq!(tokens, vec![1, 2, 3, 4, 5]);
    assert_eq!(registry.total_supply(), 5);
}

#[test]
fn test_failed_create_does_not_consume_a_token() {
    let (mut registry, owner) = common::setup_test_env();
    let c0 = common::container(&mut registry, &owner, NodeId::ROOT);
    let a = common::asset(&mut registry, &owner, c0, "a");

    // asset parent
    let next = registry.next_node_id(&owner).unwrap();
    assert!(registry.create(&owner, NodeSpec::container(next, a)).is_err());

    let b = common::asset(&mut registry, &owner, c0, "b");
    assert_eq!(registry.get(&b).unwrap().token, 3);
}

#[test]
fn test_derived_id_mismatch_is_invalid() {
    let (mut registry, owner) = common::setup_test_env();
    let other = common::principal();

    // claiming the id another principal is about to use
    let squatted = registry.next_node_id(&other).unwrap();
    let result = registry.create(&owner, NodeSpec::container(squatted, NodeId::ROOT));
    assert!(matches!(result, Err(RegistryError::InvalidParams(_))));

    // a free-form id for a container
    let free_form = NodeId::from_content(b"my container");
    let result = registry.create(&owner, NodeSpec::container(free_form, NodeId::ROOT));
    assert!(matches!(result, Err(RegistryError::InvalidParams(_))));

    // the other principal's claim is untouched
    registry
        .create(&other, NodeSpec::container(squatted, NodeId::ROOT))
        .unwrap();
}

#[test]
fn test_counter_advances_on_every_creation() {
    let (mut registry, owner) = common::setup_test_env();
    let first = registry.next_node_id(&owner).unwrap();
    let c0 = common::container(&mut registry, &owner, NodeId::ROOT);
    assert_eq!(first, c0);
    assert_eq!(registry.store().creation_count(&owner), 1);

    let before_asset = registry.next_node_id(&owner).unwrap();
    common::asset(&mut registry, &owner, c0, "a");
    assert_eq!(registry.store().creation_count(&owner), 2);

    // the asset consumed a slot, so the id seen before it is stale
    let next = registry.next_node_id(&owner).unwrap();
    assert_ne!(next, before_asset);
    assert_eq!(next, NodeId::derive(&owner, 2));
    assert!(matches!(
        registry.create(&owner, NodeSpec::container(before_asset, c0)),
        Err(RegistryError::InvalidParams(_))
    ));
    registry
        .create(&owner, NodeSpec::container(next, c0))
        .unwrap();
}

#[test]
fn test_next_node_id_after_skips_ahead() {
    let (mut registry, owner) = common::setup_test_env();
    let predicted = registry.next_node_id_after(&owner, 2).unwrap();
    common::asset(&mut registry, &owner, NodeId::ROOT, "a");
    common::asset(&mut registry, &owner, NodeId::ROOT, "b");
    assert_eq!(registry.next_node_id(&owner).unwrap(), predicted);
}

#[test]
fn test_reused_id_already_exists() {
    let (mut registry, owner) = common::setup_test_env();
    let other = common::principal();
    let a = common::asset(&mut registry, &owner, NodeId::ROOT, "a");

    let result = registry.create(&other, NodeSpec::asset(a, NodeId::ROOT, "ipfs://mine"));
    assert_eq!(result, Err(RegistryError::NodeAlreadyExists(a)));
    assert_eq!(registry.get(&a).unwrap().uri.as_deref(), Some("ipfs://a"));
}

#[test]
fn test_root_id_is_reserved() {
    let (mut registry, owner) = common::setup_test_env();
    let result = registry.create(&owner, NodeSpec::asset(NodeId::ROOT, NodeId::ROOT, "x"));
    assert!(matches!(result, Err(RegistryError::InvalidParams(_))));
}

#[test]
fn test_parent_must_be_a_live_container() {
    let (mut registry, owner) = common::setup_test_env();
    let missing = NodeId::from_content(b"missing");
    let result = registry.create(&owner, NodeSpec::asset(NodeId::from_content(b"a"), missing, "x"));
    assert_eq!(result, Err(RegistryError::NodeDoesNotExist(missing)));

    let a = common::asset(&mut registry, &owner, NodeId::ROOT, "a");
    let id = registry.next_node_id(&owner).unwrap();
    let result = registry.create(&owner, NodeSpec::collection(id, a, vec![a]));
    assert!(matches!(result, Err(RegistryError::InvalidParams(_))));
}

#[test]
fn test_get_fills_reference_uri_from_asset() {
    let (mut registry, owner) = common::setup_test_env();
    let c0 = common::container(&mut registry, &owner, NodeId::ROOT);
    let a = common::asset(&mut registry, &owner, c0, "a");

    let r = registry.next_node_id(&owner).unwrap();
    registry
        .create(&owner, NodeSpec::reference(r, c0, a))
        .unwrap();

    let view = registry.get(&r).unwrap();
    assert_eq!(view.kind, NodeKind::Reference);
    assert_eq!(view.uri.as_deref(), Some("ipfs://a"));
    assert_eq!(view.parent, c0);
    assert_eq!(view.owner, Some(owner));

    registry.set_uri(&owner, &a, "ipfs://a2").unwrap();
    assert_eq!(registry.get(&r).unwrap().uri.as_deref(), Some("ipfs://a2"));
}

#[test]
fn test_reference_cannot_carry_its_own_uri() {
    let (mut registry, owner) = common::setup_test_env();
    let a = common::asset(&mut registry, &owner, NodeId::ROOT, "a");
    let r = registry.next_node_id(&owner).unwrap();

    let result = registry.create(&owner, NodeSpec::reference(r, NodeId::ROOT, a).with_uri("x"));
    assert!(matches!(result, Err(RegistryError::InvalidParams(_))));

    registry
        .create(&owner, NodeSpec::reference(r, NodeId::ROOT, a))
        .unwrap();
    assert!(matches!(
        registry.set_uri(&owner, &r, "x"),
        Err(RegistryError::InvalidParams(_))
    ));
}

#[test]
fn test_get_unknown_and_root() {
    let (registry, _) = common::setup_test_env();
    let missing = NodeId::from_content(b"missing");
    assert_eq!(
        registry.get(&missing),
        Err(RegistryError::NodeDoesNotExist(missing))
    );
    assert_eq!(
        registry.get(&NodeId::ROOT),
        Err(RegistryError::NodeDoesNotExist(NodeId::ROOT))
    );
    assert_eq!(registry.store().token_of(&missing), NO_TOKEN);
}

#[test]
fn test_setters_require_ownership() {
    let (mut registry, owner) = common::setup_test_env();
    let intruder = common::principal();
    let a = common::asset(&mut registry, &owner, NodeId::ROOT, "a");
    registry.install_policy("open".into(), ::common::registry::Policy::Open);

    assert_eq!(
        registry.set_uri(&intruder, &a, "ipfs://evil"),
        Err(RegistryError::NotAuthorized)
    );
    assert_eq!(
        registry.set_access_module(&intruder, &a, Some("open".into())),
        Err(RegistryError::NotAuthorized)
    );
    assert_eq!(
        registry.set_reference_module(&intruder, &a, Some("open".into())),
        Err(RegistryError::NotAuthorized)
    );

    let missing = NodeId::from_content(b"missing");
    assert_eq!(
        registry.set_uri(&owner, &missing, "x"),
        Err(RegistryError::NodeDoesNotExist(missing))
    );
}

#[test]
fn test_modules_must_be_installed() {
    let (mut registry, owner) = common::setup_test_env();
    let a = common::asset(&mut registry, &owner, NodeId::ROOT, "a");
    assert!(matches!(
        registry.set_access_module(&owner, &a, Some("nope".into())),
        Err(RegistryError::InvalidParams(_))
    ));
    assert!(registry.get(&a).unwrap().access_module.is_none());
}
