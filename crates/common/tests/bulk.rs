//! Integration tests for batch publication

mod common;

use ::common::registry::{
    AssetRef, NodeId, NodeSpec, Policy, RegistryError, RegistryEvent, MAX_BATCH_SIZE,
};

#[test]
fn test_create_nodes_in_order() {
    let (mut registry, owner) = common::setup_test_env();
    let c = registry.next_node_id(&owner).unwrap();
    let a = NodeId::from_content(b"a");
    let b = NodeId::from_content(b"b");

    let tokens = registry
        .create_nodes(
            &owner,
            vec![
                NodeSpec::container(c, NodeId::ROOT),
                NodeSpec::asset(a, c, "ipfs://a"),
                NodeSpec::asset(b, c, "ipfs://b"),
            ],
        )
        .unwrap();
    assert_eq!(tokens, vec![1, 2, 3]);
    assert_eq!(registry.children(&c).unwrap(), vec![a, b]);
}

#[test]
fn test_create_nodes_is_all_or_nothing() {
    let (mut registry, owner) = common::setup_test_env();
    let existing = common::asset(&mut registry, &owner, NodeId::ROOT, "existing");
    let events = registry.subscribe();

    let c = registry.next_node_id(&owner).unwrap();
    let fresh = NodeId::from_content(b"fresh");
    let result = registry.create_nodes(
        &owner,
        vec![
            NodeSpec::container(c, NodeId::ROOT),
            NodeSpec::asset(fresh, c, "ipfs://fresh"),
            NodeSpec::asset(existing, c, "ipfs://dup"),
        ],
    );
    assert_eq!(result, Err(RegistryError::NodeAlreadyExists(existing)));

    assert_eq!(registry.total_supply(), 1);
    assert!(registry.get(&c).is_err());
    assert!(registry.get(&fresh).is_err());
    assert_eq!(registry.children(&NodeId::ROOT).unwrap(), vec![existing]);
    assert_eq!(registry.ownership().tokens_of(&owner), vec![1]);
    // the derived id is still free
    assert_eq!(registry.next_node_id(&owner).unwrap(), c);
    assert!(events.try_recv().is_err());
}

#[test]
fn test_batch_limit() {
    let (mut registry, owner) = common::setup_test_env();
    let specs = |n: usize| {
        (0..n)
            .map(|i| {
                NodeSpec::asset(
                    NodeId::from_content(format!("asset-{}", i).as_bytes()),
                    NodeId::ROOT,
                    format!("ipfs://{}", i),
                )
            })
            .collect::<Vec<_>>()
    };

    assert!(matches!(
        registry.create_nodes(&owner, specs(MAX_BATCH_SIZE + 1)),
        Err(RegistryError::InvalidParams(_))
    ));
    assert_eq!(registry.total_supply(), 0);

    let tokens = registry.create_nodes(&owner, specs(MAX_BATCH_SIZE)).unwrap();
    assert_eq!(tokens.len(), MAX_BATCH_SIZE);
}

#[test]
fn test_configured_batch_limit() {
    let (registry, owner) = common::setup_test_env();
    let mut registry = registry.with_max_batch_size(2);
    let specs: Vec<NodeSpec> = ["a", "b", "c"]
        .iter()
        .map(|n| NodeSpec::asset(NodeId::from_content(n.as_bytes()), NodeId::ROOT, *n))
        .collect();
    assert!(matches!(
        registry.create_nodes(&owner, specs),
        Err(RegistryError::InvalidParams(_))
    ));
    assert_eq!(registry.with_max_batch_size(1000).max_batch_size(), MAX_BATCH_SIZE);
}

#[test]
fn test_collection_with_fresh_and_existing_assets() {
    let (mut registry, owner) = common::setup_test_env();
    let shelf = common::container(&mut registry, &owner, NodeId::ROOT);
    let old = common::asset(&mut registry, &owner, shelf, "old");
    let events = registry.subscribe();

    // one fresh asset is created ahead of the collection
    let id = registry.next_node_id_after(&owner, 1).unwrap();
    let new = NodeId::from_content(b"new");
    let token = registry
        .create_collection_with_assets(
            &owner,
            id,
            shelf,
            Some("ipfs://album".to_string()),
            vec![
                AssetRef::Fresh {
                    id: new,
                    parent: shelf,
                    uri: "ipfs://new".to_string(),
                },
                AssetRef::Existing(old),
            ],
        )
        .unwrap();

    assert_eq!(token, 4);
    let view = registry.get(&id).unwrap();
    assert_eq!(view.referenced_assets, vec![new, old]);
    assert_eq!(registry.children(&shelf).unwrap(), vec![old, new, id]);

    let created: Vec<NodeId> = events
        .try_iter()
        .filter_map(|e| match e {
            RegistryEvent::Created { id, .. } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(created, vec![new, id]);
}

#[test]
fn test_collection_with_assets_rolls_back() {
    let (mut registry, owner) = common::setup_test_env();
    registry.install_policy("closed".into(), Policy::Closed);
    let other = common::principal();
    let locked = common::asset(&mut registry, &other, NodeId::ROOT, "locked");
    registry
        .set_reference_module(&other, &locked, Some("closed".into()))
        .unwrap();

    let id = registry.next_node_id_after(&owner, 1).unwrap();
    let new = NodeId::from_content(b"new");
    let result = registry.create_collection_with_assets(
        &owner,
        id,
        NodeId::ROOT,
        None,
        vec![
            AssetRef::Fresh {
                id: new,
                parent: NodeId::ROOT,
                uri: "ipfs://new".to_string(),
            },
            AssetRef::Existing(locked),
        ],
    );
    assert_eq!(result, Err(RegistryError::NotAuthorized));
    assert_eq!(registry.total_supply(), 1);
    assert!(registry.get(&new).is_err());
    // the rolled back asset gave its counter slot back
    assert_eq!(registry.next_node_id_after(&owner, 1).unwrap(), id);
}

#[test]
fn test_collection_with_no_assets() {
    let (mut registry, owner) = common::setup_test_env();
    let id = registry.next_node_id(&owner).unwrap();
    assert!(matches!(
        registry.create_collection_with_assets(&owner, id, NodeId::ROOT, None, vec![]),
        Err(RegistryError::InvalidParams(_))
    ));
}

#[test]
fn test_create_node_with_uri() {
    let (mut registry, owner) = common::setup_test_env();
    let c = registry.next_node_id(&owner).unwrap();
    registry
        .create_node_with_uri(&owner, NodeSpec::container(c, NodeId::ROOT), "ipfs://folder")
        .unwrap();
    assert_eq!(registry.get(&c).unwrap().uri.as_deref(), Some("ipfs://folder"));

    let a = common::asset(&mut registry, &owner, c, "a");
    let r = registry.next_node_id(&owner).unwrap();
    assert!(matches!(
        registry.create_node_with_uri(&owner, NodeSpec::reference(r, c, a), "ipfs://own"),
        Err(RegistryError::InvalidParams(_))
    ));
}
