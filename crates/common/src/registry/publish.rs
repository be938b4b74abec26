//! Publication entry points
//!
//! Convenience wrappers that create nodes through
//! [`Registry::apply_create`]. The batch variants either commit every
//! node or none of them: the store and ownership ledger are restored
//! from a copy taken up front if any element fails, and events are only
//! published once the whole batch has gone through.

use super::auth::Principal;
use super::error::{RegistryError, Result};
use super::events::RegistryEvent;
use super::id::{NodeId, Token};
use super::node::NodeKind;
use super::ownership::OwnershipProvider;
use super::registry::{NodeSpec, Registry};

/// One entry of a collection being published together with its assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetRef {
    /// An asset that already exists in the registry
    Existing(NodeId),
    /// An asset to create as part of the same publication
    Fresh {
        id: NodeId,
        parent: NodeId,
        uri: String,
    },
}

impl AssetRef {
    pub fn id(&self) -> NodeId {
        match self {
            AssetRef::Existing(id) => *id,
            AssetRef::Fresh { id, .. } => *id,
        }
    }
}

impl<O: OwnershipProvider> Registry<O> {
    /// Create a single node
    pub fn create_node(&mut self, caller: &Principal, spec: NodeSpec) -> Result<Token> {
        self.create(caller, spec)
    }

    /// Create a single node with its uri set
    pub fn create_node_with_uri(
        &mut self,
        caller: &Principal,
        spec: NodeSpec,
        uri: impl Into<String>,
    ) -> Result<Token> {
        self.create(caller, spec.with_uri(uri))
    }
}

impl<O: OwnershipProvider + Clone> Registry<O> {
    /// Create every node in `specs`, in order. Fails the whole batch on
    ///  the first failing element.
    pub fn create_nodes(&mut self, caller: &Principal, specs: Vec<NodeSpec>) -> Result<Vec<Token>> {
        self.check_batch_size(specs.len())?;
        let count = specs.len();
        let tokens = self.atomically(|registry, events| {
            specs
                .into_iter()
                .map(|spec| registry.apply_create(caller, spec, events))
                .collect::<Result<Vec<Token>>>()
        })?;
        tracing::info!("created batch of {} nodes", count);
        Ok(tokens)
    }

    /// Publish a collection together with any assets it needs that
    ///  don't exist yet. `assets` gives the collection's final order.
    ///  Fresh assets are created first, so the collection id is the
    ///  caller's derived id after them, see
    ///  [`Registry::next_node_id_after`] with the number of fresh assets.
    pub fn create_collection_with_assets(
        &mut self,
        caller: &Principal,
        id: NodeId,
        parent: NodeId,
        uri: Option<String>,
        assets: Vec<AssetRef>,
    ) -> Result<Token> {
        let fresh = assets
            .iter()
            .filter(|a| matches!(a, AssetRef::Fresh { .. }))
            .count();
        self.check_batch_size(fresh)?;
        if assets.is_empty() {
            return Err(RegistryError::invalid(
                "a collection must reference at least one asset",
            ));
        }

        self.atomically(|registry, events| {
            let mut ids = Vec::with_capacity(assets.len());
            for asset in assets {
                if let AssetRef::Fresh { id, parent, uri } = &asset {
                    registry.apply_create(caller, NodeSpec::asset(*id, *parent, uri.clone()), events)?;
                }
                ids.push(asset.id());
            }
            let spec = NodeSpec {
                id,
                parent,
                kind: NodeKind::Collection,
                uri,
                referenced_assets: ids,
            };
            registry.apply_create(caller, spec, events)
        })
    }

    fn check_batch_size(&self, len: usize) -> Result<()> {
        if len > self.max_batch_size {
            return Err(RegistryError::invalid(format!(
                "batch of {} exceeds the limit of {}",
                len, self.max_batch_size
            )));
        }
        Ok(())
    }

    /// Run `f`, rolling the store and ownership ledger back if it fails.
    ///  Events queued by `f` are only published on success.
    fn atomically<T>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut Vec<RegistryEvent>) -> Result<T>,
    ) -> Result<T> {
        let store = self.store.clone();
        let ownership = self.ownership.clone();
        let mut events = Vec::new();

        match f(self, &mut events) {
            Ok(value) => {
                self.events.publish(events);
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("rolling back batch: {}", e);
                self.store = store;
                self.ownership = ownership;
                Err(e)
            }
        }
    }
}
