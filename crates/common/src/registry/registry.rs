use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::auth::{AuthModule, ModuleId, Policy, Principal};
use super::error::{RegistryError, Result};
use super::events::{EventBus, RegistryEvent};
use super::id::{NodeId, Token, NO_TOKEN};
use super::node::{NodeKind, NodeView};
use super::ownership::{MemoryOwnership, OwnershipProvider};
use super::store::{NewNode, NodeStore};

/// Largest batch accepted by the bulk creation entry points
pub const MAX_BATCH_SIZE: usize = 100;

/// Caller-supplied description of a node to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub id: NodeId,
    pub parent: NodeId,
    pub kind: NodeKind,
    pub uri: Option<String>,
    pub referenced_assets: Vec<NodeId>,
}

impl NodeSpec {
    pub fn container(id: NodeId, parent: NodeId) -> Self {
        Self {
            id,
            parent,
            kind: NodeKind::Container,
            uri: None,
            referenced_assets: vec![],
        }
    }

    pub fn asset(id: NodeId, parent: NodeId, uri: impl Into<String>) -> Self {
        Self {
            id,
            parent,
            kind: NodeKind::Asset,
            uri: Some(uri.into()),
            referenced_assets: vec![],
        }
    }

    pub fn reference(id: NodeId, parent: NodeId, asset: NodeId) -> Self {
        Self {
            id,
            parent,
            kind: NodeKind::Reference,
            uri: None,
            referenced_assets: vec![asset],
        }
    }

    pub fn collection(id: NodeId, parent: NodeId, assets: Vec<NodeId>) -> Self {
        Self {
            id,
            parent,
            kind: NodeKind::Collection,
            uri: None,
            referenced_assets: assets,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// The registry: node store, installed auth modules, the ownership
///  collaborator and the event fan-out, behind one API.
///
/// Every mutator is all-or-nothing. Reads (`get`, `auth`, `ref_auth`)
///  take `&self` and never touch state.
#[derive(Debug)]
pub struct Registry<O: OwnershipProvider = MemoryOwnership> {
    pub(crate) store: NodeStore,
    pub(crate) ownership: O,
    pub(crate) modules: HashMap<ModuleId, Arc<dyn AuthModule>>,
    /// the stock policies among `modules`, kept so they can be snapshotted
    pub(crate) policies: BTreeMap<ModuleId, Policy>,
    pub(crate) events: EventBus,
    pub(crate) max_batch_size: usize,
}

impl Default for Registry<MemoryOwnership> {
    fn default() -> Self {
        Self::new(MemoryOwnership::new())
    }
}

impl<O: OwnershipProvider> Registry<O> {
    pub fn new(ownership: O) -> Self {
        Self {
            store: NodeStore::new(),
            ownership,
            modules: HashMap::new(),
            policies: BTreeMap::new(),
            events: EventBus::new(),
            max_batch_size: MAX_BATCH_SIZE,
        }
    }

    /// Lower the bulk creation cap. Values above [`MAX_BATCH_SIZE`] are clamped.
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max.min(MAX_BATCH_SIZE);
        self
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn ownership(&self) -> &O {
        &self.ownership
    }

    pub fn ownership_mut(&mut self) -> &mut O {
        &mut self.ownership
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> flume::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Install (or replace) the module behind `id`
    pub fn install_module(&mut self, id: ModuleId, module: Arc<dyn AuthModule>) {
        tracing::info!("installing auth module {}", id);
        self.policies.remove(&id);
        self.modules.insert(id, module);
    }

    /// Install a stock policy; unlike arbitrary modules, these survive snapshots
    pub fn install_policy(&mut self, id: ModuleId, policy: Policy) {
        self.install_module(id.clone(), Arc::new(policy.clone()));
        self.policies.insert(id, policy);
    }

    pub fn policies(&self) -> &BTreeMap<ModuleId, Policy> {
        &self.policies
    }

    pub fn is_installed(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub(crate) fn module(&self, id: &ModuleId) -> Result<&Arc<dyn AuthModule>> {
        self.modules
            .get(id)
            .ok_or_else(|| RegistryError::integrity(format!("auth module {} is not installed", id)))
    }

    pub fn total_supply(&self) -> u64 {
        self.store.total_supply()
    }

    /// The id `principal` must use for its next non-asset node
    pub fn next_node_id(&self, principal: &Principal) -> Result<NodeId> {
        let owner = self.resolve_caller(principal)?;
        Ok(self.store.next_id(&owner))
    }

    /// The id `principal` must use for a non-asset node created after
    ///  `skip` other nodes of its own, e.g. a collection published
    ///  together with `skip` fresh assets
    pub fn next_node_id_after(&self, principal: &Principal, skip: u64) -> Result<NodeId> {
        let owner = self.resolve_caller(principal)?;
        Ok(self.store.next_id_after(&owner, skip))
    }

    /// Ordered children of `id`; pass [`NodeId::ROOT`] for top-level nodes
    pub fn children(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        self.store.children(id)
    }

    pub fn parent_of(&self, id: &NodeId) -> Result<NodeId> {
        let node = self.store.by_id(id)?;
        self.store.parent_id(node)
    }

    /// Current owner of a node
    pub fn owner_of(&self, id: &NodeId) -> Result<Principal> {
        let node = self.store.by_id(id)?;
        self.token_owner(node.token)
    }

    /// Look a node up, with derived fields filled in
    pub fn get(&self, id: &NodeId) -> Result<NodeView> {
        let node = self.store.by_id(id)?;
        let uri = match node.kind {
            NodeKind::Reference => {
                let asset = node.referenced_assets.first().ok_or_else(|| {
                    RegistryError::integrity(format!("reference {} points at nothing", id))
                })?;
                self.referenced(asset)?.uri.clone()
            }
            _ => node.uri.clone(),
        };
        Ok(NodeView {
            id: node.id,
            token: node.token,
            kind: node.kind,
            parent: self.store.parent_id(node)?,
            uri,
            access_module: node.access_module.clone(),
            reference_module: node.reference_module.clone(),
            referenced_assets: node.referenced_assets.clone(),
            creator: node.creator,
            owner: self.ownership.owner_of(node.token),
        })
    }

    /// Create a single node
    pub fn create(&mut self, caller: &Principal, spec: NodeSpec) -> Result<Token> {
        let mut events = Vec::new();
        let token = self.apply_create(caller, spec, &mut events)?;
        self.events.publish(events);
        Ok(token)
    }

    /// Set the uri of a node the caller owns. References inherit
    ///  their uri from the asset and can't be given one.
    pub fn set_uri(&mut self, caller: &Principal, id: &NodeId, uri: impl Into<String>) -> Result<()> {
        let uri = uri.into();
        let token = self.owned_token(caller, id)?;
        self.ensure_kind(token, |k| k != NodeKind::Reference, "a reference inherits its uri")?;

        if let Some(node) = self.store.node_mut(token) {
            node.uri = Some(uri.clone());
        }
        tracing::info!("set uri of {} to {}", id, uri);
        self.events
            .publish(vec![RegistryEvent::UriUpdate { id: *id, uri }]);
        Ok(())
    }

    /// Set (or clear, with `None`) the module governing direct access
    pub fn set_access_module(
        &mut self,
        caller: &Principal,
        id: &NodeId,
        module: Option<ModuleId>,
    ) -> Result<()> {
        let token = self.owned_token(caller, id)?;
        self.ensure_installed(module.as_ref())?;

        if let Some(node) = self.store.node_mut(token) {
            node.access_module = module.clone();
        }
        tracing::info!("set access module of {} to {:?}", id, module);
        self.events
            .publish(vec![RegistryEvent::AccessAuthUpdate { id: *id, module }]);
        Ok(())
    }

    /// Set (or clear, with `None`) the module governing who may reference
    ///  this node. References and collections can never be referenced,
    ///  so they can't carry one.
    pub fn set_reference_module(
        &mut self,
        caller: &Principal,
        id: &NodeId,
        module: Option<ModuleId>,
    ) -> Result<()> {
        let token = self.owned_token(caller, id)?;
        self.ensure_kind(
            token,
            |k| !k.is_reference_like(),
            "references and collections can't carry a reference module",
        )?;
        self.ensure_installed(module.as_ref())?;

        if let Some(node) = self.store.node_mut(token) {
            node.reference_module = module.clone();
        }
        tracing::info!("set reference module of {} to {:?}", id, module);
        self.events
            .publish(vec![RegistryEvent::ReferenceAuthUpdate { id: *id, module }]);
        Ok(())
    }

    /// Replace the referenced asset list of a reference or collection
    pub fn set_referenced_assets(
        &mut self,
        caller: &Principal,
        id: &NodeId,
        assets: Vec<NodeId>,
    ) -> Result<()> {
        let token = self.owned_token(caller, id)?;
        let kind = self.node_at(token)?.kind;
        if !kind.is_reference_like() {
            return Err(RegistryError::invalid(format!(
                "a {} has no referenced assets",
                kind
            )));
        }
        self.store.check_referenced_assets(kind, &assets)?;
        let owner = self.token_owner(token)?;
        self.ensure_may_reference(&owner, &assets)?;

        if let Some(node) = self.store.node_mut(token) {
            node.referenced_assets = assets.clone();
        }
        tracing::info!("set {} referenced assets of {}", assets.len(), id);
        self.events
            .publish(vec![RegistryEvent::ReferencedAssetsUpdate { id: *id, assets }]);
        Ok(())
    }

    /// Move `id` to be the last child of `new_parent`.
    ///
    /// The caller must own both the node and the new parent (the root
    ///  sentinel has no owner and needs no check). Sibling order is
    ///  preserved at both the old and the new parent.
    pub fn move_node(&mut self, caller: &Principal, id: &NodeId, new_parent: &NodeId) -> Result<()> {
        if id.is_root() {
            return Err(RegistryError::NodeDoesNotExist(*id));
        }
        let token = self.owned_token(caller, id)?;
        let to = self.store.resolve_parent(new_parent)?;
        if to != NO_TOKEN {
            self.require_owner(caller, to)?;
            if self.store.is_ancestor(token, to)? {
                return Err(RegistryError::invalid(format!(
                    "cannot move {} under itself",
                    id
                )));
            }
        }
        let from = self.store.parent_id(self.node_at(token)?)?;

        self.store.reparent(token, to)?;
        tracing::info!("moved {} from {} to {}", id, from, new_parent);
        self.events.publish(vec![RegistryEvent::Moved {
            id: *id,
            from,
            to: *new_parent,
        }]);
        Ok(())
    }

    /// Validate and insert one node, queueing its events on `events`.
    ///  Nothing is mutated unless every check passes.
    pub(crate) fn apply_create(
        &mut self,
        caller: &Principal,
        spec: NodeSpec,
        events: &mut Vec<RegistryEvent>,
    ) -> Result<Token> {
        let owner = self.resolve_caller(caller)?;
        let parent = self.store.check_create(
            &owner,
            &spec.id,
            &spec.parent,
            spec.kind,
            &spec.referenced_assets,
        )?;
        if spec.kind == NodeKind::Reference && spec.uri.is_some() {
            return Err(RegistryError::invalid("a reference inherits its uri"));
        }
        self.ensure_may_reference(&owner, &spec.referenced_assets)?;

        let token = self.store.insert(NewNode {
            id: spec.id,
            parent,
            kind: spec.kind,
            uri: spec.uri.clone(),
            referenced_assets: spec.referenced_assets,
            creator: owner,
        });
        self.ownership.mint(token, owner);
        tracing::info!("created {} {} (token {}) under {}", spec.kind, spec.id, token, spec.parent);

        events.push(RegistryEvent::Created {
            id: spec.id,
            token,
            parent: spec.parent,
            kind: spec.kind,
        });
        if let Some(uri) = spec.uri {
            events.push(RegistryEvent::UriUpdate { id: spec.id, uri });
        }
        Ok(token)
    }

    pub(crate) fn resolve_caller(&self, caller: &Principal) -> Result<Principal> {
        self.ownership
            .resolve_owner(caller)
            .ok_or(RegistryError::NotAuthorized)
    }

    pub(crate) fn token_owner(&self, token: Token) -> Result<Principal> {
        self.ownership
            .owner_of(token)
            .ok_or_else(|| RegistryError::integrity(format!("token {} has no owner", token)))
    }

    /// The caller must resolve to the current owner of `token`
    fn require_owner(&self, caller: &Principal, token: Token) -> Result<()> {
        let caller = self.resolve_caller(caller)?;
        if self.token_owner(token)? != caller {
            return Err(RegistryError::NotAuthorized);
        }
        Ok(())
    }

    /// Token of an existing node the caller owns
    fn owned_token(&self, caller: &Principal, id: &NodeId) -> Result<Token> {
        let token = self.store.by_id(id)?.token;
        self.require_owner(caller, token)?;
        Ok(token)
    }

    fn node_at(&self, token: Token) -> Result<&super::node::Node> {
        self.store
            .node(token)
            .ok_or_else(|| RegistryError::integrity(format!("missing token {}", token)))
    }

    fn ensure_kind(&self, token: Token, ok: impl Fn(NodeKind) -> bool, msg: &str) -> Result<()> {
        if ok(self.node_at(token)?.kind) {
            Ok(())
        } else {
            Err(RegistryError::invalid(msg))
        }
    }

    fn ensure_installed(&self, module: Option<&ModuleId>) -> Result<()> {
        match module {
            Some(m) if !self.is_installed(m) => Err(RegistryError::invalid(format!(
                "auth module {} is not installed",
                m
            ))),
            _ => Ok(()),
        }
    }

    /// `owner` must currently be allowed to reference every asset
    fn ensure_may_reference(&self, owner: &Principal, assets: &[NodeId]) -> Result<()> {
        for asset in assets {
            if !self.ref_auth(asset, owner)? {
                tracing::debug!("{} may not reference {}", owner, asset);
                return Err(RegistryError::NotAuthorized);
            }
        }
        Ok(())
    }
}
