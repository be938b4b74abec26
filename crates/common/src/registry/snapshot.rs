use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::auth::{ModuleId, Policy};
use super::error::{RegistryError, Result};
use super::ownership::MemoryOwnership;
use super::registry::Registry;
use super::store::NodeStore;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Everything needed to rebuild a [`Registry`] backed by
///  [`MemoryOwnership`]. Only stock [`Policy`] modules are captured;
///  a node pointing at any other module makes the snapshot unloadable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub store: NodeStore,
    pub ownership: MemoryOwnership,
    pub policies: BTreeMap<ModuleId, Policy>,
}

impl RegistrySnapshot {
    pub fn to_json(&self) -> std::result::Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Registry<MemoryOwnership> {
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            store: self.store.clone(),
            ownership: self.ownership.clone(),
            policies: self.policies.clone(),
        }
    }

    /// Rebuild a registry, checking that every module a node names was captured
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self> {
        let mut registry = Registry::new(snapshot.ownership);
        for (id, policy) in snapshot.policies {
            registry.install_policy(id, policy);
        }
        for node in snapshot.store.iter() {
            for module in [&node.access_module, &node.reference_module]
                .into_iter()
                .flatten()
            {
                if !registry.is_installed(module) {
                    return Err(RegistryError::integrity(format!(
                        "node {} names auth module {} which is not in the snapshot",
                        node.id, module
                    )));
                }
            }
        }
        if snapshot.store.iter().count() as u64 != snapshot.store.total_supply() {
            return Err(RegistryError::integrity("snapshot has gaps in its token sequence"));
        }
        registry.store = snapshot.store;
        Ok(registry)
    }
}
