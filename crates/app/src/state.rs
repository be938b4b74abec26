use std::{fs, path::PathBuf};

use common::prelude::SecretKey;
use common::registry::{Registry, RegistryError, RegistrySnapshot, SnapshotError, MAX_BATCH_SIZE};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "canopy";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEY_FILE_NAME: &str = "key.pem";
pub const REGISTRY_FILE_NAME: &str = "registry.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default tracing directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Cap on nodes created by a single batch (never above the registry limit)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_max_batch_size() -> usize {
    MAX_BATCH_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the canopy directory (~/.canopy)
    pub canopy_dir: PathBuf,
    /// Path to the operator key PEM file
    pub key_path: PathBuf,
    /// Path to the registry snapshot
    pub registry_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the canopy directory path (custom or default ~/.canopy)
    pub fn canopy_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new canopy state directory with a fresh key and empty registry
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let canopy_dir = Self::canopy_dir(custom_path)?;

        if canopy_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&canopy_dir)?;

        let key = SecretKey::generate();
        let key_path = canopy_dir.join(KEY_FILE_NAME);
        fs::write(&key_path, key.to_pem())?;

        let config = config.unwrap_or_default();
        let config_path = canopy_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        let state = Self {
            registry_path: canopy_dir.join(REGISTRY_FILE_NAME),
            canopy_dir,
            key_path,
            config_path,
            config,
        };
        state.save_registry(&Registry::default())?;

        Ok(state)
    }

    /// Load existing state from the canopy directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let canopy_dir = Self::canopy_dir(custom_path)?;

        if !canopy_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let key_path = canopy_dir.join(KEY_FILE_NAME);
        let registry_path = canopy_dir.join(REGISTRY_FILE_NAME);
        let config_path = canopy_dir.join(CONFIG_FILE_NAME);

        for (path, name) in [
            (&key_path, KEY_FILE_NAME),
            (&registry_path, REGISTRY_FILE_NAME),
            (&config_path, CONFIG_FILE_NAME),
        ] {
            if !path.exists() {
                return Err(StateError::MissingFile(name.to_string()));
            }
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            canopy_dir,
            key_path,
            registry_path,
            config_path,
            config,
        })
    }

    /// Load the operator's secret key from the key file
    pub fn load_key(&self) -> Result<SecretKey, StateError> {
        let pem = fs::read_to_string(&self.key_path)?;
        let key = SecretKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))?;
        Ok(key)
    }

    /// Rebuild the registry from its snapshot, applying the configured batch cap
    pub fn load_registry(&self) -> Result<Registry, StateError> {
        let json = fs::read_to_string(&self.registry_path)?;
        let snapshot = RegistrySnapshot::from_json(&json)?;
        let registry =
            Registry::from_snapshot(snapshot)?.with_max_batch_size(self.config.max_batch_size);
        tracing::debug!(
            "loaded registry with {} nodes from {}",
            registry.total_supply(),
            self.registry_path.display()
        );
        Ok(registry)
    }

    /// Persist the registry, replacing the previous snapshot in one rename
    pub fn save_registry(&self, registry: &Registry) -> Result<(), StateError> {
        let json = registry.snapshot().to_json()?;
        let tmp = self.registry_path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.registry_path)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("canopy directory not initialized. Run 'canopy init' first")]
    NotInitialized,

    #[error("canopy directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
