//! Pool configuration.
//!
//! Handles loading configuration from:
//! 1. MIXER_CONFIG env var (explicit path)
//! 2. ./mixer.toml (current directory)
//! 3. Built-in defaults
//!
//! `MIXER_TREE_HEIGHT` and `MIXER_CACHE_DIR` override the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

use mixer_notes::note::DEFAULT_TAG;
use mixer_notes::{Address, EventCache, NoteCodec};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::prove::{CircuitArtifacts, ProveError};

const CONFIG_FILE_NAME: &str = "mixer.toml";

const DEFAULT_TREE_HEIGHT: usize = 20;
const DEFAULT_CANONICAL_NETWORK: u64 = 1;
const DEFAULT_CACHE_DIR: &str = "./cache";
const DEFAULT_ARTIFACTS_DIR: &str = "./build/circuits";
const DEFAULT_NATIVE_CURRENCY: &str = "eth";
const DEFAULT_DECIMALS: u32 = 18;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value `{value}` for {key}")]
    InvalidOverride { key: &'static str, value: String },
    #[error("There is no {currency} {amount} instance on network {network_id}")]
    MissingDeployment {
        network_id: u64,
        currency: String,
        amount: String,
    },
}

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerConfig {
    /// Note scheme tag
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_tree_height")]
    pub merkle_tree_height: usize,
    /// The only network whose event cache is trusted
    #[serde(default = "default_canonical_network")]
    pub canonical_network_id: u64,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    /// Currency for which a withdrawal refund makes no sense
    #[serde(default = "default_native_currency")]
    pub native_currency: String,
    /// Keyed by network id
    #[serde(default)]
    pub deployments: BTreeMap<String, NetworkDeployment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDeployment {
    pub proxy: Address,
    #[serde(default)]
    pub currencies: BTreeMap<String, CurrencyDeployment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyDeployment {
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Pool contract per denomination
    #[serde(default)]
    pub instances: BTreeMap<String, Address>,
}

/// A single resolved pool contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDeployment {
    pub network_id: u64,
    pub currency: String,
    pub amount: String,
    pub decimals: u32,
    pub proxy: Address,
    pub instance: Address,
}

fn default_tag() -> String {
    DEFAULT_TAG.into()
}

fn default_tree_height() -> usize {
    DEFAULT_TREE_HEIGHT
}

fn default_canonical_network() -> u64 {
    DEFAULT_CANONICAL_NETWORK
}

fn default_cache_dir() -> PathBuf {
    DEFAULT_CACHE_DIR.into()
}

fn default_artifacts_dir() -> PathBuf {
    DEFAULT_ARTIFACTS_DIR.into()
}

fn default_native_currency() -> String {
    DEFAULT_NATIVE_CURRENCY.into()
}

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            merkle_tree_height: DEFAULT_TREE_HEIGHT,
            canonical_network_id: DEFAULT_CANONICAL_NETWORK,
            cache_dir: default_cache_dir(),
            artifacts_dir: default_artifacts_dir(),
            native_currency: default_native_currency(),
            deployments: BTreeMap::new(),
        }
    }
}

impl MixerConfig {
    /// Load configuration from the default locations, then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                info!("Loading config from: {}", path.display());
                Self::read(&path)?
            }
            None => {
                info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    fn find_config_file() -> Option<PathBuf> {
        if let Ok(path) = env::var("MIXER_CONFIG") {
            return Some(PathBuf::from(path));
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        local.exists().then_some(local)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MIXER_TREE_HEIGHT") {
            self.merkle_tree_height =
                value.parse().map_err(|_| ConfigError::InvalidOverride {
                    key: "MIXER_TREE_HEIGHT",
                    value,
                })?;
        }
        if let Some(value) = lookup("MIXER_CACHE_DIR") {
            self.cache_dir = value.into();
        }
        Ok(())
    }

    /// Resolve the pool contract for `(network, currency, amount)`.
    pub fn instance(
        &self,
        network_id: u64,
        currency: &str,
        amount: &str,
    ) -> Result<InstanceDeployment, ConfigError> {
        let missing = || ConfigError::MissingDeployment {
            network_id,
            currency: currency.to_string(),
            amount: amount.to_string(),
        };

        let network = self
            .deployments
            .get(&network_id.to_string())
            .ok_or_else(missing)?;
        let currency_deployment = network
            .currencies
            .get(&currency.to_lowercase())
            .ok_or_else(missing)?;
        let instance = currency_deployment
            .instances
            .get(amount)
            .copied()
            .ok_or_else(missing)?;

        Ok(InstanceDeployment {
            network_id,
            currency: currency.to_lowercase(),
            amount: amount.to_string(),
            decimals: currency_deployment.decimals,
            proxy: network.proxy,
            instance,
        })
    }

    pub fn event_cache(&self) -> EventCache {
        EventCache::new(self.cache_dir.clone(), self.canonical_network_id)
    }

    pub fn note_codec(&self) -> NoteCodec {
        NoteCodec::new(self.tag.clone())
    }

    /// Withdrawal circuit and proving key from `artifacts_dir`.
    pub fn circuit_artifacts(&self) -> Result<CircuitArtifacts, ProveError> {
        CircuitArtifacts::load_from_directory(&self.artifacts_dir)
    }
}
