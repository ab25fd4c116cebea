//! Feature and training configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/beanlearn/config/features.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::{Feature, FeatureTable};
use crate::training::TrainingTarget;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/features.toml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Restrict training data to transactions posting to this account
    pub known_account: Option<String>,
    /// Label of exported training examples
    pub target: TrainingTarget,
    /// Feature table columns, in order
    pub features: Vec<Feature>,
    /// Expand transactions into one sample per posting
    pub per_posting: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            known_account: None,
            target: TrainingTarget::Account,
            features: Feature::all().to_vec(),
            per_posting: false,
        }
    }
}

impl FeatureConfig {
    /// Load from `path` if given, else from the override location, else the
    /// embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => read_config(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(default_path) => read_config(&default_path)?,
                None => DEFAULT_CONFIG.to_string(),
            },
        };
        parse_config(&content)
    }

    pub fn table(&self) -> FeatureTable {
        FeatureTable::new(self.features.clone())
    }

    /// Reference account for per-posting samples, if enabled
    pub fn per_posting_account(&self) -> Option<&str> {
        if self.per_posting {
            self.known_account.as_deref()
        } else {
            None
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("beanlearn").join("config").join("features.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Reading config from {}", path.display());
    fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config {}: {}", path.display(), e))
    })
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    training: Option<RawTraining>,
    features: Option<RawFeatures>,
}

#[derive(Debug, Deserialize)]
struct RawTraining {
    known_account: Option<String>,
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFeatures {
    columns: Option<Vec<String>>,
    per_posting: Option<bool>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<FeatureConfig> {
    let raw: RawConfig = toml::from_str(content)?;
    let mut config = FeatureConfig::default();

    if let Some(training) = raw.training {
        config.known_account = training.known_account.filter(|a| !a.is_empty());
        if let Some(target) = training.target {
            config.target = target.parse().map_err(Error::Config)?;
        }
    }

    if let Some(features) = raw.features {
        if let Some(columns) = features.columns {
            config.features = columns
                .iter()
                .map(|name| name.parse::<Feature>())
                .collect::<std::result::Result<_, _>>()
                .map_err(Error::Config)?;
        }
        if let Some(per_posting) = features.per_posting {
            config.per_posting = per_posting;
        }
    }

    if config.features.is_empty() {
        return Err(Error::Config("At least one feature column is required".into()));
    }

    Ok(config)
}
