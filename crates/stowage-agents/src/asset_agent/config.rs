// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-service settings, loadable from RON.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use stowage_core::CacheStrategy;
use stowage_data::{DynamicCache, NoCache};
use thiserror::Error;

/// One of the built-in cache strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Never cache.
    NoCache,
    /// Keep the first value fetched for each policy.
    #[default]
    Dynamic,
}

impl StrategyKind {
    /// Creates a fresh strategy of this kind.
    pub fn build(self) -> Arc<dyn CacheStrategy> {
        match self {
            Self::NoCache => Arc::new(NoCache::new()),
            Self::Dynamic => Arc::new(DynamicCache::new()),
        }
    }
}

/// Settings of an [`AssetManagementService`](super::AssetManagementService).
///
/// Missing fields take their default, so an empty RON struct `()` is a valid
/// configuration:
///
/// ```
/// use stowage_agents::{AssetServiceConfig, StrategyKind};
///
/// let config = AssetServiceConfig::from_ron_str("(auto_register_contexts: false)").unwrap();
/// assert!(!config.auto_register_contexts);
/// assert_eq!(config.instance_strategy, StrategyKind::NoCache);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetServiceConfig {
    /// Create contexts on first use instead of requiring
    /// `register_context` beforehand.
    pub auto_register_contexts: bool,
    /// Default strategy for loaded assets.
    pub asset_strategy: StrategyKind,
    /// Default strategy for instantiated objects.
    pub instance_strategy: StrategyKind,
}

impl Default for AssetServiceConfig {
    fn default() -> Self {
        Self {
            auto_register_contexts: true,
            asset_strategy: StrategyKind::Dynamic,
            instance_strategy: StrategyKind::NoCache,
        }
    }
}

impl AssetServiceConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::de::from_str(source)?)
    }

    /// Reads and parses a RON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Renders the configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// Why a configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read asset service config {path:?}")]
    Io {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not a valid configuration.
    #[error("invalid asset service config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration could not be rendered.
    #[error("failed to serialize asset service config: {0}")]
    Serialize(String),
}
