//! Optional `xtrace.toml` configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use xtrace_instrument::{DEFAULT_SENTINEL, InstrumentError, MarkerFormat};
use xtrace_map::MapperOptions;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "xtrace.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid marker settings in {path}: {source}")]
    Marker {
        path: PathBuf,
        #[source]
        source: InstrumentError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub marker: MarkerSettings,
    pub mapper: MapperSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerSettings {
    pub sentinel: String,
}

impl Default for MarkerSettings {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperSettings {
    /// Replaces the built-in root list when present.
    pub root_elements: Option<Vec<String>>,
    /// Merged over the built-in rule table.
    pub rule_targets: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// Load `explicit` if given, else `xtrace.toml` in `cwd` when it exists,
    /// else defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let candidate = cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::load_from(&candidate)
                } else {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        // Surface sentinel problems with the file name attached.
        MarkerFormat::new(config.marker.sentinel.clone()).map_err(|source| {
            ConfigError::Marker {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn marker_format(&self) -> Result<MarkerFormat, InstrumentError> {
        MarkerFormat::new(self.marker.sentinel.clone())
    }

    pub fn mapper_options(&self) -> MapperOptions {
        let options = MapperOptions::default().with_rule_targets(self.mapper.rule_targets.clone());
        match &self.mapper.root_elements {
            Some(roots) => options.with_root_elements(roots.clone()),
            None => options,
        }
    }
}
