use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::tags::DEFAULT_TAG_KEY;
use crate::walker::TagErrorMode;

/// File looked up next to the Go sources when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "accessor.toml";

/// Configuration stored in accessor.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessorConfig {
    #[serde(default)]
    pub generator: GeneratorSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Struct tag key holding the access tokens
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Appended to the lowercased type name to form the output file name
    #[serde(default = "default_suffix")]
    pub suffix: String,
    #[serde(default)]
    pub on_bad_tag: TagErrorMode,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            suffix: default_suffix(),
            on_bad_tag: TagErrorMode::default(),
        }
    }
}

fn default_tag() -> String {
    DEFAULT_TAG_KEY.to_string()
}

fn default_suffix() -> String {
    "_accessor".to_string()
}

impl AccessorConfig {
    /// Load configuration from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `accessor.toml` from `dir` if it exists.
    pub fn discover(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path: PathBuf = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }
}
