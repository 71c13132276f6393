use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::{CacheError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EncodeConfig {
    pub prefix: String,
    pub length: usize,
    pub chunk_size: usize,
    pub line_width: usize,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ID_PREFIX.to_string(),
            length: DEFAULT_ID_LENGTH,
            chunk_size: DEFAULT_ENCODE_CHUNK_SIZE,
            line_width: DEFAULT_FASTA_LINE_WIDTH,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PrecomputedConfig {
    pub template: String,
    pub chunk_size: usize,
    pub line_width: usize,
}

impl Default for PrecomputedConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_PRECOMPUTED_TEMPLATE.to_string(),
            chunk_size: DEFAULT_PRECOMPUTED_CHUNK_SIZE,
            line_width: DEFAULT_FASTA_LINE_WIDTH,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DecodeConfig {
    pub template: String,
    pub chunk_size: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_DECODE_TEMPLATE.to_string(),
            chunk_size: DEFAULT_DECODE_CHUNK_SIZE,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TablesConfig {
    pub template: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TABLES_TEMPLATE.to_string(),
        }
    }
}

/// Run configuration. Every section is optional in the TOML file; missing
/// keys fall back to the defaults in [`crate::consts`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CacheConfig {
    pub encode: EncodeConfig,
    pub precomputed: PrecomputedConfig,
    pub decode: DecodeConfig,
    pub tables: TablesConfig,
}

impl CacheConfig {
    ///
    /// Resolve the configuration for a run.
    ///
    /// An explicit path wins over the `PREDCACHE_CONFIG` environment variable.
    /// With neither set, the defaults are returned.
    ///
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(PREDCACHE_CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => CacheConfig::try_from(path.as_path()),
            None => Ok(CacheConfig::default()),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.encode.length == 0 {
            return Err(CacheError::Config(
                "encode.length must be at least 1".to_string(),
            ));
        }
        let chunk_sizes = [
            self.encode.chunk_size,
            self.precomputed.chunk_size,
            self.decode.chunk_size,
        ];
        if chunk_sizes.contains(&0) {
            return Err(CacheError::Config(
                "chunk sizes must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

impl TryFrom<&Path> for CacheConfig {
    type Error = CacheError;

    fn try_from(path: &Path) -> Result<Self> {
        let toml_str = read_to_string(path)?;
        let config: CacheConfig = toml::from_str(&toml_str)
            .map_err(|e| CacheError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()
    }
}
