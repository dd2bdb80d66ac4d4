use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default minimum capacity of the read cache buffer (4 MiB).
pub const DEFAULT_MIN_BUF_SIZE: usize = 4 * 1024 * 1024;

/// Default bound on the number of indexed archive entries.
pub const DEFAULT_MAX_ENTRIES: usize = 65535;

/// Tunables for a zipfs mount, fixed at startup.
///
/// Can be loaded from TOML:
///
/// ```toml
/// min_buf_size = 1048576
/// max_entries = 100000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZipFsConfig {
    /// Minimum capacity, in bytes, of the buffer holding a decompressed entry.
    pub min_buf_size: usize,
    /// Maximum number of archive entries indexed by the catalog.
    pub max_entries: usize,
}

impl Default for ZipFsConfig {
    fn default() -> Self {
        Self {
            min_buf_size: DEFAULT_MIN_BUF_SIZE,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl ZipFsConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Override the minimum buffer size.
    pub fn with_min_buf_size(mut self, min_buf_size: usize) -> Self {
        self.min_buf_size = min_buf_size;
        self
    }

    /// Override the catalog bound.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(Error::Config("max_entries must be at least 1".to_string()));
        }
        Ok(())
    }
}
