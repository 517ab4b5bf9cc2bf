//! Filesystem-backed persistence for the BI pack configuration.
//!
//! The configuration is read and written as a whole (no incremental
//! diffing). Next to it lives a side-channel counter file holding the
//! number of enabled aggregations, so callers can read that number without
//! parsing the full configuration.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use mirador_core::{BiError, PacksConfig};

/// Errors produced by [`ConfigStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StoreError> for BiError {
    fn from(err: StoreError) -> Self {
        BiError::Store(err.to_string())
    }
}

const CONFIG_FILE: &str = "bi_config.json";
const NUM_ENABLED_AGGREGATIONS_FILE: &str = "num_enabled_aggregations";

/// Whole-file persistence of the pack collection.
///
/// Manages the BI data directory:
/// ```text
/// <var_dir>/
///   bi_config.json              <- the full nested pack configuration
///   num_enabled_aggregations    <- plain integer, enabled aggregation count
/// ```
pub struct ConfigStore {
    base_dir: PathBuf,
}

impl ConfigStore {
    /// Create a new ConfigStore, ensuring the base directory exists.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Base path for this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    fn counter_path(&self) -> PathBuf {
        self.base_dir.join(NUM_ENABLED_AGGREGATIONS_FILE)
    }

    /// Whether a configuration has been persisted yet.
    pub fn config_exists(&self) -> bool {
        self.config_path().exists()
    }

    /// Load the persisted configuration, `None` if none exists yet.
    pub fn load(&self) -> Result<Option<PacksConfig>, StoreError> {
        let path = self.config_path();
        if !path.exists() {
            debug!("no BI configuration at {}", path.display());
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(Some(config))
    }

    /// Persist the configuration, replacing any previous one.
    pub fn save(&self, config: &PacksConfig) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(self.config_path(), json)?;
        info!("BI configuration saved ({} packs)", config.packs.len());
        Ok(())
    }

    /// Persist the enabled-aggregation count to its side-channel file.
    pub fn save_num_enabled_aggregations(&self, count: usize) -> Result<(), StoreError> {
        std::fs::write(self.counter_path(), count.to_string())?;
        Ok(())
    }

    /// Read back the enabled-aggregation count.
    ///
    /// A missing or unparseable counter file is treated as 0.
    pub fn load_num_enabled_aggregations(&self) -> usize {
        match std::fs::read_to_string(self.counter_path()) {
            Ok(text) => text.trim().parse().unwrap_or_else(|_| {
                warn!("unreadable aggregation counter, treating as 0");
                0
            }),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
