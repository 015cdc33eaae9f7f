//! Persistence of the [`AppData`] envelope.
//!
//! [`Persistence`] wraps an optional [`StorageBackend`]. When no backend is
//! available (for example when the host has no writable data directory) every
//! operation degrades to a no-op: `load` returns `None`, `save` returns
//! `false`. None of the operations return errors or panic; failures are
//! logged and reported as absent data or a `false` flag.
//!
//! Loading runs the raw blob through three gates, in order:
//! 1. JSON parsing
//! 2. structural validation ([`is_valid_app_data`])
//! 3. exact schema version match ([`is_compatible_version`])
//!
//! Anything that fails a gate is treated as if nothing was stored.

pub mod backend;

pub use backend::{FileStorage, MemoryStorage, StorageBackend, StorageError};

use crate::metrics::Metrics;
use crate::models::AppData;
use crate::services::validation::{is_compatible_version, is_valid_app_data};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Key under which the envelope is stored.
pub const STORAGE_KEY: &str = "questline_data";

/// Why a stored envelope could not be used
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to parse stored data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid data structure in storage")]
    InvalidStructure,

    #[error("Incompatible schema version: {0}")]
    IncompatibleVersion(String),
}

impl LoadError {
    /// Rejections caused by the data itself rather than by I/O or syntax.
    pub fn is_rejection(&self) -> bool {
        matches!(self, LoadError::InvalidStructure | LoadError::IncompatibleVersion(_))
    }
}

/// The canonical empty envelope.
pub fn initial_app_data() -> AppData {
    AppData::initial()
}

/// Parse and validate a serialized envelope.
pub fn decode_app_data(raw: &str) -> Result<AppData, LoadError> {
    let value: Value = serde_json::from_str(raw)?;

    if !is_valid_app_data(&value) {
        return Err(LoadError::InvalidStructure);
    }

    let data: AppData = serde_json::from_value(value).map_err(|e| {
        tracing::debug!("Structurally valid data failed typed decoding: {}", e);
        LoadError::InvalidStructure
    })?;

    if !is_compatible_version(&data.version) {
        return Err(LoadError::IncompatibleVersion(data.version));
    }

    Ok(data)
}

pub fn encode_app_data(data: &AppData) -> Result<String, serde_json::Error> {
    serde_json::to_string(data)
}

/// Load/save/clear adapter over a key-value backend.
///
/// Cloning is cheap; clones share the backend and the metrics.
#[derive(Clone)]
pub struct Persistence {
    backend: Option<Arc<dyn StorageBackend>>,
    metrics: Arc<Metrics>,
}

impl Persistence {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend: Some(backend),
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Adapter for environments without persistent storage.
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Load the stored envelope, or `None` if it is absent or unusable.
    pub fn load(&self) -> Option<AppData> {
        let Some(backend) = &self.backend else {
            tracing::debug!("No storage backend available, nothing to load");
            return None;
        };

        self.metrics.record_load();

        match Self::read(backend.as_ref()) {
            Ok(Some(data)) => {
                tracing::info!(
                    "Loaded app data: {} quests, {} XP",
                    data.quests.len(),
                    data.user.total_xp
                );
                Some(data)
            }
            Ok(None) => {
                tracing::debug!("No stored data under key {}", STORAGE_KEY);
                None
            }
            Err(e) if e.is_rejection() => {
                self.metrics.record_load_rejected();
                tracing::warn!("Discarding stored data: {}", e);
                None
            }
            Err(e) => {
                self.metrics.record_load_rejected();
                tracing::error!("Error loading from storage: {}", e);
                None
            }
        }
    }

    fn read(backend: &dyn StorageBackend) -> Result<Option<AppData>, LoadError> {
        match backend.get_item(STORAGE_KEY)? {
            Some(raw) if !raw.is_empty() => decode_app_data(&raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Write the envelope. Returns `false` on any failure.
    pub fn save(&self, data: &AppData) -> bool {
        let Some(backend) = &self.backend else {
            tracing::debug!("No storage backend available, skipping save");
            return false;
        };

        let json = match encode_app_data(data) {
            Ok(json) => json,
            Err(e) => {
                self.metrics.record_save(false);
                tracing::error!("Error serializing app data: {}", e);
                return false;
            }
        };

        match backend.set_item(STORAGE_KEY, &json) {
            Ok(()) => {
                self.metrics.record_save(true);
                tracing::debug!("Saved {} bytes under key {}", json.len(), STORAGE_KEY);
                true
            }
            Err(e) => {
                self.metrics.record_save(false);
                tracing::error!("Error saving to storage: {}", e);
                if matches!(e, StorageError::QuotaExceeded { .. }) {
                    tracing::error!("Storage quota exceeded!");
                }
                false
            }
        }
    }

    /// Remove the stored envelope. Errors are logged and swallowed.
    pub fn clear(&self) {
        let Some(backend) = &self.backend else {
            return;
        };

        match backend.remove_item(STORAGE_KEY) {
            Ok(()) => tracing::info!("Cleared stored data under key {}", STORAGE_KEY),
            Err(e) => tracing::error!("Error clearing storage: {}", e),
        }
    }
}
