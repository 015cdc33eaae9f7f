use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default storage quota, matching the common browser local-storage limit.
pub const DEFAULT_STORAGE_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Settings from `Questline Config.yaml`, overridable by `QUESTLINE_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestlineConfig {
    /// Directory holding persisted envelopes
    pub data_dir: Utf8PathBuf,

    /// Maximum size of a single stored value; `None` disables the quota
    pub storage_quota_bytes: Option<u64>,

    pub log_dir: Utf8PathBuf,
    pub log_prefix: String,
    pub debug_mode: bool,
    pub console_logging: bool,
}

impl Default for QuestlineConfig {
    fn default() -> Self {
        Self {
            data_dir: Utf8PathBuf::from("Questline Data"),
            storage_quota_bytes: Some(DEFAULT_STORAGE_QUOTA_BYTES),
            log_dir: Utf8PathBuf::from("logs"),
            log_prefix: "questline".to_string(),
            debug_mode: false,
            console_logging: true,
        }
    }
}
