// Questline - quest, step and XP state management
//
// This is the library crate containing the stores, business rules and
// persistence. The binary crate (main.rs) is a headless host for them.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

// Re-export commonly used types for convenience
pub use crate::config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AppData, Quest, QuestPatch, QuestStatus, QuestType, QuestlineConfig, Step, UserState};
pub use state::{QuestStore, QuestViews, StateChange, UserStore};
pub use storage::{FileStorage, MemoryStorage, Persistence, StorageBackend};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
