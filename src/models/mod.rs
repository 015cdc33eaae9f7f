//! Data models for Questline.
//!
//! - [`Quest`] and [`Step`]: the user's goals and their sub-tasks
//! - [`UserState`]: aggregate XP, cached level and completed-quest count
//! - [`AppData`]: the envelope persisted as a single unit
//! - [`QuestlineConfig`]: application settings loaded by
//!   [`ConfigManager`](crate::config::ConfigManager)
//!
//! Persisted types derive `Serialize`/`Deserialize` with the JSON field names
//! of the storage format (`totalXP`, `createdAt`, `xpValue`, ...).

pub mod app_data;
pub mod config;
pub mod number;
pub mod quest;

pub use app_data::{AppData, SCHEMA_VERSION, UserState};
pub use config::{DEFAULT_STORAGE_QUOTA_BYTES, QuestlineConfig};
pub use quest::{
    MAIN_QUEST_XP, MAX_ACTIVE_MAIN_QUESTS, Quest, QuestPatch, QuestStatus, QuestType,
    SIDE_QUEST_XP, STEP_XP, Step, new_id,
};
