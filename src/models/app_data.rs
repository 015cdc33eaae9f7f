use super::number;
use super::quest::Quest;
use serde::{Deserialize, Serialize};

/// Schema version written into every persisted envelope.
///
/// Loading accepts only an exact match; there is no migration path.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Aggregate progress of the single user.
///
/// `level` is a cache of [`calculate_level`](crate::services::xp::calculate_level)
/// applied to `total_xp` and is recomputed whenever XP changes. It is never an
/// independent source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserState {
    #[serde(rename = "totalXP", deserialize_with = "number::whole")]
    pub total_xp: i64,

    #[serde(deserialize_with = "number::count")]
    pub level: u32,

    #[serde(rename = "completedQuestCount", deserialize_with = "number::count")]
    pub completed_quest_count: u32,

    #[serde(
        rename = "currentTheme",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_theme: Option<String>,
}

/// The persisted envelope.
///
/// User state and quests are always saved and loaded together as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub version: String,
    pub user: UserState,
    pub quests: Vec<Quest>,

    /// Unix timestamp in milliseconds, set only on exported envelopes
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "number::optional_whole"
    )]
    pub exported_at: Option<i64>,
}

impl AppData {
    /// The canonical empty envelope: current schema, zeroed user, no quests.
    pub fn initial() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            user: UserState::default(),
            quests: Vec::new(),
            exported_at: None,
        }
    }

    /// Build an envelope around the given state at the current schema version.
    pub fn from_parts(user: UserState, quests: Vec<Quest>) -> Self {
        Self {
            user,
            quests,
            ..Self::initial()
        }
    }
}

impl Default for AppData {
    fn default() -> Self {
        Self::initial()
    }
}
