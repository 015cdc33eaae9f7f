use super::number;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// XP awarded for completing a single step.
pub const STEP_XP: i64 = 10;

/// XP awarded for completing a side quest.
pub const SIDE_QUEST_XP: i64 = 50;

/// XP awarded for completing a main quest.
pub const MAIN_QUEST_XP: i64 = 200;

/// Fresh identifier for a quest or step.
///
/// Stored ids are opaque strings; new ones are UUID v4.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Maximum number of main quests that may be active at the same time.
///
/// Only enforced when a quest is created. See
/// [`QuestStore::add_quest`](crate::state::QuestStore::add_quest).
pub const MAX_ACTIVE_MAIN_QUESTS: usize = 3;

/// Kind of quest. Determines the XP awarded on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Main,
    Side,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestType::Main => "main",
            QuestType::Side => "side",
        }
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl QuestStatus {
    pub const ALL: [QuestStatus; 4] = [
        QuestStatus::Active,
        QuestStatus::Paused,
        QuestStatus::Completed,
        QuestStatus::Abandoned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestStatus::Active => "active",
            QuestStatus::Paused => "paused",
            QuestStatus::Completed => "completed",
            QuestStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sub-task of a quest.
///
/// Steps are owned by their parent [`Quest`] and never shared between quests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub title: String,
    pub completed: bool,

    /// Unix timestamp in milliseconds, present only while `completed` is true
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "number::optional_whole"
    )]
    pub completed_at: Option<i64>,

    #[serde(deserialize_with = "number::whole")]
    pub xp_value: i64,
}

impl Step {
    /// Create an incomplete step with a fresh identity.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            completed: false,
            completed_at: None,
            xp_value: crate::services::xp::step_xp_value(),
        }
    }
}

/// A user-defined goal made of ordered steps.
///
/// `xp_value` is fixed when the quest is created and is never recomputed,
/// even if the quest type is later edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,

    #[serde(rename = "type")]
    pub quest_type: QuestType,

    pub status: QuestStatus,

    // Unix timestamps in milliseconds
    #[serde(deserialize_with = "number::whole")]
    pub created_at: i64,
    #[serde(deserialize_with = "number::whole")]
    pub updated_at: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "number::optional_whole"
    )]
    pub completed_at: Option<i64>,

    pub steps: Vec<Step>,

    /// Free-form reward text chosen by the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<String>,

    #[serde(deserialize_with = "number::whole")]
    pub xp_value: i64,
}

impl Quest {
    /// Whether this quest counts against [`MAX_ACTIVE_MAIN_QUESTS`].
    pub fn is_active_main(&self) -> bool {
        self.quest_type == QuestType::Main && self.status == QuestStatus::Active
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Number of completed steps, for progress displays.
    pub fn completed_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }
}

/// Partial update for [`QuestStore::update_quest`](crate::state::QuestStore::update_quest).
///
/// Every `Some` field overwrites the quest's value. For optional quest fields
/// the inner `Option` is the new value, so `Some(None)` clears it. `id` and
/// `created_at` cannot be patched and `updated_at` is always bumped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub quest_type: Option<QuestType>,
    pub status: Option<QuestStatus>,
    pub completed_at: Option<Option<i64>>,
    pub steps: Option<Vec<Step>>,
    pub reward: Option<Option<String>>,
    pub xp_value: Option<i64>,
}

impl QuestPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn quest_type(mut self, quest_type: QuestType) -> Self {
        self.quest_type = Some(quest_type);
        self
    }

    pub fn status(mut self, status: QuestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn reward(mut self, reward: Option<String>) -> Self {
        self.reward = Some(reward);
        self
    }

    /// Merge this patch into `quest`.
    pub fn apply_to(self, quest: &mut Quest) {
        if let Some(title) = self.title {
            quest.title = title;
        }
        if let Some(description) = self.description {
            quest.description = description;
        }
        if let Some(quest_type) = self.quest_type {
            quest.quest_type = quest_type;
        }
        if let Some(status) = self.status {
            quest.status = status;
        }
        if let Some(completed_at) = self.completed_at {
            quest.completed_at = completed_at;
        }
        if let Some(steps) = self.steps {
            quest.steps = steps;
        }
        if let Some(reward) = self.reward {
            quest.reward = reward;
        }
        if let Some(xp_value) = self.xp_value {
            quest.xp_value = xp_value;
        }
    }
}
