// State management module
//
// Observable stores for user progress and the quest list. Each store wraps its
// state in Arc<RwLock<T>> and emits change events on a broadcast channel.

pub mod quests;
pub mod reducer;
pub mod user;
pub mod views;

pub use quests::QuestStore;
pub use reducer::{QuestCommand, Rejection, Transition, UserEffect};
pub use user::UserStore;
pub use views::QuestViews;

use crate::models::{QuestStatus, QuestType};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Buffer size of each store's broadcast channel
pub const CHANGE_CHANNEL_CAPACITY: usize = 100;

/// Change events emitted when store state is modified
///
/// Quest events are sent on the [`QuestStore`] channel, user events on the
/// [`UserStore`] channel. Events are only sent after the change is committed,
/// so a subscriber reading the store on receipt always sees the new state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A quest was appended to the list
    QuestAdded {
        quest_id: String,
        quest_type: QuestType,
    },

    /// A quest or one of its steps changed
    QuestUpdated {
        quest_id: String,
        status: QuestStatus,
    },

    /// A quest was removed from the list
    QuestRemoved { quest_id: String },

    /// The whole list was replaced (initial load or import)
    QuestsReplaced { count: usize },

    /// The active main quest limit was reached or freed up
    MainQuestCapacityChanged { can_add_main_quest: bool },

    /// Total XP changed by `delta`
    XpChanged { total_xp: i64, delta: i64 },

    LevelChanged { old_level: u32, new_level: u32 },

    QuestCountChanged { completed_quest_count: u32 },

    ThemeChanged { theme: Option<String> },

    /// User state was reset to its defaults
    UserReset,
}

/// Current time as Unix milliseconds, the timestamp format of the stored data.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// Mutations swap in fully built values, so a poisoned lock still guards
// consistent state and is recovered rather than propagated.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
