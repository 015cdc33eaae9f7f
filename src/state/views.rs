//! Read-only projections of the quest list.
//!
//! These never mutate or persist. [`QuestStore::views`](super::QuestStore::views)
//! computes them from the committed list on each call.

use crate::models::{MAX_ACTIVE_MAIN_QUESTS, Quest, QuestStatus, QuestType};

fn filtered(quests: &[Quest], predicate: impl Fn(&Quest) -> bool) -> Vec<Quest> {
    quests.iter().filter(|&q| predicate(q)).cloned().collect()
}

pub fn active_main_quests(quests: &[Quest]) -> Vec<Quest> {
    filtered(quests, Quest::is_active_main)
}

pub fn active_side_quests(quests: &[Quest]) -> Vec<Quest> {
    filtered(quests, |q| {
        q.quest_type == QuestType::Side && q.status == QuestStatus::Active
    })
}

pub fn paused_quests(quests: &[Quest]) -> Vec<Quest> {
    filtered(quests, |q| q.status == QuestStatus::Paused)
}

pub fn completed_quests(quests: &[Quest]) -> Vec<Quest> {
    filtered(quests, |q| q.status == QuestStatus::Completed)
}

pub fn abandoned_quests(quests: &[Quest]) -> Vec<Quest> {
    filtered(quests, |q| q.status == QuestStatus::Abandoned)
}

pub fn active_main_count(quests: &[Quest]) -> usize {
    quests.iter().filter(|q| q.is_active_main()).count()
}

/// Whether another main quest may be created right now.
pub fn can_add_main_quest(quests: &[Quest]) -> bool {
    active_main_count(quests) < MAX_ACTIVE_MAIN_QUESTS
}

/// All derived views of one quest list, computed together.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestViews {
    pub active_main: Vec<Quest>,
    pub active_side: Vec<Quest>,
    pub paused: Vec<Quest>,
    pub completed: Vec<Quest>,
    pub abandoned: Vec<Quest>,
    pub can_add_main_quest: bool,
}

impl QuestViews {
    pub fn from_quests(quests: &[Quest]) -> Self {
        let active_main = active_main_quests(quests);
        let can_add_main_quest = active_main.len() < MAX_ACTIVE_MAIN_QUESTS;

        Self {
            active_main,
            active_side: active_side_quests(quests),
            paused: paused_quests(quests),
            completed: completed_quests(quests),
            abandoned: abandoned_quests(quests),
            can_add_main_quest,
        }
    }
}
