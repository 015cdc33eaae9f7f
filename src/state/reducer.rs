//! Pure quest list transitions.
//!
//! [`apply`] turns the current quest list and a [`QuestCommand`] into the next
//! list plus the [`UserEffect`]s the change implies. It performs no I/O and
//! touches no shared state; the [`QuestStore`](super::QuestStore) commits the
//! result, applies the effects and persists.
//!
//! XP reversal is deliberately asymmetric:
//! - un-completing or deleting a completed **step** takes its XP back
//! - un-completing or deleting a completed **quest** keeps its XP and count
//!
//! Commands that name an unknown quest or step leave the list unchanged but
//! still count as committed, so the store persists after them.

use super::views::active_main_count;
use crate::models::{
    MAX_ACTIVE_MAIN_QUESTS, Quest, QuestPatch, QuestStatus, QuestType, Step, new_id,
};
use crate::services::xp::quest_xp_value;
use thiserror::Error;

/// A mutation request against the quest list
#[derive(Debug, Clone, PartialEq)]
pub enum QuestCommand {
    AddQuest {
        title: String,
        description: String,
        quest_type: QuestType,
        reward: Option<String>,
        initial_steps: Vec<String>,
    },
    UpdateStatus {
        quest_id: String,
        status: QuestStatus,
    },
    UpdateQuest {
        quest_id: String,
        patch: QuestPatch,
    },
    DeleteQuest {
        quest_id: String,
    },
    AddStep {
        quest_id: String,
        title: String,
    },
    ToggleStep {
        quest_id: String,
        step_id: String,
    },
    UpdateStep {
        quest_id: String,
        step_id: String,
        title: String,
    },
    DeleteStep {
        quest_id: String,
        step_id: String,
    },
    Clear,
}

/// Side effect on user state implied by a quest transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEffect {
    /// Add (or, when negative, remove) XP
    AwardXp(i64),
    IncrementQuestCount,
}

/// A command refused by a business rule. Nothing is mutated or persisted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("Maximum active Main Quests reached ({limit})")]
    MainQuestLimitReached { limit: usize },
}

/// Result of a successful [`apply`]
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub quests: Vec<Quest>,
    pub effects: Vec<UserEffect>,
    /// The quest built by [`QuestCommand::AddQuest`]
    pub created: Option<Quest>,
}

/// Compute the next quest list. `now` is a Unix timestamp in milliseconds.
pub fn apply(quests: &[Quest], command: QuestCommand, now: i64) -> Result<Transition, Rejection> {
    let mut next = quests.to_vec();
    let mut effects = Vec::new();
    let mut created = None;

    match command {
        QuestCommand::AddQuest {
            title,
            description,
            quest_type,
            reward,
            initial_steps,
        } => {
            if quest_type == QuestType::Main && active_main_count(&next) >= MAX_ACTIVE_MAIN_QUESTS {
                return Err(Rejection::MainQuestLimitReached {
                    limit: MAX_ACTIVE_MAIN_QUESTS,
                });
            }

            let quest = Quest {
                id: new_id(),
                title,
                description,
                quest_type,
                status: QuestStatus::Active,
                created_at: now,
                updated_at: now,
                completed_at: None,
                steps: initial_steps.into_iter().map(Step::new).collect(),
                reward,
                xp_value: quest_xp_value(quest_type),
            };
            next.push(quest.clone());
            created = Some(quest);
        }

        QuestCommand::UpdateStatus { quest_id, status } => {
            for quest in matching(&mut next, &quest_id) {
                let was_completed = quest.status == QuestStatus::Completed;

                quest.status = status;
                quest.updated_at = now;

                if status == QuestStatus::Completed {
                    quest.completed_at = Some(now);
                    if !was_completed {
                        effects.push(UserEffect::AwardXp(quest.xp_value));
                        effects.push(UserEffect::IncrementQuestCount);
                    }
                }
            }
        }

        QuestCommand::UpdateQuest { quest_id, patch } => {
            for quest in matching(&mut next, &quest_id) {
                patch.clone().apply_to(quest);
                quest.updated_at = now;
            }
        }

        QuestCommand::DeleteQuest { quest_id } => {
            next.retain(|q| q.id != quest_id);
        }

        QuestCommand::AddStep { quest_id, title } => {
            for quest in matching(&mut next, &quest_id) {
                quest.steps.push(Step::new(title.clone()));
                quest.updated_at = now;
            }
        }

        QuestCommand::ToggleStep { quest_id, step_id } => {
            for quest in matching(&mut next, &quest_id) {
                for step in quest.steps.iter_mut().filter(|s| s.id == step_id) {
                    step.completed = !step.completed;
                    if step.completed {
                        step.completed_at = Some(now);
                        effects.push(UserEffect::AwardXp(step.xp_value));
                    } else {
                        step.completed_at = None;
                        let delta = step.xp_value.saturating_neg();
                        effects.push(UserEffect::AwardXp(delta));
                    }
                }
                quest.updated_at = now;
            }
        }

        QuestCommand::UpdateStep {
            quest_id,
            step_id,
            title,
        } => {
            for quest in matching(&mut next, &quest_id) {
                for step in quest.steps.iter_mut().filter(|s| s.id == step_id) {
                    step.title = title.clone();
                }
                quest.updated_at = now;
            }
        }

        QuestCommand::DeleteStep { quest_id, step_id } => {
            for quest in matching(&mut next, &quest_id) {
                if let Some(step) = quest.step(&step_id).filter(|s| s.completed) {
                    effects.push(UserEffect::AwardXp(step.xp_value.saturating_neg()));
                }
                quest.steps.retain(|s| s.id != step_id);
                quest.updated_at = now;
            }
        }

        QuestCommand::Clear => next.clear(),
    }

    Ok(Transition {
        quests: next,
        effects,
        created,
    })
}

fn matching<'a>(
    quests: &'a mut [Quest],
    quest_id: &'a str,
) -> impl Iterator<Item = &'a mut Quest> {
    quests.iter_mut().filter(move |q| q.id == quest_id)
}
