use super::reducer::{self, QuestCommand, Rejection, UserEffect};
use super::user::UserStore;
use super::views::{self, QuestViews};
use super::{CHANGE_CHANNEL_CAPACITY, StateChange, now_millis, read_lock, write_lock};
use crate::metrics::Metrics;
use crate::models::{AppData, MAX_ACTIVE_MAIN_QUESTS, Quest, QuestPatch, QuestStatus, QuestType};
use crate::services::validation::is_compatible_version;
use crate::storage::{LoadError, Persistence};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Observable container for the quest list.
///
/// The store owns all quest and step mutations. Each operation:
/// 1. computes the next list with [`reducer::apply`]
/// 2. commits it and applies the resulting [`UserEffect`]s to the [`UserStore`]
/// 3. writes the whole envelope (user state + quests) through [`Persistence`]
/// 4. emits [`StateChange`] events
///
/// A failed save is logged and counted but does not roll back the in-memory
/// change; the next successful mutation writes the full state again.
///
/// # Usage
///
/// ```ignore
/// let user = UserStore::new();
/// let quests = QuestStore::new(user.clone(), Persistence::new(storage));
/// quests.init();
///
/// let quest = quests
///     .add_quest("Clean kitchen", "", QuestType::Side, None, Vec::new())
///     .expect("side quests are never limited");
/// quests.update_quest_status(&quest.id, QuestStatus::Completed);
/// assert_eq!(user.snapshot().total_xp, 50);
/// ```
#[derive(Clone)]
pub struct QuestStore {
    quests: Arc<RwLock<Vec<Quest>>>,
    user: UserStore,
    persistence: Persistence,
    metrics: Arc<Metrics>,
    state_tx: broadcast::Sender<StateChange>,
}

impl QuestStore {
    /// Create an empty store bound to a user store and a persistence adapter.
    pub fn new(user: UserStore, persistence: Persistence) -> Self {
        let (state_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            quests: Arc::new(RwLock::new(Vec::new())),
            user,
            metrics: persistence.metrics(),
            persistence,
            state_tx,
        }
    }

    pub fn user(&self) -> &UserStore {
        &self.user
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    pub fn snapshot(&self) -> Vec<Quest> {
        read_lock(&self.quests).clone()
    }

    /// Execute a function with read access to the quest list
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Quest]) -> R,
    {
        f(&read_lock(&self.quests))
    }

    pub fn quest(&self, quest_id: &str) -> Option<Quest> {
        self.read(|quests| quests.iter().find(|q| q.id == quest_id).cloned())
    }

    /// Derived views of the committed list.
    pub fn views(&self) -> QuestViews {
        self.read(QuestViews::from_quests)
    }

    pub fn can_add_main_quest(&self) -> bool {
        self.read(views::can_add_main_quest)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    /// Load stored data into the quest and user stores.
    ///
    /// Returns `true` if stored data was used. Otherwise the quest list is
    /// emptied and the user state is left as it is.
    pub fn init(&self) -> bool {
        match self.persistence.load() {
            Some(data) => {
                self.replace_all(data.quests);
                self.user.set(data.user);
                true
            }
            None => {
                self.replace_all(Vec::new());
                false
            }
        }
    }

    /// Create a new active quest.
    ///
    /// Returns `None` without mutating or saving anything when `quest_type` is
    /// [`QuestType::Main`] and [`MAX_ACTIVE_MAIN_QUESTS`] main quests are
    /// already active.
    pub fn add_quest(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        quest_type: QuestType,
        reward: Option<String>,
        initial_steps: Vec<String>,
    ) -> Option<Quest> {
        let command = QuestCommand::AddQuest {
            title: title.into(),
            description: description.into(),
            quest_type,
            reward,
            initial_steps,
        };

        match self.dispatch(command) {
            Ok((created, _)) => created,
            Err(_) => None,
        }
    }

    /// Change a quest's status. Entering `completed` from another status awards
    /// the quest's XP and bumps the completed-quest count.
    pub fn update_quest_status(&self, quest_id: &str, status: QuestStatus) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::UpdateStatus {
            quest_id: quest_id.to_string(),
            status,
        })
    }

    /// Merge `patch` into a quest. No XP effects and no field validation.
    pub fn update_quest(&self, quest_id: &str, patch: QuestPatch) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::UpdateQuest {
            quest_id: quest_id.to_string(),
            patch,
        })
    }

    /// Remove a quest. XP already awarded for it is kept.
    pub fn delete_quest(&self, quest_id: &str) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::DeleteQuest {
            quest_id: quest_id.to_string(),
        })
    }

    pub fn add_step(&self, quest_id: &str, title: impl Into<String>) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::AddStep {
            quest_id: quest_id.to_string(),
            title: title.into(),
        })
    }

    /// Flip a step's completion, awarding or taking back its XP.
    pub fn toggle_step(&self, quest_id: &str, step_id: &str) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::ToggleStep {
            quest_id: quest_id.to_string(),
            step_id: step_id.to_string(),
        })
    }

    pub fn update_step(
        &self,
        quest_id: &str,
        step_id: &str,
        title: impl Into<String>,
    ) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::UpdateStep {
            quest_id: quest_id.to_string(),
            step_id: step_id.to_string(),
            title: title.into(),
        })
    }

    /// Remove a step. A completed step's XP is taken back.
    pub fn delete_step(&self, quest_id: &str, step_id: &str) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::DeleteStep {
            quest_id: quest_id.to_string(),
            step_id: step_id.to_string(),
        })
    }

    /// Remove every quest. User state is not touched.
    pub fn clear(&self) -> Vec<StateChange> {
        self.dispatch_infallible(QuestCommand::Clear)
    }

    /// Current state as an envelope stamped with `exportedAt`.
    pub fn export_data(&self) -> AppData {
        let quests = read_lock(&self.quests);
        AppData {
            exported_at: Some(now_millis()),
            ..AppData::from_parts(self.user.snapshot(), quests.clone())
        }
    }

    /// Replace all user and quest state with an imported envelope and save it.
    pub fn import_data(&self, data: AppData) -> Result<Vec<StateChange>, LoadError> {
        if !is_compatible_version(&data.version) {
            tracing::warn!("Refusing import with schema version {}", data.version);
            return Err(LoadError::IncompatibleVersion(data.version));
        }

        tracing::info!("Importing {} quests", data.quests.len());

        let mut changes = self.user.set(data.user);
        changes.extend(self.replace_all(data.quests));
        self.persist(&read_lock(&self.quests));

        Ok(changes)
    }

    fn dispatch_infallible(&self, command: QuestCommand) -> Vec<StateChange> {
        self.dispatch(command)
            .map(|(_, changes)| changes)
            .unwrap_or_default()
    }

    /// Run a command through the reducer, commit, apply effects, persist and
    /// broadcast. Returns the created quest (if any) and every change,
    /// including user changes caused by XP effects.
    fn dispatch(
        &self,
        command: QuestCommand,
    ) -> Result<(Option<Quest>, Vec<StateChange>), Rejection> {
        let mut quests = write_lock(&self.quests);

        let transition = match reducer::apply(&quests, command, now_millis()) {
            Ok(transition) => transition,
            Err(rejection) => {
                self.metrics.record_mutation_rejected();
                tracing::warn!("{}", rejection);
                return Err(rejection);
            }
        };

        let old = std::mem::replace(&mut *quests, transition.quests);
        let quest_changes = detect_changes(&old, &quests);

        let mut changes = quest_changes.clone();
        for effect in transition.effects {
            changes.extend(match effect {
                UserEffect::AwardXp(delta) => self.user.award_xp(delta),
                UserEffect::IncrementQuestCount => self.user.increment_quest_count(),
            });
        }

        let active_main = views::active_main_count(&quests);
        if active_main > MAX_ACTIVE_MAIN_QUESTS {
            tracing::warn!(
                "{} main quests are active, above the limit of {}",
                active_main,
                MAX_ACTIVE_MAIN_QUESTS
            );
        }

        self.metrics.record_mutation();
        self.persist(&quests);
        drop(quests);

        self.broadcast(&quest_changes);
        Ok((transition.created, changes))
    }

    fn replace_all(&self, new_quests: Vec<Quest>) -> Vec<StateChange> {
        let mut quests = write_lock(&self.quests);
        let could_add_main = views::can_add_main_quest(&quests);

        *quests = new_quests;

        let mut changes = vec![StateChange::QuestsReplaced {
            count: quests.len(),
        }];
        let can_add_main = views::can_add_main_quest(&quests);
        if could_add_main != can_add_main {
            changes.push(StateChange::MainQuestCapacityChanged {
                can_add_main_quest: can_add_main,
            });
        }
        drop(quests);

        self.broadcast(&changes);
        changes
    }

    /// Write the full envelope. Called with the quest lock held so the
    /// snapshot matches what was just committed.
    fn persist(&self, quests: &[Quest]) -> bool {
        let data = AppData::from_parts(self.user.snapshot(), quests.to_vec());
        self.persistence.save(&data)
    }

    fn broadcast(&self, changes: &[StateChange]) {
        for change in changes {
            if self.state_tx.send(change.clone()).is_ok() {
                self.metrics.record_state_broadcast();
            }
        }
    }
}

/// Diff two quest lists into change events.
fn detect_changes(old: &[Quest], new: &[Quest]) -> Vec<StateChange> {
    let mut changes = Vec::new();

    let old_by_id: HashMap<&str, &Quest> = old.iter().map(|q| (q.id.as_str(), q)).collect();
    let new_ids: HashSet<&str> = new.iter().map(|q| q.id.as_str()).collect();

    for quest in new {
        match old_by_id.get(quest.id.as_str()) {
            None => changes.push(StateChange::QuestAdded {
                quest_id: quest.id.clone(),
                quest_type: quest.quest_type,
            }),
            Some(previous) if *previous != quest => changes.push(StateChange::QuestUpdated {
                quest_id: quest.id.clone(),
                status: quest.status,
            }),
            Some(_) => {}
        }
    }

    for quest in old.iter().filter(|q| !new_ids.contains(q.id.as_str())) {
        changes.push(StateChange::QuestRemoved {
            quest_id: quest.id.clone(),
        });
    }

    let can_add_main = views::can_add_main_quest(new);
    if views::can_add_main_quest(old) != can_add_main {
        changes.push(StateChange::MainQuestCapacityChanged {
            can_add_main_quest: can_add_main,
        });
    }

    changes
}
