use super::{CHANGE_CHANNEL_CAPACITY, StateChange, read_lock, write_lock};
use crate::models::UserState;
use crate::services::xp::{self, XpProgress};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Observable container for the user's aggregate progress.
///
/// Every mutation recomputes `level` from `total_xp`, so the cached level can
/// never drift. The store does not persist anything itself; the
/// [`QuestStore`](super::QuestStore) writes user state as part of the envelope.
///
/// Clones share the same state and channel.
#[derive(Clone)]
pub struct UserStore {
    state: Arc<RwLock<UserState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl UserStore {
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(UserState::default())),
            state_tx,
        }
    }

    pub fn snapshot(&self) -> UserState {
        read_lock(&self.state).clone()
    }

    /// Execute a function with read access to the state
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&UserState) -> R,
    {
        f(&read_lock(&self.state))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    pub fn xp_progress(&self) -> XpProgress {
        self.read(|state| xp::xp_progress(state.total_xp))
    }

    /// Apply `update_fn` to a copy of the state, re-derive the level, commit,
    /// and emit events for whatever changed.
    fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut UserState),
    {
        let mut state = write_lock(&self.state);

        let mut next = state.clone();
        update_fn(&mut next);
        next.level = xp::calculate_level(next.total_xp);

        let changes = detect_changes(&state, &next);
        *state = next;
        drop(state);

        for change in &changes {
            // No subscribers is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Add `delta` XP (negative to take XP back) and recompute the level.
    ///
    /// The total is not clamped and may go below zero; a negative total is
    /// level 0. It saturates at the `i64` bounds.
    pub fn award_xp(&self, delta: i64) -> Vec<StateChange> {
        let changes = self.update(|state| {
            state.total_xp = state.total_xp.saturating_add(delta);
        });
        tracing::debug!("Awarded {} XP", delta);
        changes
    }

    pub fn increment_quest_count(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.completed_quest_count = state.completed_quest_count.saturating_add(1);
        })
    }

    pub fn reset(&self) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            *state = UserState::default();
        });

        let _ = self.state_tx.send(StateChange::UserReset);
        changes.push(StateChange::UserReset);

        changes
    }

    /// Replace the whole state, as done when loading stored data.
    ///
    /// A stored level that disagrees with the stored XP is corrected.
    pub fn set(&self, user_state: UserState) -> Vec<StateChange> {
        let expected_level = xp::calculate_level(user_state.total_xp);
        if user_state.level != expected_level {
            tracing::warn!(
                "Stored level {} does not match {} XP, using level {}",
                user_state.level,
                user_state.total_xp,
                expected_level
            );
        }

        self.update(|state| *state = user_state)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn detect_changes(old: &UserState, new: &UserState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.total_xp != new.total_xp {
        changes.push(StateChange::XpChanged {
            total_xp: new.total_xp,
            delta: new.total_xp.saturating_sub(old.total_xp),
        });
    }

    if old.level != new.level {
        changes.push(StateChange::LevelChanged {
            old_level: old.level,
            new_level: new.level,
        });
    }

    if old.completed_quest_count != new.completed_quest_count {
        changes.push(StateChange::QuestCountChanged {
            completed_quest_count: new.completed_quest_count,
        });
    }

    if old.current_theme != new.current_theme {
        changes.push(StateChange::ThemeChanged {
            theme: new.current_theme.clone(),
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_store() {
        let store = UserStore::new();
        assert_eq!(store.snapshot(), UserState::default());
    }

    #[test]
    fn test_award_xp_recomputes_level() {
        let store = UserStore::new();

        let changes = store.award_xp(150);

        assert_eq!(
            changes,
            vec![
                StateChange::XpChanged {
                    total_xp: 150,
                    delta: 150
                },
                StateChange::LevelChanged {
                    old_level: 0,
                    new_level: 1
                },
            ]
        );
        let state = store.snapshot();
        assert_eq!(state.total_xp, 150);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_negative_award_is_not_clamped() {
        let store = UserStore::new();
        store.award_xp(10);

        let changes = store.award_xp(-30);

        assert_eq!(
            changes,
            vec![StateChange::XpChanged {
                total_xp: -20,
                delta: -30
            }]
        );
        assert_eq!(store.read(|s| s.total_xp), -20);
        assert_eq!(store.read(|s| s.level), 0);
    }

    #[test]
    fn test_award_zero_emits_nothing() {
        let store = UserStore::new();
        assert!(store.award_xp(0).is_empty());
    }

    #[test]
    fn test_increment_quest_count() {
        let store = UserStore::new();

        store.increment_quest_count();
        let changes = store.increment_quest_count();

        assert_eq!(
            changes,
            vec![StateChange::QuestCountChanged {
                completed_quest_count: 2
            }]
        );
    }

    #[test]
    fn test_reset() {
        let store = UserStore::new();
        store.award_xp(500);
        store.increment_quest_count();

        let changes = store.reset();

        assert!(changes.contains(&StateChange::UserReset));
        assert_eq!(store.snapshot(), UserState::default());
    }

    #[test]
    fn test_set_corrects_stale_level() {
        let store = UserStore::new();

        store.set(UserState {
            total_xp: 450,
            level: 7,
            completed_quest_count: 3,
            current_theme: Some("forest".to_string()),
        });

        let state = store.snapshot();
        assert_eq!(state.level, 2);
        assert_eq!(state.completed_quest_count, 3);
        assert_eq!(state.current_theme.as_deref(), Some("forest"));
    }

    #[test]
    fn test_subscribe_to_changes() {
        let store = UserStore::new();
        let mut rx = store.subscribe();

        store.award_xp(50);

        let event = rx.try_recv();
        assert!(matches!(
            event,
            Ok(StateChange::XpChanged {
                total_xp: 50,
                delta: 50
            })
        ));
    }

    #[test]
    fn test_clone_shares_state() {
        let store1 = UserStore::new();
        let store2 = store1.clone();

        store1.award_xp(40);

        assert_eq!(store2.snapshot().total_xp, 40);
    }

    #[test]
    fn test_award_xp_saturates_at_bounds() {
        let store = UserStore::new();
        store.set(UserState {
            total_xp: i64::MAX - 10,
            completed_quest_count: u32::MAX,
            ..UserState::default()
        });

        store.award_xp(50);
        store.increment_quest_count();

        let state = store.snapshot();
        assert_eq!(state.total_xp, i64::MAX);
        assert_eq!(state.completed_quest_count, u32::MAX);
        assert_eq!(state.level, xp::calculate_level(i64::MAX));
        assert!(store.xp_progress().required_xp > 0);

        let changes = store.set(UserState {
            total_xp: i64::MIN,
            ..UserState::default()
        });
        assert!(changes.contains(&StateChange::XpChanged {
            total_xp: i64::MIN,
            delta: i64::MIN
        }));

        store.award_xp(-1);
        assert_eq!(store.snapshot().total_xp, i64::MIN);
        assert_eq!(store.snapshot().level, 0);
    }

    #[test]
    fn test_xp_progress() {
        let store = UserStore::new();
        store.award_xp(50);

        let progress = store.xp_progress();
        assert_eq!(progress.current_level, 0);
        assert_eq!(progress.percentage, 50.0);
    }
}
