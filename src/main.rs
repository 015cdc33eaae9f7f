//! Questline - headless host for the quest and user stores.
//!
//! # Overview
//!
//! Presentation layers embed the library directly. This binary wires the same
//! pieces together and reports the stored progress, which is useful for
//! checking a data directory:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (file rotation + console output)
//! - File-backed persistence ([`FileStorage`] behind [`Persistence`])
//! - State stores ([`UserStore`], [`QuestStore`])
//!
//! # Execution Flow
//!
//! 1. Load `Questline Config.yaml` (plus `QUESTLINE_*` overrides)
//! 2. Initialize logging → `<log_dir>/<log_prefix>.<date>`
//! 3. Open the data directory; fall back to no persistence if it is unusable
//! 4. Load the stored envelope into the stores
//! 5. Print level, XP progress, quest counts and active quest progress
//! 6. Log metrics summary

use anyhow::Result;
use questline::services::xp;
use questline::{
    APP_NAME, ConfigManager, FileStorage, Persistence, QuestStatus, QuestStore, UserStore,
    VERSION,
};
use std::sync::Arc;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(".")?;
    let config = config_manager.load_config()?;

    let _guard = questline::logging::setup_logging(&config)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let persistence = match FileStorage::open(&config.data_dir, config.storage_quota_bytes) {
        Ok(storage) => Persistence::new(Arc::new(storage)),
        Err(e) => {
            tracing::warn!(
                "Storage at {} is unavailable ({}), running without persistence",
                config.data_dir,
                e
            );
            Persistence::unavailable()
        }
    };

    let user = UserStore::new();
    let quests = QuestStore::new(user.clone(), persistence);

    if quests.init() {
        tracing::info!("Restored stored progress from {}", config.data_dir);
    } else {
        tracing::info!("No usable stored progress, starting fresh");
    }

    let progress = user.xp_progress();
    let state = user.snapshot();
    let views = quests.views();

    println!("{} v{}", APP_NAME, VERSION);
    println!(
        "Level {} - {} XP total ({}/{} XP to level {}, {:.0}%)",
        progress.current_level,
        state.total_xp,
        progress.current_xp,
        progress.required_xp,
        progress.next_level,
        progress.percentage
    );
    println!("Next level at {} XP", xp::xp_for_level(progress.next_level));
    let all_quests = quests.snapshot();
    let counts: Vec<String> = QuestStatus::ALL
        .iter()
        .map(|status| {
            let count = all_quests.iter().filter(|q| q.status == *status).count();
            format!("{} {}", count, status.as_str())
        })
        .collect();
    println!("Quests: {}", counts.join(", "));
    for quest in views.active_main.iter().chain(views.active_side.iter()) {
        println!(
            "  [{}] {} ({}/{} steps)",
            quest.quest_type.as_str(),
            quest.title,
            quest.completed_step_count(),
            quest.steps.len()
        );
    }
    println!("Completed quests (all time): {}", state.completed_quest_count);
    if !views.can_add_main_quest {
        println!("Main quest limit reached");
    }

    quests.metrics().log_summary();
    tracing::info!("Shutdown complete");

    Ok(())
}
