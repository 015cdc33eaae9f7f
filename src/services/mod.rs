//! Services module - pure business rules with no state and no I/O.
//!
//! # Components
//!
//! - [`xp`]: the XP engine. Maps XP totals to levels and progress, and holds the
//!   fixed XP values for quests and steps.
//! - [`validation`]: structural predicates used as a load-time guard against
//!   corrupted or foreign persisted data, plus helpers for checking raw user
//!   input (titles, descriptions) before it reaches the stores.
//!
//! Both are plain functions so they can be called from the stores, the
//! persistence layer and presentation code alike.

pub mod validation;
pub mod xp;

pub use validation::{
    is_compatible_version, is_valid_app_data, is_valid_description, is_valid_quest,
    is_valid_quest_status, is_valid_quest_type, is_valid_step, is_valid_title, sanitize_string,
};
pub use xp::{
    XpProgress, calculate_level, quest_xp_value, step_xp_value, xp_for_level, xp_progress,
};
