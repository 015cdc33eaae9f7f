//! Structural validation of persisted data and input helpers.
//!
//! The predicates operate on an untyped [`serde_json::Value`] so that foreign
//! or corrupted blobs are rejected before typed decoding. They check field
//! presence and primitive types only; ordering of timestamps, duplicate ids
//! and similar semantic rules are not checked.
//!
//! Optional fields (`completedAt`, `reward`, `currentTheme`, `exportedAt`) may
//! be absent, but when present must have the right type (`null` is rejected).
//! Identifiers are any string and numeric fields any number; the typed decode
//! in [`crate::models::number`] normalizes them.

use crate::models::SCHEMA_VERSION;
use serde_json::{Map, Value};

/// Default length limit for [`sanitize_string`].
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 500;

/// Maximum trimmed length of a quest title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum trimmed length of a quest description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

pub fn is_valid_quest_type(value: &str) -> bool {
    matches!(value, "main" | "side")
}

pub fn is_valid_quest_status(value: &str) -> bool {
    matches!(value, "active" | "paused" | "completed" | "abandoned")
}

pub fn is_valid_step(value: &Value) -> bool {
    let Some(step) = value.as_object() else {
        return false;
    };

    is_string(step.get("id"))
        && is_string(step.get("title"))
        && step.get("completed").is_some_and(Value::is_boolean)
        && is_number(step.get("xpValue"))
        && is_optional(step, "completedAt", is_number)
}

pub fn is_valid_quest(value: &Value) -> bool {
    let Some(quest) = value.as_object() else {
        return false;
    };

    is_string(quest.get("id"))
        && is_string(quest.get("title"))
        && is_string(quest.get("description"))
        && quest
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(is_valid_quest_type)
        && quest
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(is_valid_quest_status)
        && is_number(quest.get("createdAt"))
        && is_number(quest.get("updatedAt"))
        && is_optional(quest, "completedAt", is_number)
        && quest
            .get("steps")
            .and_then(Value::as_array)
            .is_some_and(|steps| steps.iter().all(is_valid_step))
        && is_optional(quest, "reward", is_string)
        && is_number(quest.get("xpValue"))
}

pub fn is_valid_app_data(value: &Value) -> bool {
    let Some(data) = value.as_object() else {
        return false;
    };

    is_string(data.get("version"))
        && data.get("user").is_some_and(is_valid_user_state)
        && data
            .get("quests")
            .and_then(Value::as_array)
            .is_some_and(|quests| quests.iter().all(is_valid_quest))
        && is_optional(data, "exportedAt", is_number)
}

fn is_valid_user_state(value: &Value) -> bool {
    let Some(user) = value.as_object() else {
        return false;
    };

    is_number(user.get("totalXP"))
        && is_number(user.get("level"))
        && is_number(user.get("completedQuestCount"))
        && is_optional(user, "currentTheme", is_string)
}

/// Only the exact current schema version is accepted.
pub fn is_compatible_version(version: &str) -> bool {
    version == SCHEMA_VERSION
}

/// Trim `input` and truncate it to at most `max_length` characters.
pub fn sanitize_string(input: &str, max_length: usize) -> String {
    input.trim().chars().take(max_length).collect()
}

/// A title is non-empty after trimming and at most 100 characters long.
pub fn is_valid_title(title: &str) -> bool {
    let length = title.trim().chars().count();
    length > 0 && length <= MAX_TITLE_LENGTH
}

pub fn is_valid_description(description: &str) -> bool {
    description.trim().chars().count() <= MAX_DESCRIPTION_LENGTH
}

fn is_string(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_string)
}

fn is_number(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_number)
}

fn is_optional(
    object: &Map<String, Value>,
    key: &str,
    check: impl Fn(Option<&Value>) -> bool,
) -> bool {
    match object.get(key) {
        None => true,
        present => check(present),
    }
}
