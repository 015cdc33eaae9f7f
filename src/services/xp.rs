//! XP and level arithmetic.
//!
//! Levels follow a square-root curve: reaching level `n` takes `n² × 100` XP.
//!
//! | Level | XP threshold |
//! |-------|--------------|
//! | 0     | 0            |
//! | 1     | 100          |
//! | 2     | 400          |
//! | 3     | 900          |
//!
//! Negative XP totals are possible (a step can be un-completed after XP was
//! adjusted elsewhere) and always map to level 0.

use crate::models::{MAIN_QUEST_XP, QuestType, SIDE_QUEST_XP, STEP_XP};

/// Level reached with `total_xp`: `floor(sqrt(max(total_xp, 0) / 100))`.
///
/// Computed with an integer square root, so thresholds are exact.
pub fn calculate_level(total_xp: i64) -> u32 {
    // floor(sqrt(x / 100)) == isqrt(floor(x / 100)) for integral x
    let hundreds = total_xp.max(0) as u64 / 100;
    hundreds.isqrt() as u32
}

/// Minimum total XP needed for `level`, saturating at `i64::MAX`.
pub fn xp_for_level(level: u32) -> i64 {
    let level = i64::from(level);
    level.saturating_mul(level).saturating_mul(100)
}

/// Progress from the current level towards the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpProgress {
    pub current_level: u32,
    pub next_level: u32,
    /// XP earned since reaching `current_level`
    pub current_xp: i64,
    /// XP between the `current_level` and `next_level` thresholds
    pub required_xp: i64,
    pub percentage: f64,
}

pub fn xp_progress(total_xp: i64) -> XpProgress {
    let current_level = calculate_level(total_xp);
    let next_level = current_level + 1;
    let current_level_xp = xp_for_level(current_level);
    // Near i64::MAX the next threshold saturates, leaving a short final bracket
    let required_xp = xp_for_level(next_level) - current_level_xp;

    // Brackets grow by (2n + 1) * 100, never zero
    debug_assert!(required_xp > 0, "level brackets must strictly increase");

    let current_xp = total_xp.saturating_sub(current_level_xp);
    let percentage = current_xp as f64 / required_xp as f64 * 100.0;

    XpProgress {
        current_level,
        next_level,
        current_xp,
        required_xp,
        percentage,
    }
}

/// XP awarded for completing a quest of the given type.
pub fn quest_xp_value(quest_type: QuestType) -> i64 {
    match quest_type {
        QuestType::Main => MAIN_QUEST_XP,
        QuestType::Side => SIDE_QUEST_XP,
    }
}

pub fn step_xp_value() -> i64 {
    STEP_XP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(calculate_level(0), 0);
        assert_eq!(calculate_level(99), 0);
        assert_eq!(calculate_level(100), 1);
        assert_eq!(calculate_level(399), 1);
        assert_eq!(calculate_level(400), 2);
        assert_eq!(calculate_level(900), 3);
        assert_eq!(calculate_level(10_000), 10);
    }

    #[test]
    fn test_negative_xp_is_level_zero() {
        assert_eq!(calculate_level(-1), 0);
        assert_eq!(calculate_level(-10_000), 0);
    }

    #[test]
    fn test_xp_for_level() {
        assert_eq!(xp_for_level(0), 0);
        assert_eq!(xp_for_level(1), 100);
        assert_eq!(xp_for_level(5), 2_500);
    }

    #[test]
    fn test_xp_progress_mid_level() {
        let progress = xp_progress(250);

        assert_eq!(progress.current_level, 1);
        assert_eq!(progress.next_level, 2);
        assert_eq!(progress.current_xp, 150);
        assert_eq!(progress.required_xp, 300);
        assert_eq!(progress.percentage, 50.0);
    }

    #[test]
    fn test_xp_progress_at_zero() {
        let progress = xp_progress(0);

        assert_eq!(progress.current_level, 0);
        assert_eq!(progress.required_xp, 100);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn test_xp_progress_negative_total() {
        let progress = xp_progress(-20);

        assert_eq!(progress.current_level, 0);
        assert_eq!(progress.current_xp, -20);
        assert_eq!(progress.percentage, -20.0);
    }

    #[test]
    fn test_extreme_totals_do_not_overflow() {
        let top = calculate_level(i64::MAX);
        assert_eq!(top, 303_700_049);
        assert!(xp_for_level(top) <= i64::MAX);
        assert_eq!(xp_for_level(top + 1), i64::MAX);
        assert_eq!(xp_for_level(u32::MAX), i64::MAX);

        let progress = xp_progress(i64::MAX);
        assert_eq!(progress.current_level, top);
        assert!(progress.required_xp > 0);
        assert!(progress.current_xp <= progress.required_xp);

        let progress = xp_progress(i64::MIN);
        assert_eq!(progress.current_level, 0);
        assert_eq!(progress.current_xp, i64::MIN);
    }

    #[test]
    fn test_fixed_xp_values() {
        assert_eq!(quest_xp_value(QuestType::Main), 200);
        assert_eq!(quest_xp_value(QuestType::Side), 50);
        assert_eq!(step_xp_value(), 10);
    }
}
