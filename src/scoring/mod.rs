//! Score derivation rules shared by the client accumulator and the session store.
//!
//! Aggregates are always recomputed from the full task-score collection, never
//! patched incrementally, so the sum invariant holds structurally.

use serde::{Deserialize, Serialize};

use crate::models::TaskScore;

/// Number of tasks in a full playthrough.
pub const TASK_COUNT: usize = 3;

/// Maximum meaningful score per task (by task design, not enforced here).
pub const TASK_MAX_SCORE: i64 = 1000;

/// Maximum achievable total score across all tasks.
pub const MAX_TOTAL_SCORE: i64 = 3000;

/// Preston's fixed benchmark total across all three tasks.
pub const PRESTON_TOTAL_SCORE: i64 = 2950;

/// Hours Preston saves per week on a perfect task-3 run.
///
/// Business parameter from the campaign content, not a measured quantity.
pub const HOURS_SAVED_PER_PERFECT_TASK3: f64 = 11.6;

/// Fallback weekly hours-saved estimate when no task-3 data exists.
pub const DEFAULT_HOURS_SAVED: f64 = 10.5;

/// Aggregate totals derived from a session's task scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreTotals {
    pub total_user_score: i64,
    pub total_preston_score: i64,
    pub future_readiness_score: i64,
}

/// Recompute aggregate totals from the full task-score collection.
pub fn aggregate(task_scores: &[TaskScore]) -> ScoreTotals {
    let total_user_score: i64 = task_scores.iter().map(|t| t.user_score).sum();
    let total_preston_score: i64 = task_scores.iter().map(|t| t.preston_score).sum();

    ScoreTotals {
        total_user_score,
        total_preston_score,
        future_readiness_score: future_readiness(total_user_score),
    }
}

/// Future-readiness percentage: `round(total / 3000 * 100)`.
///
/// Stays within 0..=100 as long as each task score respects its 1000-point
/// ceiling; this function does not clamp.
pub fn future_readiness(total_user_score: i64) -> i64 {
    (total_user_score as f64 / MAX_TOTAL_SCORE as f64 * 100.0).round() as i64
}

/// Estimate weekly hours saved for the final summary.
///
/// Prefers the value measured during task 3, else derives one from the task-3
/// score, else falls back to a fixed default.
pub fn time_saved_hours(recorded: Option<f64>, task3_score: i64) -> f64 {
    match recorded {
        Some(hours) if hours > 0.0 => hours,
        _ if task3_score > 0 => task3_score as f64 / TASK_MAX_SCORE as f64
            * HOURS_SAVED_PER_PERFECT_TASK3,
        _ => DEFAULT_HOURS_SAVED,
    }
}

/// Readiness tier shown on the final score screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadinessTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl ReadinessTier {
    /// Map a readiness percentage to its tier. Lower bounds are inclusive.
    pub fn for_readiness(score: i64) -> Self {
        if score >= 90 {
            ReadinessTier::Platinum
        } else if score >= 75 {
            ReadinessTier::Gold
        } else if score >= 60 {
            ReadinessTier::Silver
        } else {
            ReadinessTier::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessTier::Bronze => "Bronze",
            ReadinessTier::Silver => "Silver",
            ReadinessTier::Gold => "Gold",
            ReadinessTier::Platinum => "Platinum",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskScore;
    use chrono::Utc;

    fn task(task_number: i64, user_score: i64, preston_score: i64) -> TaskScore {
        TaskScore {
            task_number,
            user_score,
            preston_score,
            completed_at: Utc::now().to_rfc3339(),
            details: None,
        }
    }

    #[test]
    fn test_aggregate_sums_all_tasks() {
        let scores = vec![task(1, 800, 1000), task(2, 600, 1000), task(3, 900, 950)];
        let totals = aggregate(&scores);
        assert_eq!(totals.total_user_score, 2300);
        assert_eq!(totals.total_preston_score, 2950);
        assert_eq!(totals.future_readiness_score, 77);
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        let totals = aggregate(&[]);
        assert_eq!(totals, ScoreTotals::default());
    }

    #[test]
    fn test_future_readiness_rounds() {
        assert_eq!(future_readiness(800), 27); // 26.67 rounds up
        assert_eq!(future_readiness(1400), 47);
        assert_eq!(future_readiness(2450), 82);
        assert_eq!(future_readiness(0), 0);
        assert_eq!(future_readiness(3000), 100);
    }

    #[test]
    fn test_time_saved_prefers_recorded_value() {
        assert_eq!(time_saved_hours(Some(8.4), 500), 8.4);
    }

    #[test]
    fn test_time_saved_derives_from_score() {
        let estimate = time_saved_hours(None, 1000);
        assert!((estimate - HOURS_SAVED_PER_PERFECT_TASK3).abs() < f64::EPSILON);
        let half = time_saved_hours(Some(0.0), 500);
        assert!((half - 5.8).abs() < 1e-9);
    }

    #[test]
    fn test_time_saved_default_without_task3() {
        assert_eq!(time_saved_hours(None, 0), DEFAULT_HOURS_SAVED);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ReadinessTier::for_readiness(90), ReadinessTier::Platinum);
        assert_eq!(ReadinessTier::for_readiness(89), ReadinessTier::Gold);
        assert_eq!(ReadinessTier::for_readiness(75), ReadinessTier::Gold);
        assert_eq!(ReadinessTier::for_readiness(74), ReadinessTier::Silver);
        assert_eq!(ReadinessTier::for_readiness(60), ReadinessTier::Silver);
        assert_eq!(ReadinessTier::for_readiness(59), ReadinessTier::Bronze);
        assert_eq!(ReadinessTier::for_readiness(0), ReadinessTier::Bronze);
    }
}
