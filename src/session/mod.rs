//! Client-side session accumulator.
//!
//! Tracks one player's progress through the three tasks without server round
//! trips, then hands the final numbers to the lead-capture and final-score
//! screens. Replaces the old string-keyed per-tab storage with an explicit
//! typed state object, so there is no stringly-typed numeric decoding.
//!
//! Missing or never-recorded tasks read as zero; the summary must always be
//! computable, a mid-game reload shows zeros rather than failing.

use serde::{Deserialize, Serialize};

use crate::models::TaskDetails;
use crate::scoring::{self, ReadinessTier};

/// Player identity captured by the lead form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub name: String,
    pub agency_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biggest_challenge: Option<String>,
}

/// One task's locally-recorded outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskResult {
    /// Lead-response race.
    Task1 { score: i64, elapsed_seconds: i64 },
    /// Seller triage with the rows the player picked.
    Task2 {
        score: i64,
        elapsed_seconds: i64,
        selections: Vec<String>,
    },
    /// Admin delegation; `time_saved_hours` is measured during play when the
    /// task finishes normally.
    Task3 {
        score: i64,
        elapsed_seconds: i64,
        time_saved_hours: Option<f64>,
        choices: Vec<String>,
    },
}

impl TaskResult {
    pub fn task_number(&self) -> usize {
        match self {
            TaskResult::Task1 { .. } => 1,
            TaskResult::Task2 { .. } => 2,
            TaskResult::Task3 { .. } => 3,
        }
    }

    pub fn score(&self) -> i64 {
        match self {
            TaskResult::Task1 { score, .. }
            | TaskResult::Task2 { score, .. }
            | TaskResult::Task3 { score, .. } => *score,
        }
    }

    /// Wire-format details for the session store hand-off.
    pub fn to_details(&self) -> TaskDetails {
        match self {
            TaskResult::Task1 { elapsed_seconds, .. } => TaskDetails::Task1 {
                elapsed_seconds: *elapsed_seconds,
            },
            TaskResult::Task2 {
                elapsed_seconds,
                selections,
                ..
            } => TaskDetails::Task2 {
                elapsed_seconds: *elapsed_seconds,
                selections: selections.clone(),
            },
            TaskResult::Task3 {
                elapsed_seconds,
                time_saved_hours,
                choices,
                ..
            } => TaskDetails::Task3 {
                elapsed_seconds: *elapsed_seconds,
                time_saved_hours: *time_saved_hours,
                choices: choices.clone(),
            },
        }
    }
}

/// Final numbers shown on the results screen.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalSummary {
    pub task1_score: i64,
    pub task2_score: i64,
    pub task3_score: i64,
    pub total_score: i64,
    pub preston_total_score: i64,
    pub future_readiness_score: i64,
    pub tier: ReadinessTier,
    pub time_saved_hours: f64,
}

/// In-progress session state for one player. Lives for the duration of a
/// playthrough and is discarded (or persisted) at the lead-capture step.
#[derive(Debug, Clone, Default)]
pub struct SessionAccumulator {
    player: Option<PlayerInfo>,
    tasks: [Option<TaskResult>; scoring::TASK_COUNT],
}

impl SessionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task result, overwriting any previous result for that task.
    ///
    /// Scores are trusted as-is; each task page enforces its own ceiling.
    pub fn record_task_result(&mut self, result: TaskResult) {
        let slot = result.task_number() - 1;
        self.tasks[slot] = Some(result);
    }

    /// Capture the player's lead-form data.
    pub fn set_player(&mut self, player: PlayerInfo) {
        self.player = Some(player);
    }

    pub fn player(&self) -> Option<&PlayerInfo> {
        self.player.as_ref()
    }

    /// The recorded result for a task, if any.
    pub fn task_result(&self, task_number: usize) -> Option<&TaskResult> {
        self.tasks.get(task_number.wrapping_sub(1))?.as_ref()
    }

    /// Score for a task, defaulting a missing task to 0.
    pub fn task_score(&self, task_number: usize) -> i64 {
        self.task_result(task_number).map_or(0, TaskResult::score)
    }

    /// Derive the final-score screen numbers from whatever has been recorded.
    pub fn compute_final_summary(&self) -> FinalSummary {
        let task1_score = self.task_score(1);
        let task2_score = self.task_score(2);
        let task3_score = self.task_score(3);
        let total_score = task1_score + task2_score + task3_score;
        let future_readiness_score = scoring::future_readiness(total_score);

        let recorded_time_saved = match self.task_result(3) {
            Some(TaskResult::Task3 {
                time_saved_hours, ..
            }) => *time_saved_hours,
            _ => None,
        };

        FinalSummary {
            task1_score,
            task2_score,
            task3_score,
            total_score,
            preston_total_score: scoring::PRESTON_TOTAL_SCORE,
            future_readiness_score,
            tier: ReadinessTier::for_readiness(future_readiness_score),
            time_saved_hours: scoring::time_saved_hours(recorded_time_saved, task3_score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_run() -> SessionAccumulator {
        let mut acc = SessionAccumulator::new();
        acc.record_task_result(TaskResult::Task1 {
            score: 800,
            elapsed_seconds: 45,
        });
        acc.record_task_result(TaskResult::Task2 {
            score: 600,
            elapsed_seconds: 70,
            selections: vec!["seller-2".into(), "seller-5".into()],
        });
        acc.record_task_result(TaskResult::Task3 {
            score: 900,
            elapsed_seconds: 60,
            time_saved_hours: Some(9.8),
            choices: vec!["delegate-valuations".into()],
        });
        acc
    }

    #[test]
    fn test_summary_sums_all_tasks() {
        let summary = full_run().compute_final_summary();
        assert_eq!(summary.total_score, 2300);
        assert_eq!(summary.future_readiness_score, 77);
        assert_eq!(summary.tier, ReadinessTier::Gold);
        assert_eq!(summary.time_saved_hours, 9.8);
        assert_eq!(summary.preston_total_score, 2950);
    }

    #[test]
    fn test_missing_tasks_default_to_zero() {
        let mut acc = SessionAccumulator::new();
        acc.record_task_result(TaskResult::Task2 {
            score: 500,
            elapsed_seconds: 80,
            selections: vec![],
        });

        let summary = acc.compute_final_summary();
        assert_eq!(summary.task1_score, 0);
        assert_eq!(summary.task2_score, 500);
        assert_eq!(summary.task3_score, 0);
        assert_eq!(summary.total_score, 500);
        assert_eq!(summary.tier, ReadinessTier::Bronze);
    }

    #[test]
    fn test_empty_accumulator_uses_default_time_saved() {
        let summary = SessionAccumulator::new().compute_final_summary();
        assert_eq!(summary.total_score, 0);
        assert_eq!(summary.time_saved_hours, scoring::DEFAULT_HOURS_SAVED);
    }

    #[test]
    fn test_time_saved_estimated_from_task3_score() {
        let mut acc = SessionAccumulator::new();
        acc.record_task_result(TaskResult::Task3 {
            score: 500,
            elapsed_seconds: 90,
            time_saved_hours: None,
            choices: vec![],
        });

        let summary = acc.compute_final_summary();
        assert!((summary.time_saved_hours - 5.8).abs() < 1e-9);
    }

    #[test]
    fn test_rerecording_a_task_overwrites() {
        let mut acc = full_run();
        acc.record_task_result(TaskResult::Task1 {
            score: 950,
            elapsed_seconds: 30,
        });

        let summary = acc.compute_final_summary();
        assert_eq!(summary.task1_score, 950);
        assert_eq!(summary.total_score, 2450);
        assert_eq!(summary.future_readiness_score, 82);
    }

    #[test]
    fn test_details_hand_off_matches_task() {
        let acc = full_run();
        let details = acc.task_result(2).unwrap().to_details();
        assert_eq!(details.task_number(), 2);

        let details = acc.task_result(3).unwrap().to_details();
        match details {
            TaskDetails::Task3 {
                time_saved_hours, ..
            } => assert_eq!(time_saved_hours, Some(9.8)),
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
