//! Game session model matching the frontend GameSession interface.

use serde::{Deserialize, Serialize};

/// Task-specific outcome details, tagged by task.
///
/// Each task's detail shape is fixed and known at design time, so this is a
/// closed union rather than an open JSON blob. The tag must agree with the
/// surrounding `taskNumber`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "task", rename_all = "camelCase")]
pub enum TaskDetails {
    /// Lead-response race: only timing is interesting.
    #[serde(rename_all = "camelCase")]
    Task1 { elapsed_seconds: i64 },
    /// Seller triage: which rows the player picked.
    #[serde(rename_all = "camelCase")]
    Task2 {
        elapsed_seconds: i64,
        #[serde(default)]
        selections: Vec<String>,
    },
    /// Admin delegation: choices plus the measured weekly hours saved.
    #[serde(rename_all = "camelCase")]
    Task3 {
        elapsed_seconds: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        time_saved_hours: Option<f64>,
        #[serde(default)]
        choices: Vec<String>,
    },
}

impl TaskDetails {
    /// The task number this detail shape belongs to.
    pub fn task_number(&self) -> i64 {
        match self {
            TaskDetails::Task1 { .. } => 1,
            TaskDetails::Task2 { .. } => 2,
            TaskDetails::Task3 { .. } => 3,
        }
    }
}

/// One task's outcome within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskScore {
    pub task_number: i64,
    pub user_score: i64,
    pub preston_score: i64,
    pub completed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<TaskDetails>,
}

/// A player's full playthrough record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub id: String,
    pub name: String,
    pub agency_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biggest_challenge: Option<String>,
    pub task_scores: Vec<TaskScore>,
    pub total_user_score: i64,
    pub total_preston_score: i64,
    pub future_readiness_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl GameSession {
    /// True once all three distinct tasks have been recorded.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Request body for creating a new session.
///
/// Required fields are `Option` so that missing values surface as a 400
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub agency_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub biggest_challenge: Option<String>,
}

/// Request body for recording a task score.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTaskScoreRequest {
    #[serde(default)]
    pub task_number: Option<i64>,
    #[serde(default)]
    pub user_score: Option<i64>,
    #[serde(default)]
    pub preston_score: Option<i64>,
    #[serde(default)]
    pub details: Option<TaskDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_details_tagged_by_task() {
        let details: TaskDetails = serde_json::from_value(json!({
            "task": "task2",
            "elapsedSeconds": 42,
            "selections": ["lead-3", "lead-7"]
        }))
        .unwrap();

        assert_eq!(details.task_number(), 2);
        match details {
            TaskDetails::Task2 { selections, .. } => assert_eq!(selections.len(), 2),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_task3_details_optional_time_saved() {
        let details: TaskDetails = serde_json::from_value(json!({
            "task": "task3",
            "elapsedSeconds": 55,
            "choices": []
        }))
        .unwrap();

        match details {
            TaskDetails::Task3 {
                time_saved_hours, ..
            } => assert!(time_saved_hours.is_none()),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_create_request_tolerates_missing_fields() {
        let request: CreateSessionRequest = serde_json::from_value(json!({
            "name": "Ava"
        }))
        .unwrap();

        assert_eq!(request.name.as_deref(), Some("Ava"));
        assert!(request.agency_name.is_none());
        assert!(request.email.is_none());
    }
}
