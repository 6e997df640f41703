//! Leaderboard and rank read projections. Never stored.

use serde::{Deserialize, Serialize};

/// One ranked row of the public leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub name: String,
    pub agency_name: String,
    pub total_score: i64,
    pub future_readiness_score: i64,
    pub completed_at: String,
}

/// Rank lookup result for a single session.
///
/// `rank` stays `null` while the session is incomplete; that is an answer,
/// not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRank {
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total_score: i64,
    pub future_readiness_score: i64,
}
