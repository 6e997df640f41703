//! Database repository for session operations.
//!
//! Task-score writes, aggregate recomputation, and the completion check run in
//! a single transaction so a failed write never leaves partial state visible.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{GameSession, LeaderboardEntry, TaskDetails, TaskScore};
use crate::scoring;

/// Validated input for creating a session. Built by the handler after
/// required-field checks.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    pub agency_name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub biggest_challenge: Option<String>,
}

/// Database repository for all session data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new session with empty task scores and zeroed aggregates.
    pub async fn create_session(&self, new: &NewSession) -> Result<GameSession, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        // Email is normalized the same way the lead-capture form does it
        let email = new.email.trim().to_lowercase();

        sqlx::query(
            r#"INSERT INTO sessions (
                id, name, agency_name, email, mobile, biggest_challenge,
                total_user_score, total_preston_score, future_readiness_score,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, 0, 0, 0, ?, ?)"#,
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.agency_name)
        .bind(&email)
        .bind(&new.mobile)
        .bind(&new.biggest_challenge)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(GameSession {
            id,
            name: new.name.clone(),
            agency_name: new.agency_name.clone(),
            email,
            mobile: new.mobile.clone(),
            biggest_challenge: new.biggest_challenge.clone(),
            task_scores: Vec::new(),
            total_user_score: 0,
            total_preston_score: 0,
            future_readiness_score: 0,
            completed_at: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get a session by ID, including its task scores.
    pub async fn get_session(&self, id: &str) -> Result<Option<GameSession>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, name, agency_name, email, mobile, biggest_challenge,
                      total_user_score, total_preston_score, future_readiness_score,
                      completed_at, created_at, updated_at
               FROM sessions WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let task_scores = self.list_task_scores(id).await?;
        Ok(Some(session_from_row(&row, task_scores)))
    }

    /// Upsert a task score and recompute the session's aggregates.
    ///
    /// Replace-by-key semantics: a second write for the same task number
    /// overwrites the first. `completed_at` is set the moment the third
    /// distinct task number lands and is never moved afterwards.
    pub async fn record_task_score(
        &self,
        session_id: &str,
        task_number: i64,
        user_score: i64,
        preston_score: i64,
        details: Option<&TaskDetails>,
    ) -> Result<GameSession, AppError> {
        let now = Utc::now().to_rfc3339();
        let details_json = details.map(serde_json::to_string).transpose()?;

        let mut tx = self.pool.begin().await?;

        let session_row = sqlx::query(
            r#"SELECT id, name, agency_name, email, mobile, biggest_challenge,
                      total_user_score, total_preston_score, future_readiness_score,
                      completed_at, created_at, updated_at
               FROM sessions WHERE id = ?"#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game session {} not found", session_id)))?;

        sqlx::query(
            r#"INSERT INTO task_scores (session_id, task_number, user_score, preston_score, completed_at, details)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT (session_id, task_number) DO UPDATE SET
                   user_score = excluded.user_score,
                   preston_score = excluded.preston_score,
                   completed_at = excluded.completed_at,
                   details = excluded.details"#,
        )
        .bind(session_id)
        .bind(task_number)
        .bind(user_score)
        .bind(preston_score)
        .bind(&now)
        .bind(&details_json)
        .execute(&mut *tx)
        .await?;

        let task_rows = sqlx::query(
            r#"SELECT task_number, user_score, preston_score, completed_at, details
               FROM task_scores WHERE session_id = ? ORDER BY task_number"#,
        )
        .bind(session_id)
        .fetch_all(&mut *tx)
        .await?;

        let task_scores: Vec<TaskScore> = task_rows.iter().map(task_score_from_row).collect();
        let totals = scoring::aggregate(&task_scores);

        let existing_completed_at: Option<String> = session_row.get("completed_at");
        let completed_at = match existing_completed_at {
            Some(ts) => Some(ts),
            None if task_scores.len() == scoring::TASK_COUNT => Some(now.clone()),
            None => None,
        };

        sqlx::query(
            r#"UPDATE sessions SET
                total_user_score = ?, total_preston_score = ?, future_readiness_score = ?,
                completed_at = ?, updated_at = ?
            WHERE id = ?"#,
        )
        .bind(totals.total_user_score)
        .bind(totals.total_preston_score)
        .bind(totals.future_readiness_score)
        .bind(&completed_at)
        .bind(&now)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(GameSession {
            id: session_id.to_string(),
            name: session_row.get("name"),
            agency_name: session_row.get("agency_name"),
            email: session_row.get("email"),
            mobile: session_row.get("mobile"),
            biggest_challenge: session_row.get("biggest_challenge"),
            task_scores,
            total_user_score: totals.total_user_score,
            total_preston_score: totals.total_preston_score,
            future_readiness_score: totals.future_readiness_score,
            completed_at,
            created_at: session_row.get("created_at"),
            updated_at: now,
        })
    }

    /// Top completed sessions, ordered by total score descending with earlier
    /// finishers winning ties, annotated with a 1-based rank.
    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query(
            r#"SELECT name, agency_name, total_user_score, future_readiness_score, completed_at
               FROM sessions
               WHERE completed_at IS NOT NULL
               ORDER BY total_user_score DESC, completed_at ASC
               LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, row)| LeaderboardEntry {
                rank: index as i64 + 1,
                name: row.get("name"),
                agency_name: row.get("agency_name"),
                total_score: row.get("total_user_score"),
                future_readiness_score: row.get("future_readiness_score"),
                completed_at: row.get("completed_at"),
            })
            .collect())
    }

    /// Rank of a completed session among all completed sessions.
    ///
    /// Uses the same ordering as the leaderboard (score descending, then
    /// earlier completion), so both views always agree on ties. Returns
    /// `None` for a session that has not finished all three tasks.
    pub async fn session_rank(&self, session: &GameSession) -> Result<Option<i64>, AppError> {
        let Some(completed_at) = session.completed_at.as_deref() else {
            return Ok(None);
        };

        let row = sqlx::query(
            r#"SELECT COUNT(*) AS ahead FROM sessions
               WHERE completed_at IS NOT NULL
                 AND (total_user_score > ?
                      OR (total_user_score = ? AND completed_at < ?))"#,
        )
        .bind(session.total_user_score)
        .bind(session.total_user_score)
        .bind(completed_at)
        .fetch_one(&self.pool)
        .await?;

        let ahead: i64 = row.get("ahead");
        Ok(Some(ahead + 1))
    }

    async fn list_task_scores(&self, session_id: &str) -> Result<Vec<TaskScore>, AppError> {
        let rows = sqlx::query(
            r#"SELECT task_number, user_score, preston_score, completed_at, details
               FROM task_scores WHERE session_id = ? ORDER BY task_number"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(task_score_from_row).collect())
    }
}

// Helper functions for row conversion

fn session_from_row(row: &sqlx::sqlite::SqliteRow, task_scores: Vec<TaskScore>) -> GameSession {
    GameSession {
        id: row.get("id"),
        name: row.get("name"),
        agency_name: row.get("agency_name"),
        email: row.get("email"),
        mobile: row.get("mobile"),
        biggest_challenge: row.get("biggest_challenge"),
        task_scores,
        total_user_score: row.get("total_user_score"),
        total_preston_score: row.get("total_preston_score"),
        future_readiness_score: row.get("future_readiness_score"),
        completed_at: row.get("completed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn task_score_from_row(row: &sqlx::sqlite::SqliteRow) -> TaskScore {
    let details_str: Option<String> = row.get("details");
    TaskScore {
        task_number: row.get("task_number"),
        user_score: row.get("user_score"),
        preston_score: row.get("preston_score"),
        completed_at: row.get("completed_at"),
        // A malformed stored payload reads as no details rather than an error
        details: details_str.and_then(|s| serde_json::from_str(&s).ok()),
    }
}
