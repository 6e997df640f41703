//! Game session API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{ApiResponse, ApiResult};
use crate::db::NewSession;
use crate::errors::AppError;
use crate::models::{
    CreateSessionRequest, GameSession, LeaderboardEntry, RecordTaskScoreRequest, SessionRank,
};
use crate::scoring;
use crate::AppState;

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

/// POST /api/game/session - Create a new game session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<GameSession> {
    let name = required(&request.name, "name")?;
    let agency_name = required(&request.agency_name, "agencyName")?;
    let email = required(&request.email, "email")?;

    let new = NewSession {
        name: name.to_string(),
        agency_name: agency_name.to_string(),
        email: email.to_string(),
        mobile: request.mobile.clone(),
        biggest_challenge: request.biggest_challenge.clone(),
    };

    let session = state.repo.create_session(&new).await?;
    tracing::info!("Created game session {}", session.id);
    Ok(ApiResponse::created(session))
}

/// GET /api/game/session/:id - Get session details.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GameSession> {
    let session = state
        .repo
        .get_session(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game session {} not found", id)))?;

    Ok(ApiResponse::new(session))
}

/// PUT /api/game/session/:id/task - Record a task score for a session.
pub async fn update_task_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecordTaskScoreRequest>,
) -> ApiResult<GameSession> {
    let task_number = request.task_number.ok_or_else(|| {
        AppError::Validation("taskNumber is required".to_string())
    })?;
    let user_score = request.user_score.ok_or_else(|| {
        AppError::Validation("userScore is required".to_string())
    })?;
    let preston_score = request.preston_score.ok_or_else(|| {
        AppError::Validation("prestonScore is required".to_string())
    })?;

    if !(1..=scoring::TASK_COUNT as i64).contains(&task_number) {
        return Err(AppError::Validation(format!(
            "taskNumber must be between 1 and {}, got {}",
            scoring::TASK_COUNT,
            task_number
        )));
    }
    if user_score < 0 || preston_score < 0 {
        return Err(AppError::Validation(
            "Scores must be non-negative".to_string(),
        ));
    }
    if let Some(details) = &request.details {
        if details.task_number() != task_number {
            return Err(AppError::Validation(format!(
                "details payload is for task {} but taskNumber is {}",
                details.task_number(),
                task_number
            )));
        }
    }

    let session = state
        .repo
        .record_task_score(&id, task_number, user_score, preston_score, request.details.as_ref())
        .await?;

    tracing::info!(
        "Session {} task {} scored {} (total now {})",
        id,
        task_number,
        user_score,
        session.total_user_score
    );

    Ok(ApiResponse::new(session))
}

/// Query parameters for the leaderboard endpoint.
#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    #[serde(default)]
    pub limit: Option<i64>,
}

/// GET /api/game/leaderboard - Top completed sessions.
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let limit = params
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(state.config.leaderboard_limit);

    let entries = state.repo.leaderboard(limit).await?;
    Ok(ApiResponse::new(entries))
}

/// GET /api/game/session/:id/rank - Rank of one session among completed sessions.
pub async fn get_session_rank(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionRank> {
    let session = state
        .repo
        .get_session(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game session {} not found", id)))?;

    let rank = state.repo.session_rank(&session).await?;
    let message = if rank.is_none() {
        Some("Session not yet completed".to_string())
    } else {
        None
    };

    Ok(ApiResponse::new(SessionRank {
        rank,
        message,
        total_score: session.total_user_score,
        future_readiness_score: session.future_readiness_score,
    }))
}
