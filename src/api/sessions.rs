//! Game session API endpoints: the session recorder.
//!
//! Creation persists the session first, then drives the ledger; deletion
//! reverses the ledger from the stored record, then removes it. Neither
//! pair is wrapped in a cross-record transaction; a failure between the two
//! steps leaves the ledger diagnosably under- or over-applied rather than
//! silently corrupt.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateSessionRequest, GameSession};
use crate::AppState;

/// POST /api/game-sessions - Record a new game session with scores.
///
/// Player and team ids inside the score lists are stored verbatim; only the
/// group reference is validated.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<GameSession> {
    if request.game_name.trim().is_empty() {
        return Err(AppError::Validation("Game name is required".to_string()));
    }

    if !state.repo.group_exists(&request.group_id).await? {
        return Err(AppError::NotFound("Group not found".to_string()));
    }

    let session = GameSession {
        id: uuid::Uuid::new_v4().to_string(),
        group_id: request.group_id,
        game_name: request.game_name,
        game_date: request.game_date,
        player_scores: request.player_scores,
        team_scores: request.team_scores,
        created_date: Utc::now(),
    };

    state.repo.insert_session(&session).await?;
    state.repo.apply_session_effects(&session, 1).await?;

    tracing::info!(session_id = %session.id, game_name = %session.game_name, "session recorded");
    success(session)
}

/// GET /api/groups/:id/game-sessions - List a group's sessions, most recent
/// game first.
pub async fn list_group_sessions(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<GameSession>> {
    let sessions = state.repo.list_sessions(&group_id).await?;
    success(sessions)
}

/// DELETE /api/game-sessions/:id - Delete a session and reverse its ledger
/// effect.
///
/// Reversal uses the session's own stored scores and membership snapshots,
/// so the same floored per-player amounts added on create are subtracted
/// here regardless of how team membership has changed since.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let session = state
        .repo
        .get_session(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Game session {} not found", id)))?;

    state.repo.apply_session_effects(&session, -1).await?;
    state.repo.delete_session_record(&id).await?;

    tracing::info!(session_id = %id, "session deleted");
    success(())
}
