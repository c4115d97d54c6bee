//! Player API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreatePlayerRequest, Player};
use crate::AppState;

/// POST /api/players - Add a new player to a group.
pub async fn create_player(
    State(state): State<AppState>,
    Json(request): Json<CreatePlayerRequest>,
) -> ApiResult<Player> {
    if request.player_name.trim().is_empty() {
        return Err(AppError::Validation("Player name is required".to_string()));
    }

    if !state.repo.group_exists(&request.group_id).await? {
        return Err(AppError::NotFound("Group not found".to_string()));
    }

    if state
        .repo
        .find_player_by_name(&request.group_id, &request.player_name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Player name already exists in this group".to_string(),
        ));
    }

    let player = state.repo.create_player(&request).await?;
    success(player)
}

/// GET /api/groups/:id/players - List all players in a group.
pub async fn list_group_players(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<Player>> {
    let players = state.repo.list_players(&group_id).await?;
    success(players)
}

/// DELETE /api/players/:id - Delete a player.
///
/// Cascades into team rosters and session score lists. Ledger totals of
/// other entities are intentionally left untouched; historical sessions
/// already contributed to them.
pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let player = state
        .repo
        .get_player(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Player {} not found", id)))?;

    state.repo.delete_player(&id).await?;
    state
        .repo
        .remove_player_references(&player.group_id, &id)
        .await?;

    tracing::info!(player_id = %id, group_id = %player.group_id, "player deleted");
    success(())
}
