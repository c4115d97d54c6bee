//! Team API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTeamRequest, Team};
use crate::AppState;

/// POST /api/teams - Create a new team in a group.
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<Team> {
    if request.team_name.trim().is_empty() {
        return Err(AppError::Validation("Team name is required".to_string()));
    }

    if !state.repo.group_exists(&request.group_id).await? {
        return Err(AppError::NotFound("Group not found".to_string()));
    }

    // Members must exist in the same group
    for player_id in &request.player_ids {
        let in_group = state
            .repo
            .get_player(player_id)
            .await?
            .map(|p| p.group_id == request.group_id)
            .unwrap_or(false);
        if !in_group {
            return Err(AppError::NotFound(format!(
                "Player {} not found in group",
                player_id
            )));
        }
    }

    if state
        .repo
        .find_team_by_name(&request.group_id, &request.team_name)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Team name already exists in this group".to_string(),
        ));
    }

    let team = state.repo.create_team(&request).await?;
    success(team)
}

/// GET /api/groups/:id/teams - List all teams in a group.
pub async fn list_group_teams(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Vec<Team>> {
    let teams = state.repo.list_teams(&group_id).await?;
    success(teams)
}

/// DELETE /api/teams/:id - Delete a team.
///
/// Past sessions keep their denormalized team entries and the ledger is
/// untouched.
pub async fn delete_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_team(&id).await?;
    success(())
}
