//! Group statistics API endpoint.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::models::GroupStats;
use crate::scoring;
use crate::AppState;

/// GET /api/groups/:id/stats - Overall group statistics.
///
/// `top_player` is the head of the raw player leaderboard, produced by the
/// same query and projection the leaderboard endpoint uses, so the two can
/// never disagree.
pub async fn group_stats(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<GroupStats> {
    let total_players = state.repo.count_players(&group_id).await?;
    let total_teams = state.repo.count_teams(&group_id).await?;
    let total_games = state.repo.count_sessions(&group_id).await?;
    let most_played_game = state.repo.most_played_game(&group_id).await?;

    let players = state.repo.player_leaderboard_rows(&group_id).await?;
    let top_player = scoring::player_entries(&players).into_iter().next();

    success(GroupStats {
        total_players,
        total_teams,
        total_games,
        most_played_game,
        top_player,
    })
}
