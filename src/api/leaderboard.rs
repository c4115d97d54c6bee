//! Leaderboard API endpoints.
//!
//! Unfiltered raw boards read the persisted ledger totals directly. Any
//! filter, and the dedicated normalized variants, recompute from the raw
//! session log through the normalization engine on every request.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::db::Repository;
use crate::errors::AppError;
use crate::models::LeaderboardEntry;
use crate::scoring::{
    self, normalized_player_totals, normalized_team_totals, SessionFilter,
};
use crate::AppState;

/// Query parameters shared by the leaderboard endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardQuery {
    pub game_name: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl LeaderboardQuery {
    fn into_filter(self) -> Result<SessionFilter, AppError> {
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(AppError::Validation(
                    "month must be between 1 and 12".to_string(),
                ));
            }
        }
        Ok(SessionFilter {
            game_name: self.game_name,
            year: self.year,
            month: self.month,
        })
    }
}

/// GET /api/groups/:id/leaderboard/players - Player leaderboard.
///
/// Raw ledger order when unfiltered; normalized recomputation when any
/// filter is supplied.
pub async fn player_leaderboard(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let filter = query.into_filter()?;

    if filter.is_empty() {
        let players = state.repo.player_leaderboard_rows(&group_id).await?;
        return success(scoring::player_entries(&players));
    }

    success(normalized_player_board(&state.repo, &group_id, &filter).await?)
}

/// GET /api/groups/:id/leaderboard/players/normalized - Normalized player
/// leaderboard, with the same optional filters.
pub async fn player_leaderboard_normalized(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let filter = query.into_filter()?;
    success(normalized_player_board(&state.repo, &group_id, &filter).await?)
}

/// GET /api/groups/:id/leaderboard/teams - Team leaderboard.
pub async fn team_leaderboard(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let filter = query.into_filter()?;

    if filter.is_empty() {
        let teams = state.repo.team_leaderboard_rows(&group_id).await?;
        return success(scoring::team_entries(&teams));
    }

    success(normalized_team_board(&state.repo, &group_id, &filter).await?)
}

/// GET /api/groups/:id/leaderboard/teams/normalized - Normalized team
/// leaderboard.
pub async fn team_leaderboard_normalized(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    let filter = query.into_filter()?;
    success(normalized_team_board(&state.repo, &group_id, &filter).await?)
}

/// Normalized player board; shared with the CSV export so both read paths
/// produce identical numbers.
pub(crate) async fn normalized_player_board(
    repo: &Repository,
    group_id: &str,
    filter: &SessionFilter,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let sessions = filter.apply(repo.list_sessions(group_id).await?);
    let totals = normalized_player_totals(&sessions);

    // Current display names for players the snapshots could not name
    let names: HashMap<String, String> = repo
        .list_players(group_id)
        .await?
        .into_iter()
        .map(|p| (p.id, p.player_name))
        .collect();

    Ok(scoring::normalized_entries(&totals, &names))
}

/// Normalized team board; shared with the CSV export.
pub(crate) async fn normalized_team_board(
    repo: &Repository,
    group_id: &str,
    filter: &SessionFilter,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let sessions = filter.apply(repo.list_sessions(group_id).await?);
    let totals = normalized_team_totals(&sessions);

    let names: HashMap<String, String> = repo
        .list_teams(group_id)
        .await?
        .into_iter()
        .map(|t| (t.id, t.team_name))
        .collect();

    Ok(scoring::normalized_entries(&totals, &names))
}
