//! Export and import API endpoints.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{leaderboard, success, ApiResult};
use crate::errors::AppError;
use crate::models::GroupExport;
use crate::scoring::{self, SessionFilter};
use crate::AppState;

/// GET /api/groups/:id/export - Full JSON snapshot of a group's data.
pub async fn export_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<GroupExport> {
    let group = state
        .repo
        .get_group(&group_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

    let players = state.repo.list_players(&group_id).await?;
    let teams = state.repo.list_teams(&group_id).await?;
    let sessions = state.repo.list_sessions(&group_id).await?;

    success(GroupExport {
        group,
        players,
        teams,
        sessions,
    })
}

/// POST /api/groups/:id/import - Replay an exported snapshot.
///
/// Truncates the group's players, teams, and sessions and reinserts the
/// payload verbatim. Denormalized snapshots are trusted; no referential
/// re-validation is performed.
pub async fn import_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(payload): Json<GroupExport>,
) -> ApiResult<()> {
    if !state.repo.group_exists(&group_id).await? {
        return Err(AppError::NotFound(format!("Group {} not found", group_id)));
    }

    state.repo.replace_group_data(&group_id, &payload).await?;

    tracing::info!(
        group_id = %group_id,
        players = payload.players.len(),
        teams = payload.teams.len(),
        sessions = payload.sessions.len(),
        "group data imported"
    );
    success(())
}

/// GET /api/groups/:id/export/csv - Tabular leaderboard export.
///
/// One row per player and team with both raw and normalized columns. The
/// normalized values come from the same unfiltered engine computation the
/// leaderboard endpoints use.
pub async fn export_group_csv(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Result<Response, AppError> {
    let group = state
        .repo
        .get_group(&group_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

    let filter = SessionFilter::default();
    let normalized_players =
        leaderboard::normalized_player_board(&state.repo, &group_id, &filter).await?;
    let normalized_teams =
        leaderboard::normalized_team_board(&state.repo, &group_id, &filter).await?;

    let player_norms: std::collections::HashMap<&str, f64> = normalized_players
        .iter()
        .filter_map(|e| e.normalized_score.map(|n| (e.id.as_str(), n)))
        .collect();
    let team_norms: std::collections::HashMap<&str, f64> = normalized_teams
        .iter()
        .filter_map(|e| e.normalized_score.map(|n| (e.id.as_str(), n)))
        .collect();

    let players = state.repo.player_leaderboard_rows(&group_id).await?;
    let teams = state.repo.team_leaderboard_rows(&group_id).await?;

    let mut csv = String::from(
        "Type,ID,Name,Games Played,Raw Total Score,Raw Average Score,Normalized Total Score\n",
    );
    for entry in scoring::player_entries(&players) {
        let normalized = player_norms.get(entry.id.as_str()).copied().unwrap_or(0.0);
        csv.push_str(&csv_row("Player", &entry.id, &entry.name, entry.games_played, entry.total_score, entry.average_score, normalized));
    }
    for entry in scoring::team_entries(&teams) {
        let normalized = team_norms.get(entry.id.as_str()).copied().unwrap_or(0.0);
        csv.push_str(&csv_row("Team", &entry.id, &entry.name, entry.games_played, entry.total_score, entry.average_score, normalized));
    }

    let filename = format!("{}-leaderboard.csv", group.group_code.to_lowercase());
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response())
}

fn csv_row(
    kind: &str,
    id: &str,
    name: &str,
    games_played: i64,
    total_score: i64,
    average_score: f64,
    normalized_score: f64,
) -> String {
    format!(
        "{},{},{},{},{},{:.2},{:.3}\n",
        kind,
        csv_escape(id),
        csv_escape(name),
        games_played,
        total_score,
        average_score,
        normalized_score
    )
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
