//! Leaderboard and group statistics response types.

use serde::{Deserialize, Serialize};

/// One row of a player or team leaderboard.
///
/// `normalized_score` is present only on the normalized/filtered read paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub total_score: i64,
    pub games_played: i64,
    pub average_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_score: Option<f64>,
}

/// Group-level summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub total_players: i64,
    pub total_teams: i64,
    pub total_games: i64,
    pub most_played_game: Option<String>,
    pub top_player: Option<LeaderboardEntry>,
}
