//! Game session model and request types.
//!
//! A session is an immutable event-log entry. Player names and team
//! membership are denormalized into it at record time so later edits to the
//! live entities never alter history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One player's score within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: String,
    pub player_name: String,
    pub score: i64,
}

/// One team's score within a session.
///
/// `player_ids` is the membership snapshot at record time; session deletion
/// reverses the distribution using this snapshot, never current membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamScore {
    pub team_id: String,
    pub team_name: String,
    pub score: i64,
    pub player_ids: Vec<String>,
}

/// A recorded game session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub group_id: String,
    pub game_name: String,
    pub game_date: DateTime<Utc>,
    #[serde(default)]
    pub player_scores: Vec<PlayerScore>,
    #[serde(default)]
    pub team_scores: Vec<TeamScore>,
    pub created_date: DateTime<Utc>,
}

/// Request body for recording a game session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub group_id: String,
    pub game_name: String,
    pub game_date: DateTime<Utc>,
    #[serde(default)]
    pub player_scores: Vec<PlayerScore>,
    #[serde(default)]
    pub team_scores: Vec<TeamScore>,
}
