//! Player model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A player within a group.
///
/// `total_score` and `games_played` are running ledger totals, mutated only
/// through session create/delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub player_name: String,
    pub group_id: String,
    pub emoji: String,
    pub total_score: i64,
    pub games_played: i64,
    pub created_date: DateTime<Utc>,
}

/// Request body for adding a player to a group.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlayerRequest {
    pub player_name: String,
    pub group_id: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
}

fn default_emoji() -> String {
    "😀".to_string()
}
