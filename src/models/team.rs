//! Team model and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A team within a group.
///
/// Membership may overlap with other teams. A recorded team score is
/// distributed to the members listed in the session's snapshot, not to the
/// current `player_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub team_name: String,
    pub group_id: String,
    pub player_ids: Vec<String>,
    pub total_score: i64,
    pub games_played: i64,
    pub created_date: DateTime<Utc>,
}

/// Request body for creating a team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeamRequest {
    pub team_name: String,
    pub group_id: String,
    #[serde(default)]
    pub player_ids: Vec<String>,
}
