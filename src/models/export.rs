//! Export/import payload.

use serde::{Deserialize, Serialize};

use super::{GameSession, Group, Player, Team};

/// Full snapshot of a group's data.
///
/// Import replays this verbatim: the group's players, teams, and sessions
/// are truncated and reinserted without referential re-validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupExport {
    pub group: Group,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    pub sessions: Vec<GameSession>,
}
