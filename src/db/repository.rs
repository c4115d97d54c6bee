//! Database repository for CRUD operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreatePlayerRequest, CreateTeamRequest, GameSession, Group, GroupExport, Player, Team,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==================== GROUP OPERATIONS ====================

    /// Create a new group with a pre-generated unique code.
    pub async fn create_group(&self, group_name: &str, group_code: &str) -> Result<Group, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO groups (id, group_code, group_name, created_date) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(group_code)
        .bind(group_name)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal("Failed to create group".to_string()));
        }

        Ok(Group {
            id,
            group_code: group_code.to_string(),
            group_name: group_name.to_string(),
            created_date: now,
        })
    }

    /// Get a group by ID.
    pub async fn get_group(&self, id: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query(
            "SELECT id, group_code, group_name, created_date FROM groups WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(group_from_row))
    }

    /// Find a group by its join code.
    pub async fn find_group_by_code(&self, group_code: &str) -> Result<Option<Group>, AppError> {
        let row = sqlx::query(
            "SELECT id, group_code, group_name, created_date FROM groups WHERE group_code = ?",
        )
        .bind(group_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(group_from_row))
    }

    /// Check whether a group exists.
    pub async fn group_exists(&self, id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Rename a group. Renaming is the only permitted group mutation.
    pub async fn rename_group(&self, id: &str, group_name: &str) -> Result<Group, AppError> {
        let result = sqlx::query("UPDATE groups SET group_name = ? WHERE id = ?")
            .bind(group_name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Group {} not found", id)));
        }

        self.get_group(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", id)))
    }

    // ==================== PLAYER OPERATIONS ====================

    /// Create a new player.
    pub async fn create_player(&self, request: &CreatePlayerRequest) -> Result<Player, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO players (id, player_name, group_id, emoji, total_score, games_played, created_date) VALUES (?, ?, ?, ?, 0, 0, ?)"
        )
        .bind(&id)
        .bind(&request.player_name)
        .bind(&request.group_id)
        .bind(&request.emoji)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal("Failed to create player".to_string()));
        }

        Ok(Player {
            id,
            player_name: request.player_name.clone(),
            group_id: request.group_id.clone(),
            emoji: request.emoji.clone(),
            total_score: 0,
            games_played: 0,
            created_date: now,
        })
    }

    /// Get a player by ID.
    pub async fn get_player(&self, id: &str) -> Result<Option<Player>, AppError> {
        let row = sqlx::query(
            "SELECT id, player_name, group_id, emoji, total_score, games_played, created_date FROM players WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(player_from_row))
    }

    /// Find a player by name within a group (unique-name check).
    pub async fn find_player_by_name(
        &self,
        group_id: &str,
        player_name: &str,
    ) -> Result<Option<Player>, AppError> {
        let row = sqlx::query(
            "SELECT id, player_name, group_id, emoji, total_score, games_played, created_date FROM players WHERE group_id = ? AND player_name = ?"
        )
        .bind(group_id)
        .bind(player_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(player_from_row))
    }

    /// List all players in a group.
    pub async fn list_players(&self, group_id: &str) -> Result<Vec<Player>, AppError> {
        let rows = sqlx::query(
            "SELECT id, player_name, group_id, emoji, total_score, games_played, created_date FROM players WHERE group_id = ? ORDER BY player_name"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(player_from_row).collect())
    }

    /// List players in a group ordered for the raw leaderboard.
    ///
    /// The tiebreak (created_date, id) is fixed so that repeated reads and
    /// the stats top-player lookup agree on ordering.
    pub async fn player_leaderboard_rows(&self, group_id: &str) -> Result<Vec<Player>, AppError> {
        let rows = sqlx::query(
            "SELECT id, player_name, group_id, emoji, total_score, games_played, created_date FROM players WHERE group_id = ? ORDER BY total_score DESC, created_date ASC, id ASC"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(player_from_row).collect())
    }

    /// Delete a player row.
    ///
    /// Reference cleanup is a separate step; historical ledger totals of
    /// other entities are never rewound.
    pub async fn delete_player(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Player {} not found", id)));
        }

        Ok(())
    }

    /// Remove a deleted player from team rosters and session score lists
    /// within their group.
    pub async fn remove_player_references(
        &self,
        group_id: &str,
        player_id: &str,
    ) -> Result<(), AppError> {
        let teams = self.list_teams(group_id).await?;
        for team in teams {
            if team.player_ids.iter().any(|id| id == player_id) {
                let remaining: Vec<String> = team
                    .player_ids
                    .into_iter()
                    .filter(|id| id != player_id)
                    .collect();
                sqlx::query("UPDATE teams SET player_ids = ? WHERE id = ?")
                    .bind(serde_json::to_string(&remaining).unwrap_or_default())
                    .bind(&team.id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        let sessions = self.list_sessions(group_id).await?;
        for session in sessions {
            if session.player_scores.iter().any(|ps| ps.player_id == player_id) {
                let remaining: Vec<_> = session
                    .player_scores
                    .into_iter()
                    .filter(|ps| ps.player_id != player_id)
                    .collect();
                sqlx::query("UPDATE game_sessions SET player_scores = ? WHERE id = ?")
                    .bind(serde_json::to_string(&remaining).unwrap_or_default())
                    .bind(&session.id)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    // ==================== TEAM OPERATIONS ====================

    /// Create a new team.
    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<Team, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO teams (id, team_name, group_id, player_ids, total_score, games_played, created_date) VALUES (?, ?, ?, ?, 0, 0, ?)"
        )
        .bind(&id)
        .bind(&request.team_name)
        .bind(&request.group_id)
        .bind(serde_json::to_string(&request.player_ids).unwrap_or_default())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal("Failed to create team".to_string()));
        }

        Ok(Team {
            id,
            team_name: request.team_name.clone(),
            group_id: request.group_id.clone(),
            player_ids: request.player_ids.clone(),
            total_score: 0,
            games_played: 0,
            created_date: now,
        })
    }

    /// Find a team by name within a group (unique-name check).
    pub async fn find_team_by_name(
        &self,
        group_id: &str,
        team_name: &str,
    ) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(
            "SELECT id, team_name, group_id, player_ids, total_score, games_played, created_date FROM teams WHERE group_id = ? AND team_name = ?"
        )
        .bind(group_id)
        .bind(team_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(team_from_row))
    }

    /// List all teams in a group.
    pub async fn list_teams(&self, group_id: &str) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query(
            "SELECT id, team_name, group_id, player_ids, total_score, games_played, created_date FROM teams WHERE group_id = ? ORDER BY team_name"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(team_from_row).collect())
    }

    /// List teams in a group ordered for the raw leaderboard.
    pub async fn team_leaderboard_rows(&self, group_id: &str) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query(
            "SELECT id, team_name, group_id, player_ids, total_score, games_played, created_date FROM teams WHERE group_id = ? ORDER BY total_score DESC, created_date ASC, id ASC"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(team_from_row).collect())
    }

    /// Delete a team. Past sessions keep their denormalized team entries.
    pub async fn delete_team(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Team {} not found", id)));
        }

        Ok(())
    }

    // ==================== SESSION OPERATIONS ====================

    /// Insert a game session record.
    pub async fn insert_session(&self, session: &GameSession) -> Result<(), AppError> {
        let result = sqlx::query(
            "INSERT INTO game_sessions (id, group_id, game_name, game_date, player_scores, team_scores, created_date) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&session.id)
        .bind(&session.group_id)
        .bind(&session.game_name)
        .bind(session.game_date.to_rfc3339())
        .bind(serde_json::to_string(&session.player_scores).unwrap_or_default())
        .bind(serde_json::to_string(&session.team_scores).unwrap_or_default())
        .bind(session.created_date.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal(
                "Failed to create game session".to_string(),
            ));
        }

        Ok(())
    }

    /// Get a session by ID.
    pub async fn get_session(&self, id: &str) -> Result<Option<GameSession>, AppError> {
        let row = sqlx::query(
            "SELECT id, group_id, game_name, game_date, player_scores, team_scores, created_date FROM game_sessions WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(session_from_row))
    }

    /// List all sessions for a group, most recent game first.
    pub async fn list_sessions(&self, group_id: &str) -> Result<Vec<GameSession>, AppError> {
        let rows = sqlx::query(
            "SELECT id, group_id, game_name, game_date, player_scores, team_scores, created_date FROM game_sessions WHERE group_id = ? ORDER BY game_date DESC"
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(session_from_row).collect())
    }

    /// Delete a session record. The ledger reversal is a separate step.
    pub async fn delete_session_record(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM game_sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Game session {} not found", id)));
        }

        Ok(())
    }

    // ==================== STATS OPERATIONS ====================

    /// Count players in a group.
    pub async fn count_players(&self, group_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count teams in a group.
    pub async fn count_teams(&self, group_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count recorded sessions in a group.
    pub async fn count_sessions(&self, group_id: &str) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM game_sessions WHERE group_id = ?")
                .bind(group_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// The most frequently recorded game name in a group, if any.
    ///
    /// Ties are broken by storage aggregation order.
    pub async fn most_played_game(&self, group_id: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query(
            "SELECT game_name, COUNT(*) AS play_count FROM game_sessions WHERE group_id = ? GROUP BY game_name ORDER BY play_count DESC LIMIT 1"
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("game_name")))
    }

    // ==================== IMPORT OPERATIONS ====================

    /// Replace a group's players, teams, and sessions with an exported
    /// snapshot, verbatim and without referential re-validation.
    pub async fn replace_group_data(
        &self,
        group_id: &str,
        export: &GroupExport,
    ) -> Result<(), AppError> {
        // One transaction so a failed import never leaves the group truncated
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM players WHERE group_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM teams WHERE group_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM game_sessions WHERE group_id = ?")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;

        for player in &export.players {
            sqlx::query(
                "INSERT INTO players (id, player_name, group_id, emoji, total_score, games_played, created_date) VALUES (?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(&player.id)
            .bind(&player.player_name)
            .bind(group_id)
            .bind(&player.emoji)
            .bind(player.total_score)
            .bind(player.games_played)
            .bind(player.created_date.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for team in &export.teams {
            sqlx::query(
                "INSERT INTO teams (id, team_name, group_id, player_ids, total_score, games_played, created_date) VALUES (?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(&team.id)
            .bind(&team.team_name)
            .bind(group_id)
            .bind(serde_json::to_string(&team.player_ids).unwrap_or_default())
            .bind(team.total_score)
            .bind(team.games_played)
            .bind(team.created_date.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for session in &export.sessions {
            sqlx::query(
                "INSERT INTO game_sessions (id, group_id, game_name, game_date, player_scores, team_scores, created_date) VALUES (?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(&session.id)
            .bind(group_id)
            .bind(&session.game_name)
            .bind(session.game_date.to_rfc3339())
            .bind(serde_json::to_string(&session.player_scores).unwrap_or_default())
            .bind(serde_json::to_string(&session.team_scores).unwrap_or_default())
            .bind(session.created_date.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}

// Helper functions for row conversion

fn group_from_row(row: &sqlx::sqlite::SqliteRow) -> Group {
    Group {
        id: row.get("id"),
        group_code: row.get("group_code"),
        group_name: row.get("group_name"),
        created_date: parse_datetime(row.get("created_date")),
    }
}

fn player_from_row(row: &sqlx::sqlite::SqliteRow) -> Player {
    Player {
        id: row.get("id"),
        player_name: row.get("player_name"),
        group_id: row.get("group_id"),
        emoji: row.get("emoji"),
        total_score: row.get("total_score"),
        games_played: row.get("games_played"),
        created_date: parse_datetime(row.get("created_date")),
    }
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Team {
    let player_ids: String = row.get("player_ids");
    Team {
        id: row.get("id"),
        team_name: row.get("team_name"),
        group_id: row.get("group_id"),
        player_ids: parse_json(&player_ids),
        total_score: row.get("total_score"),
        games_played: row.get("games_played"),
        created_date: parse_datetime(row.get("created_date")),
    }
}

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> GameSession {
    let player_scores: String = row.get("player_scores");
    let team_scores: String = row.get("team_scores");
    GameSession {
        id: row.get("id"),
        group_id: row.get("group_id"),
        game_name: row.get("game_name"),
        game_date: parse_datetime(row.get("game_date")),
        player_scores: parse_json(&player_scores),
        team_scores: parse_json(&team_scores),
        created_date: parse_datetime(row.get("created_date")),
    }
}

fn parse_json<T: serde::de::DeserializeOwned + Default>(s: &str) -> T {
    serde_json::from_str(s).unwrap_or_default()
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}
