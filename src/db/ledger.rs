//! Score Ledger: running totals for players and teams.
//!
//! Every mutation is a single atomic increment on the persisted row, so
//! concurrent session writes touching the same entity commute. A mutation
//! against an entity that no longer exists is a deliberate silent no-op;
//! session deletion must not fail because a referenced player or team was
//! cleaned up out of band.

use super::Repository;
use crate::errors::AppError;
use crate::models::GameSession;

impl Repository {
    /// Atomically add to a player's running totals.
    pub async fn apply_player_delta(
        &self,
        player_id: &str,
        delta_score: i64,
        delta_games: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE players SET total_score = total_score + ?, games_played = games_played + ? WHERE id = ?"
        )
        .bind(delta_score)
        .bind(delta_games)
        .bind(player_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(player_id, "ledger delta against missing player, skipped");
        }

        Ok(())
    }

    /// Atomically add to a team's running totals.
    pub async fn apply_team_delta(
        &self,
        team_id: &str,
        delta_score: i64,
        delta_games: i64,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE teams SET total_score = total_score + ?, games_played = games_played + ? WHERE id = ?"
        )
        .bind(delta_score)
        .bind(delta_games)
        .bind(team_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(team_id, "ledger delta against missing team, skipped");
        }

        Ok(())
    }

    /// Apply a session's full ledger effect.
    ///
    /// `direction` is `+1` on session create and `-1` on delete. Deletion
    /// mirrors creation exactly: every per-entity delta is computed from the
    /// values stored on the session (including the membership snapshot used
    /// as the distribution divisor) and then signed, so a create/delete pair
    /// nets to zero even when floor division dropped remainder points.
    pub async fn apply_session_effects(
        &self,
        session: &GameSession,
        direction: i64,
    ) -> Result<(), AppError> {
        for player_score in &session.player_scores {
            self.apply_player_delta(
                &player_score.player_id,
                player_score.score * direction,
                direction,
            )
            .await?;
        }

        for team_score in &session.team_scores {
            self.apply_team_delta(&team_score.team_id, team_score.score * direction, direction)
                .await?;

            // Distribute the team score equally among the snapshot members.
            // Floor division; remainder points are never distributed.
            let member_count = team_score.player_ids.len() as i64;
            if member_count == 0 {
                continue;
            }
            let per_player = team_score.score.div_euclid(member_count);
            for player_id in &team_score.player_ids {
                self.apply_player_delta(player_id, per_player * direction, direction)
                    .await?;
            }
        }

        Ok(())
    }
}
