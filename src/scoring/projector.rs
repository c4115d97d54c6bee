//! Leaderboard and stats projection.
//!
//! Thin composition over the ledger rows and the normalization engine.
//! Display rounding happens here, at the presentation boundary, and nowhere
//! inside the engine.

use std::collections::HashMap;

use crate::models::{LeaderboardEntry, Player, Team};

use super::EntityTotals;

/// `total / games`, or exactly `0` when no games were played.
pub fn average_score(total_score: i64, games_played: i64) -> f64 {
    if games_played > 0 {
        total_score as f64 / games_played as f64
    } else {
        0.0
    }
}

/// Round to 2 decimal places for raw averages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 3 decimal places for normalized totals.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Raw player leaderboard entries from ledger rows (already sorted by the
/// repository query).
pub fn player_entries(players: &[Player]) -> Vec<LeaderboardEntry> {
    players
        .iter()
        .map(|p| LeaderboardEntry {
            id: p.id.clone(),
            name: p.player_name.clone(),
            total_score: p.total_score,
            games_played: p.games_played,
            average_score: round2(average_score(p.total_score, p.games_played)),
            normalized_score: None,
        })
        .collect()
}

/// Raw team leaderboard entries from ledger rows.
pub fn team_entries(teams: &[Team]) -> Vec<LeaderboardEntry> {
    teams
        .iter()
        .map(|t| LeaderboardEntry {
            id: t.id.clone(),
            name: t.team_name.clone(),
            total_score: t.total_score,
            games_played: t.games_played,
            average_score: round2(average_score(t.total_score, t.games_played)),
            normalized_score: None,
        })
        .collect()
}

/// Leaderboard entries from normalized engine output.
///
/// `names` maps entity id to current display name, used for entities the
/// session snapshots could not name (players seen only through team
/// membership).
pub fn normalized_entries(
    totals: &[EntityTotals],
    names: &HashMap<String, String>,
) -> Vec<LeaderboardEntry> {
    totals
        .iter()
        .map(|t| {
            let name = if t.name.is_empty() {
                names.get(&t.id).cloned().unwrap_or_default()
            } else {
                t.name.clone()
            };
            LeaderboardEntry {
                id: t.id.clone(),
                name,
                total_score: t.raw_score,
                games_played: t.games_played,
                average_score: round2(average_score(t.raw_score, t.games_played)),
                normalized_score: Some(round3(t.normalized_score)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn average_is_zero_with_zero_games() {
        assert_eq!(average_score(0, 0), 0.0);
        assert_eq!(average_score(42, 0), 0.0);
        assert!(average_score(42, 0).is_finite());
    }

    #[test]
    fn average_divides_when_games_played() {
        assert_eq!(average_score(10, 4), 2.5);
        assert_eq!(average_score(-9, 3), -3.0);
    }

    #[test]
    fn rounding_is_presentation_only() {
        assert_eq!(round2(2.456), 2.46);
        assert_eq!(round3(0.33333), 0.333);
        assert_eq!(round3(1.0), 1.0);
    }

    #[test]
    fn normalized_entries_resolve_missing_names() {
        let totals = vec![
            EntityTotals {
                id: "p1".to_string(),
                name: "Alice".to_string(),
                normalized_score: 1.5,
                raw_score: 30,
                games_played: 2,
            },
            EntityTotals {
                id: "p2".to_string(),
                name: String::new(),
                normalized_score: 0.5,
                raw_score: 10,
                games_played: 1,
            },
        ];
        let mut names = HashMap::new();
        names.insert("p2".to_string(), "Bob".to_string());

        let entries = normalized_entries(&totals, &names);

        assert_eq!(entries[0].name, "Alice");
        assert_eq!(entries[1].name, "Bob");
        assert_eq!(entries[0].normalized_score, Some(1.5));
        assert_eq!(entries[1].average_score, 10.0);
    }

    #[test]
    fn zero_game_player_row_projects_zero_average() {
        let players = vec![Player {
            id: "p1".to_string(),
            player_name: "Idle".to_string(),
            group_id: "g1".to_string(),
            emoji: "😀".to_string(),
            total_score: 0,
            games_played: 0,
            created_date: Utc::now(),
        }];

        let entries = player_entries(&players);

        assert_eq!(entries[0].average_score, 0.0);
        assert_eq!(entries[0].normalized_score, None);
    }
}
