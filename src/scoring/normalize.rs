//! Per-game min-max normalization of session scores.
//!
//! Raw score scales vary wildly by game, so summing raw scores would let a
//! high-scoring game dominate the leaderboard. Every recorded score is
//! remapped into `[0, 1]` relative to the observed min/max of its game-name
//! bucket; each game then contributes comparably regardless of native scale.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::GameSession;

/// Optional session selection criteria for the normalized read paths.
///
/// `game_name` matches exactly (case- and whitespace-sensitive). The date
/// window is closed-open: a bare `year` covers that calendar year, and
/// `year` + `month` covers that calendar month. `month` without `year` is
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub game_name: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl SessionFilter {
    /// True when no criteria are set.
    pub fn is_empty(&self) -> bool {
        self.game_name.is_none() && self.year.is_none()
    }

    /// The closed-open `[start, end)` window implied by year/month, if any.
    fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let year = self.year?;
        match self.month {
            Some(month) => {
                let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()?;
                let end = if month == 12 {
                    Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?
                } else {
                    Utc.with_ymd_and_hms(year, month + 1, 1, 0, 0, 0).single()?
                };
                Some((start, end))
            }
            None => {
                let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
                let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?;
                Some((start, end))
            }
        }
    }

    /// Whether a session satisfies all set criteria.
    pub fn matches(&self, session: &GameSession) -> bool {
        if let Some(name) = &self.game_name {
            if session.game_name != *name {
                return false;
            }
        }
        if let Some((start, end)) = self.window() {
            if session.game_date < start || session.game_date >= end {
                return false;
            }
        }
        true
    }

    /// Retain only the sessions that satisfy the filter.
    pub fn apply(&self, sessions: Vec<GameSession>) -> Vec<GameSession> {
        if self.is_empty() {
            return sessions;
        }
        sessions.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Normalized aggregate for a single player or team.
///
/// `raw_score` is a side channel summed independently of normalization,
/// attributing team points to members with the same floor division the
/// ledger uses.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTotals {
    pub id: String,
    pub name: String,
    pub normalized_score: f64,
    pub raw_score: i64,
    pub games_played: i64,
}

/// Observed `(min, range)` per game-name bucket.
///
/// Player and team scores share one pool. A bucket whose scores are all
/// equal (including a single score) gets `range = 1`, mapping every entry
/// to exactly `0.0`.
fn bucket_ranges(sessions: &[GameSession]) -> HashMap<String, (f64, f64)> {
    let mut extremes: HashMap<String, (i64, i64)> = HashMap::new();

    for session in sessions {
        let scores = session
            .player_scores
            .iter()
            .map(|ps| ps.score)
            .chain(session.team_scores.iter().map(|ts| ts.score));

        for score in scores {
            extremes
                .entry(session.game_name.clone())
                .and_modify(|(min, max)| {
                    *min = (*min).min(score);
                    *max = (*max).max(score);
                })
                .or_insert((score, score));
        }
    }

    extremes
        .into_iter()
        .map(|(game, (min, max))| {
            let range = if max != min { (max - min) as f64 } else { 1.0 };
            (game, (min as f64, range))
        })
        .collect()
}

/// Accumulates per-entity totals in first-appearance order so repeated
/// computations over the same session list are deterministic.
#[derive(Default)]
struct Accumulator {
    order: Vec<String>,
    entries: HashMap<String, EntityTotals>,
}

impl Accumulator {
    fn add(&mut self, id: &str, name: Option<&str>, normalized: f64, raw: i64) {
        if !self.entries.contains_key(id) {
            self.order.push(id.to_string());
            self.entries.insert(
                id.to_string(),
                EntityTotals {
                    id: id.to_string(),
                    name: String::new(),
                    normalized_score: 0.0,
                    raw_score: 0,
                    games_played: 0,
                },
            );
        }
        if let Some(entry) = self.entries.get_mut(id) {
            if entry.name.is_empty() {
                if let Some(name) = name {
                    entry.name = name.to_string();
                }
            }
            entry.normalized_score += normalized;
            entry.raw_score += raw;
            entry.games_played += 1;
        }
    }

    /// Descending by normalized total; stable, so first appearance in the
    /// session scan breaks ties.
    fn into_sorted(mut self) -> Vec<EntityTotals> {
        let mut totals: Vec<EntityTotals> = self
            .order
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect();
        totals.sort_by(|a, b| {
            b.normalized_score
                .partial_cmp(&a.normalized_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        totals
    }
}

/// Normalized per-player aggregates over the given sessions.
///
/// Individual scores contribute `(s - min) / range` directly. A team score
/// is normalized once and split as a true fractional share among the
/// session's snapshot members. Players absent from every session are absent
/// from the output. Names come from the session snapshots; members seen
/// only through team snapshots carry an empty name for the caller to
/// resolve.
pub fn normalized_player_totals(sessions: &[GameSession]) -> Vec<EntityTotals> {
    let ranges = bucket_ranges(sessions);
    let mut acc = Accumulator::default();

    for session in sessions {
        let Some(&(min, range)) = ranges.get(&session.game_name) else {
            continue;
        };

        for ps in &session.player_scores {
            let normalized = (ps.score as f64 - min) / range;
            acc.add(&ps.player_id, Some(&ps.player_name), normalized, ps.score);
        }

        for ts in &session.team_scores {
            let member_count = ts.player_ids.len() as i64;
            if member_count == 0 {
                continue;
            }
            let normalized = (ts.score as f64 - min) / range;
            let share = normalized / member_count as f64;
            let raw_share = ts.score.div_euclid(member_count);
            for player_id in &ts.player_ids {
                acc.add(player_id, None, share, raw_share);
            }
        }
    }

    acc.into_sorted()
}

/// Normalized per-team aggregates over the given sessions.
pub fn normalized_team_totals(sessions: &[GameSession]) -> Vec<EntityTotals> {
    let ranges = bucket_ranges(sessions);
    let mut acc = Accumulator::default();

    for session in sessions {
        let Some(&(min, range)) = ranges.get(&session.game_name) else {
            continue;
        };

        for ts in &session.team_scores {
            let normalized = (ts.score as f64 - min) / range;
            acc.add(&ts.team_id, Some(&ts.team_name), normalized, ts.score);
        }
    }

    acc.into_sorted()
}
