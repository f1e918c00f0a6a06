//! Final standings derived from the participant store and the game log.

use crate::game_runner::MatchResult;
use crate::log::TournamentLog;
use crate::participant::ParticipantStore;
use serde::Serialize;

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub name: String,
    pub rating: f64,
    pub games: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: f64,
}

/// Builds standings sorted by rating (highest first), ties broken by name.
pub fn compute(store: &ParticipantStore, log: &TournamentLog) -> Vec<Standing> {
    let mut rows: Vec<Standing> = store
        .iter()
        .map(|p| Standing {
            name: p.name.clone(),
            rating: p.rating(),
            games: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            points: 0.0,
        })
        .collect();

    for record in log.records() {
        let sides = [
            (record.white(), record.result()),
            (record.black(), record.result().flipped()),
        ];
        for (name, result) in sides {
            if let Some(row) = rows.iter_mut().find(|r| r.name == name) {
                row.games += 1;
                row.points += result.score();
                match result {
                    MatchResult::WinFirst => row.wins += 1,
                    MatchResult::Draw => row.draws += 1,
                    MatchResult::WinSecond => row.losses += 1,
                }
            }
        }
    }

    rows.sort_by(|a, b| {
        b.rating
            .partial_cmp(&a.rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

/// Renders standings as a fixed-width text table.
pub fn render_table(rows: &[Standing]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<4} {:<30} {:>8} {:>6} {:>4} {:>4} {:>4} {:>7}\n",
        "#", "Participant", "Elo", "Games", "W", "D", "L", "Points"
    ));
    out.push_str(&"-".repeat(74));
    out.push('\n');
    for (rank, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<30} {:>8.1} {:>6} {:>4} {:>4} {:>4} {:>7.1}\n",
            rank + 1,
            row.name,
            row.rating,
            row.games,
            row.wins,
            row.draws,
            row.losses,
            row.points
        ));
    }
    out
}
