//! Standings rows and the deterministic ranking comparator.

use crate::logic::scoring::{cumulative_details, CumulativeDetails};
use crate::models::{BlobKey, Tournament};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Visual/export treatment for ranks 1-3.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    /// Standard rank 1-3 treatment.
    Regular,
    /// Distinguished treatment for matches classified as finals.
    Final,
}

impl HighlightMode {
    /// Classification shared by renderers and exporters: any match whose
    /// name contains "final" (case-insensitive) gets final treatment.
    pub fn for_match_name(name: &str) -> Self {
        if name.to_lowercase().contains("final") {
            HighlightMode::Final
        } else {
            HighlightMode::Regular
        }
    }
}

/// One sorted standings row for a match snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    /// Index into `Tournament::teams` (teams have no id).
    pub team_index: usize,
    pub name: String,
    pub logo: Option<BlobKey>,
    pub slot: u32,
    /// Effective wins: manual override where present, else computed.
    pub wins: u32,
    pub kills: u32,
    pub position_points: u32,
    pub total: u32,
}

/// Sort teams for a snapshot: total desc, kills desc, effective wins desc,
/// slot asc. Slots are unique and immutable, so the order is strict.
/// This is the one comparator used everywhere standings are shown.
fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.total
        .cmp(&a.total)
        .then(b.kills.cmp(&a.kills))
        .then(b.wins.cmp(&a.wins))
        .then(a.slot.cmp(&b.slot))
}

/// Build sorted standings through match `upto` (inclusive; `None` = all
/// matches). Recomputes the cumulative details on demand.
pub fn standings(tournament: &Tournament, upto: Option<usize>) -> Vec<StandingRow> {
    let details: CumulativeDetails = cumulative_details(tournament, upto);
    let wins = tournament.effective_wins(&details.wins);

    let mut rows: Vec<StandingRow> = tournament
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| StandingRow {
            team_index: i,
            name: team.name.clone(),
            logo: team.logo.clone(),
            slot: team.slot,
            wins: wins[i],
            kills: details.kills[i],
            position_points: details.position_points[i],
            total: details.totals[i],
        })
        .collect();
    rows.sort_by(compare_rows);
    rows
}
