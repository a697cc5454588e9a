//! Position-point lookup and the cumulative aggregator.

use crate::models::Tournament;

/// Points awarded solely by finishing rank, 1st through 12th.
pub const POSITION_POINTS: [u32; 12] = [12, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0];

/// Points for a raw position value. Out-of-range (or legacy garbage)
/// positions score 0, same as unset.
pub fn points_for_position(position: i32) -> u32 {
    if (1..=12).contains(&position) {
        POSITION_POINTS[(position - 1) as usize]
    } else {
        0
    }
}

/// Per-team running totals through some match index. All four vectors are
/// parallel to `Tournament::teams`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CumulativeDetails {
    /// kills + position points per team.
    pub totals: Vec<u32>,
    pub kills: Vec<u32>,
    pub position_points: Vec<u32>,
    /// Computed first-place finishes. Manual overrides are NOT applied
    /// here; see `Tournament::effective_wins`.
    pub wins: Vec<u32>,
}

impl CumulativeDetails {
    fn zeroed(len: usize) -> Self {
        Self {
            totals: vec![0; len],
            kills: vec![0; len],
            position_points: vec![0; len],
            wins: vec![0; len],
        }
    }
}

/// Fold matches `0..=upto` into per-team running totals. `None` means all
/// matches. Pure: recomputed on demand for every displayed snapshot.
///
/// A set, in-range position contributes its table points and (for
/// position 1) a win; an unset or out-of-range position contributes only
/// the kills.
pub fn cumulative_details(tournament: &Tournament, upto: Option<usize>) -> CumulativeDetails {
    let len = tournament.teams.len();
    let mut acc = CumulativeDetails::zeroed(len);

    let match_count = tournament.matches.len();
    if match_count == 0 {
        return acc;
    }
    let upto = match upto {
        Some(i) => i.min(match_count - 1),
        None => match_count - 1,
    };

    for m in &tournament.matches[..=upto] {
        for (idx, res) in m.results.iter().enumerate().take(len) {
            let k = res.kills;
            match res.position {
                Some(pos) if (1..=12).contains(&pos) => {
                    let pts = points_for_position(pos);
                    acc.totals[idx] += k + pts;
                    acc.position_points[idx] += pts;
                    if pos == 1 {
                        acc.wins[idx] += 1;
                    }
                }
                _ => {
                    // position not set: only the kills count
                    acc.totals[idx] += k;
                }
            }
            acc.kills[idx] += k;
        }
    }

    acc
}
