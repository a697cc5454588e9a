//! Match and per-team result data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One team's outcome in one match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Kill count; invalid input is clamped to 0 at the edit boundary.
    #[serde(default)]
    pub kills: u32,
    /// Finishing position 1..=12, or `None` when not yet set. Out-of-range
    /// values may appear in legacy documents; the aggregator treats them
    /// as unset.
    #[serde(default)]
    pub position: Option<i32>,
}

impl MatchResult {
    /// The default pre-play result: no kills, position unset.
    pub fn unset() -> Self {
        Self {
            kills: 0,
            position: None,
        }
    }
}

/// A single match: one result per team, in team order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub name: String,
    pub date: DateTime<Utc>,
    /// Positionally coupled to `Tournament::teams`: `results[i]` belongs
    /// to `teams[i]`.
    pub results: Vec<MatchResult>,
}

impl GameMatch {
    /// Create an empty match with one unset result per team.
    pub fn new(name: impl Into<String>, team_count: usize) -> Self {
        Self {
            name: name.into(),
            date: Utc::now(),
            results: vec![MatchResult::unset(); team_count],
        }
    }

    /// Final-match classification: case-insensitive substring match on the
    /// name. Deliberately also matches names like "Semifinal Stage";
    /// ranking highlight and export both rely on this exact rule.
    pub fn is_final(&self) -> bool {
        self.name.to_lowercase().contains("final")
    }
}
