//! Tournament: teams, matches, manual win overrides, and the mutations
//! that keep them structurally consistent.

use crate::models::game::{GameMatch, MatchResult};
use crate::models::team::{BlobKey, Team};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of team slots per tournament.
pub const MAX_TEAMS: usize = 12;

/// Errors that can occur during tournament/store operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// A required name was empty after trimming.
    EmptyName,
    /// A tournament with this name already exists (names are unique, case-insensitive).
    DuplicateTournamentName,
    /// More than MAX_TEAMS team slots requested.
    TooManyTeams { max: usize, given: usize },
    /// No tournament at this index.
    TournamentNotFound(usize),
    /// An operation needed an active tournament and none is selected.
    NoActiveTournament,
    /// No match at this index.
    MatchNotFound(usize),
    /// No team at this index.
    TeamNotFound(usize),
    /// Series creation needs at least one match.
    InvalidSeriesCount,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::EmptyName => write!(f, "Name is required"),
            TournamentError::DuplicateTournamentName => {
                write!(f, "A tournament with this name already exists")
            }
            TournamentError::TooManyTeams { max, given } => {
                write!(f, "At most {} teams allowed (given {})", max, given)
            }
            TournamentError::TournamentNotFound(i) => write!(f, "No tournament at index {}", i),
            TournamentError::NoActiveTournament => write!(f, "No tournament selected"),
            TournamentError::MatchNotFound(i) => write!(f, "No match at index {}", i),
            TournamentError::TeamNotFound(i) => write!(f, "No team at index {}", i),
            TournamentError::InvalidSeriesCount => write!(f, "Enter at least one match"),
        }
    }
}

/// A tournament: a roster of up to 12 teams and an ordered list of matches.
///
/// Structural invariants, restored by every mutation before it returns:
/// - `results[i]` of every match belongs to `teams[i]` (positional coupling);
/// - `manual_wins.len() == teams.len()` (lazily repaired, overrides reset
///   whenever the roster size changes).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub name: String,
    pub date_created: DateTime<Utc>,
    pub teams: Vec<Team>,
    pub matches: Vec<GameMatch>,
    /// Sparse manual win overrides, parallel to `teams`.
    #[serde(default)]
    pub manual_wins: Vec<Option<u32>>,
}

impl Tournament {
    /// Create a tournament with the given roster. Name must be non-empty;
    /// duplicate-name checking happens at the store level where the full
    /// list is visible.
    pub fn new(name: impl Into<String>, teams: Vec<Team>) -> Result<Self, TournamentError> {
        let name = name.into();
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        if teams.len() > MAX_TEAMS {
            return Err(TournamentError::TooManyTeams {
                max: MAX_TEAMS,
                given: teams.len(),
            });
        }
        let manual_wins = vec![None; teams.len()];
        Ok(Self {
            name,
            date_created: Utc::now(),
            teams,
            matches: Vec::new(),
            manual_wins,
        })
    }

    /// Append an empty match (all kills 0, all positions unset). Returns
    /// the new match index.
    pub fn add_match(&mut self, name: impl Into<String>) -> Result<usize, TournamentError> {
        let name = name.into();
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        self.matches.push(GameMatch::new(name, self.teams.len()));
        Ok(self.matches.len() - 1)
    }

    /// Bulk-create `count` empty matches: "Match 1" .. "Match {count-1}",
    /// last one named "Final". A series of one is just "Final".
    pub fn add_series(&mut self, count: usize) -> Result<(), TournamentError> {
        if count < 1 {
            return Err(TournamentError::InvalidSeriesCount);
        }
        for i in 1..=count {
            let name = if i == count {
                "Final".to_string()
            } else {
                format!("Match {i}")
            };
            self.matches.push(GameMatch::new(name, self.teams.len()));
        }
        Ok(())
    }

    /// Rename a match. The new name participates in final-match
    /// classification, so it must be non-empty.
    pub fn rename_match(
        &mut self,
        match_idx: usize,
        name: impl Into<String>,
    ) -> Result<(), TournamentError> {
        let name = name.into();
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(TournamentError::EmptyName);
        }
        let m = self
            .matches
            .get_mut(match_idx)
            .ok_or(TournamentError::MatchNotFound(match_idx))?;
        m.name = name;
        Ok(())
    }

    /// Remove a match. Current-match pointer fixup is the store's job.
    pub fn delete_match(&mut self, match_idx: usize) -> Result<(), TournamentError> {
        if match_idx >= self.matches.len() {
            return Err(TournamentError::MatchNotFound(match_idx));
        }
        self.matches.remove(match_idx);
        Ok(())
    }

    /// Edit one team's result in one match. Position is clamped into
    /// 1..=12 when set; `None` unsets it.
    pub fn set_result(
        &mut self,
        match_idx: usize,
        team_idx: usize,
        kills: u32,
        position: Option<i32>,
    ) -> Result<(), TournamentError> {
        if team_idx >= self.teams.len() {
            return Err(TournamentError::TeamNotFound(team_idx));
        }
        let m = self
            .matches
            .get_mut(match_idx)
            .ok_or(TournamentError::MatchNotFound(match_idx))?;
        // results are sized at match creation, but repair defensively if a
        // legacy document came in short
        if m.results.len() < self.teams.len() {
            m.results.resize(self.teams.len(), MatchResult::unset());
        }
        m.results[team_idx] = MatchResult {
            kills,
            position: position.map(|p| p.clamp(1, 12)),
        };
        Ok(())
    }

    /// Set a manual win override for one team. Negative input clamps to 0.
    /// The override replaces the computed win count in display and sort
    /// until the roster size changes.
    pub fn set_manual_win(&mut self, team_idx: usize, value: i64) -> Result<(), TournamentError> {
        if team_idx >= self.teams.len() {
            return Err(TournamentError::TeamNotFound(team_idx));
        }
        self.ensure_manual_wins();
        self.manual_wins[team_idx] = Some(value.max(0) as u32);
        Ok(())
    }

    /// Clear a manual win override, falling back to the computed count.
    pub fn clear_manual_win(&mut self, team_idx: usize) -> Result<(), TournamentError> {
        if team_idx >= self.teams.len() {
            return Err(TournamentError::TeamNotFound(team_idx));
        }
        self.ensure_manual_wins();
        self.manual_wins[team_idx] = None;
        Ok(())
    }

    /// Remove a team and the matching result entry from every match, so
    /// the positional coupling holds. Overrides do not survive a
    /// roster-size change. Returns the removed team's logo key so the
    /// caller can release the blob.
    pub fn remove_team(&mut self, team_idx: usize) -> Result<Option<BlobKey>, TournamentError> {
        if team_idx >= self.teams.len() {
            return Err(TournamentError::TeamNotFound(team_idx));
        }
        let removed = self.teams.remove(team_idx);
        for m in &mut self.matches {
            if team_idx < m.results.len() {
                m.results.remove(team_idx);
            }
        }
        self.manual_wins = vec![None; self.teams.len()];
        Ok(removed.logo)
    }

    /// Repair rule: whenever `manual_wins` and `teams` diverge in length,
    /// reset to an all-absent sequence of the roster's length.
    pub fn ensure_manual_wins(&mut self) {
        if self.manual_wins.len() != self.teams.len() {
            self.manual_wins = vec![None; self.teams.len()];
        }
    }

    /// Effective win counts: the override where present, else the computed
    /// count. `computed` comes from the cumulative aggregator and must be
    /// one entry per team.
    pub fn effective_wins(&self, computed: &[u32]) -> Vec<u32> {
        self.teams
            .iter()
            .enumerate()
            .map(|(i, _)| match self.manual_wins.get(i) {
                Some(Some(v)) => *v,
                _ => computed.get(i).copied().unwrap_or(0),
            })
            .collect()
    }
}
