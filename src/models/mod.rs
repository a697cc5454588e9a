//! Data structures for the standings tracker: teams, matches, tournaments.

mod game;
mod team;
mod tournament;

pub use game::{GameMatch, MatchResult};
pub use team::{BlobKey, Team};
pub use tournament::{Tournament, TournamentError, MAX_TEAMS};
