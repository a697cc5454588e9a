//! Scoring and ranking: the cumulative aggregator and the standings sort.

mod ranking;
mod scoring;

pub use ranking::{standings, HighlightMode, StandingRow};
pub use scoring::{cumulative_details, points_for_position, CumulativeDetails, POSITION_POINTS};
