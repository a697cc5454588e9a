//! Export collaborator seam: rendered standings tables and the raster
//! file-name contract. Actual PNG production happens client-side (the
//! rasterizer snapshots a rendered element); the core owns the table
//! contents, the highlight classification, and the file name.

use crate::logic::{standings, HighlightMode};
use crate::models::{Tournament, TournamentError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Errors from a rasterizer collaborator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExportError {
    /// The rasterizer could not produce or write the image.
    RasterizeFailed(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::RasterizeFailed(e) => write!(f, "Export failed: {}", e),
        }
    }
}

/// A standings table ready for display or export: sorted rows of cell
/// text plus the highlight mode for ranks 1-3.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTable {
    pub title: String,
    pub highlight: HighlightMode,
    pub header: Vec<String>,
    /// One row per team, already in rank order. Columns match `header`.
    pub rows: Vec<Vec<String>>,
}

/// Rasterize-to-image collaborator: snapshots a rendered table to a
/// downloadable raster image. Completes or fails atomically; not
/// cancellable mid-flight.
pub trait Rasterizer {
    /// Produce a PNG named `{file_name_base}_{timestamp}.png` and return
    /// its path.
    fn rasterize(&self, table: &RenderedTable, file_name_base: &str)
        -> Result<PathBuf, ExportError>;
}

/// The export file name: `{base}_{Y-m-d_H_M_S}.png`.
pub fn export_file_name(base: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.png", base, at.format("%Y-%m-%d_%H_%M_%S"))
}

/// Render the standings table for one match snapshot: cumulative values
/// through `match_idx`, sorted by the standard comparator, ranks
/// zero-padded to two digits. Highlight follows the match-name
/// classification.
pub fn render_standings_table(
    tournament: &Tournament,
    match_idx: usize,
) -> Result<RenderedTable, TournamentError> {
    let m = tournament
        .matches
        .get(match_idx)
        .ok_or(TournamentError::MatchNotFound(match_idx))?;

    let rows = standings(tournament, Some(match_idx))
        .into_iter()
        .enumerate()
        .map(|(rank, r)| {
            vec![
                format!("{:02}", rank + 1),
                r.name,
                r.wins.to_string(),
                r.kills.to_string(),
                r.position_points.to_string(),
                r.total.to_string(),
            ]
        })
        .collect();

    Ok(RenderedTable {
        title: format!("{}_{}", tournament.name, m.name),
        highlight: HighlightMode::for_match_name(&m.name),
        header: ["Rank", "Team", "Wins", "Kills", "Point", "Total"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows,
    })
}
