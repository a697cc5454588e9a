//! Esports standings tracker: library with models, scoring/ranking logic,
//! persistence, and the blob/export collaborator seams.

pub mod blobs;
pub mod export;
pub mod logic;
pub mod models;
pub mod store;

pub use blobs::{decode_data_url, encode_data_url, BlobError, BlobStore, FileBlobStore};
pub use export::{export_file_name, render_standings_table, ExportError, Rasterizer, RenderedTable};
pub use logic::{
    cumulative_details, points_for_position, standings, CumulativeDetails, HighlightMode,
    StandingRow, POSITION_POINTS,
};
pub use models::{BlobKey, GameMatch, MatchResult, Team, Tournament, TournamentError, MAX_TEAMS};
pub use store::{FileKv, KvStore, MemoryKv, StandingsStore, StorageError, TeamSpec};
