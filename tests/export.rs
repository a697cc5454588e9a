//! Integration tests for rendered export tables and the file-name contract.

use chrono::{TimeZone, Utc};
use esports_standings_web::{
    export_file_name, render_standings_table, ExportError, HighlightMode, Rasterizer, RenderedTable,
    Team, Tournament, TournamentError,
};
use std::path::PathBuf;

fn tournament_with_teams(n: usize) -> Tournament {
    let teams: Vec<Team> = (0..n)
        .map(|i| Team::new(format!("T{i}"), None, i as u32 + 1))
        .collect();
    Tournament::new("Export Cup", teams).unwrap()
}

#[test]
fn file_name_embeds_base_and_timestamp() {
    let at = Utc.with_ymd_and_hms(2026, 8, 24, 10, 30, 5).unwrap();
    assert_eq!(
        export_file_name("Export Cup_Final", at),
        "Export Cup_Final_2026-08-24_10_30_05.png"
    );
}

#[test]
fn rendered_table_is_sorted_with_zero_padded_ranks() {
    let mut t = tournament_with_teams(3);
    t.add_match("Match 1").unwrap();
    t.set_result(0, 0, 1, Some(3)).unwrap(); // total 9
    t.set_result(0, 1, 2, Some(1)).unwrap(); // total 14
    t.set_result(0, 2, 0, Some(2)).unwrap(); // total 9

    let table = render_standings_table(&t, 0).unwrap();
    assert_eq!(table.title, "Export Cup_Match 1");
    assert_eq!(table.highlight, HighlightMode::Regular);
    assert_eq!(
        table.header,
        vec!["Rank", "Team", "Wins", "Kills", "Point", "Total"]
    );
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[0], vec!["01", "T1", "1", "2", "12", "14"]);
    // totals tie at 9, kills 1 > 0
    assert_eq!(table.rows[1][1], "T0");
    assert_eq!(table.rows[2], vec!["03", "T2", "0", "0", "9", "9"]);
}

#[test]
fn final_matches_get_final_highlight_in_exports() {
    let mut t = tournament_with_teams(1);
    t.add_match("Match 1").unwrap();
    t.add_match("Grand Final").unwrap();

    assert_eq!(
        render_standings_table(&t, 0).unwrap().highlight,
        HighlightMode::Regular
    );
    assert_eq!(
        render_standings_table(&t, 1).unwrap().highlight,
        HighlightMode::Final
    );
}

#[test]
fn export_table_shows_effective_wins() {
    let mut t = tournament_with_teams(1);
    t.add_match("Match 1").unwrap();
    t.set_result(0, 0, 3, Some(1)).unwrap();
    t.set_manual_win(0, 7).unwrap();

    let table = render_standings_table(&t, 0).unwrap();
    assert_eq!(table.rows[0][2], "7");
}

/// Rasterizer double: records what it was asked to produce instead of
/// drawing pixels.
struct FakeRasterizer;

impl Rasterizer for FakeRasterizer {
    fn rasterize(
        &self,
        table: &RenderedTable,
        file_name_base: &str,
    ) -> Result<PathBuf, ExportError> {
        if table.rows.is_empty() {
            return Err(ExportError::RasterizeFailed("empty table".to_string()));
        }
        let at = Utc.with_ymd_and_hms(2026, 8, 24, 12, 0, 0).unwrap();
        Ok(PathBuf::from(export_file_name(file_name_base, at)))
    }
}

#[test]
fn rasterizer_collaborator_consumes_the_rendered_table() {
    let mut t = tournament_with_teams(2);
    t.add_match("Final").unwrap();
    t.set_result(0, 0, 1, Some(1)).unwrap();

    let table = render_standings_table(&t, 0).unwrap();
    let path = FakeRasterizer.rasterize(&table, &table.title).unwrap();
    assert_eq!(
        path,
        PathBuf::from("Export Cup_Final_2026-08-24_12_00_00.png")
    );

    let empty = RenderedTable {
        title: "x".to_string(),
        highlight: HighlightMode::Regular,
        header: vec![],
        rows: vec![],
    };
    assert_eq!(
        FakeRasterizer.rasterize(&empty, "x").unwrap_err(),
        ExportError::RasterizeFailed("empty table".to_string())
    );
}

#[test]
fn export_of_a_missing_match_fails() {
    let t = tournament_with_teams(1);
    assert_eq!(
        render_standings_table(&t, 0).unwrap_err(),
        TournamentError::MatchNotFound(0)
    );
}
