//! Tournament store: the in-memory collection, its lifecycle operations,
//! and whole-document persistence to a local key-value store.

use crate::blobs::{migrate_inline_logos, BlobStore};
use crate::models::{BlobKey, Team, Tournament, TournamentError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const KEY_TOURNAMENTS: &str = "ex_tournaments";
const KEY_ACTIVE_TOURNAMENT: &str = "ex_active_tournament_idx";
const KEY_CURRENT_MATCH: &str = "ex_current_match_idx";

/// Errors from persisting the store document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StorageError {
    /// The document could not be serialized.
    Serialize(String),
    /// The backing store rejected the write (e.g. out of space). In-memory
    /// state is kept but not durable until a successful write.
    Write(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Serialize(e) => write!(f, "Could not serialize store: {}", e),
            StorageError::Write(e) => write!(f, "Storing failed: {}", e),
        }
    }
}

/// Local key-value persistence: string values by string key.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory key-value store (tests, ephemeral runs).
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed key-value store: one `{key}.json` file per key under a
/// data directory. Keys are the fixed document keys above, so the mapping
/// to file names is direct.
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::Write(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value).map_err(|e| StorageError::Write(e.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Write(e.to_string())),
        }
    }
}

/// Roster entry for tournament creation: logos are already saved to the
/// blob store at this point, so only the key travels.
#[derive(Clone, Debug, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    #[serde(default)]
    pub logo: Option<BlobKey>,
}

/// The process-wide store: all tournaments plus the active-tournament and
/// current-match pointers. All mutations keep the structural invariants
/// of the model intact and are followed by a whole-document `save`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsStore {
    pub tournaments: Vec<Tournament>,
    pub active_tournament: Option<usize>,
    pub current_match: Option<usize>,
}

impl StandingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tournament(&self, idx: usize) -> Result<&Tournament, TournamentError> {
        self.tournaments
            .get(idx)
            .ok_or(TournamentError::TournamentNotFound(idx))
    }

    /// Mutable access also fires the lazy manual-wins length repair.
    pub fn tournament_mut(&mut self, idx: usize) -> Result<&mut Tournament, TournamentError> {
        let t = self
            .tournaments
            .get_mut(idx)
            .ok_or(TournamentError::TournamentNotFound(idx))?;
        t.ensure_manual_wins();
        Ok(t)
    }

    /// Create a tournament and make it active. Fails when another
    /// tournament already uses the name (case-insensitive).
    pub fn create_tournament(
        &mut self,
        name: &str,
        specs: Vec<TeamSpec>,
    ) -> Result<usize, TournamentError> {
        let trimmed = name.trim();
        let key = normalized_name(trimmed);
        let is_duplicate = self
            .tournaments
            .iter()
            .any(|t| normalized_name(&t.name) == key);
        if is_duplicate {
            return Err(TournamentError::DuplicateTournamentName);
        }
        let teams: Vec<Team> = specs
            .into_iter()
            .enumerate()
            .map(|(i, s)| Team::new(s.name, s.logo, i as u32 + 1))
            .collect();
        self.tournaments.push(Tournament::new(trimmed, teams)?);
        self.active_tournament = Some(self.tournaments.len() - 1);
        self.current_match = None;
        Ok(self.tournaments.len() - 1)
    }

    /// Delete a tournament and release every team's logo blob. A missing
    /// blob is logged and skipped, never fatal.
    pub fn delete_tournament(
        &mut self,
        idx: usize,
        blobs: &mut dyn BlobStore,
    ) -> Result<(), TournamentError> {
        if idx >= self.tournaments.len() {
            return Err(TournamentError::TournamentNotFound(idx));
        }
        let removed = self.tournaments.remove(idx);
        for key in removed.teams.iter().filter_map(|t| t.logo.as_deref()) {
            if let Err(e) = blobs.delete(key) {
                log::warn!("Could not release logo blob {}: {}", key, e);
            }
        }
        // Only deletions at or before the active index move the view:
        // earlier indices shift it down in place, deleting the active one
        // falls back to its predecessor, later indices leave it alone.
        match self.active_tournament {
            Some(active) if idx == active => {
                self.active_tournament = if self.tournaments.is_empty() {
                    None
                } else {
                    Some(active.saturating_sub(1))
                };
                self.current_match = None;
            }
            Some(active) if idx < active => {
                self.active_tournament = Some(active - 1);
            }
            _ => {}
        }
        Ok(())
    }

    /// Switch the active tournament; the current match resets.
    pub fn select_tournament(&mut self, idx: Option<usize>) -> Result<(), TournamentError> {
        if let Some(i) = idx {
            if i >= self.tournaments.len() {
                return Err(TournamentError::TournamentNotFound(i));
            }
        }
        self.active_tournament = idx;
        self.current_match = None;
        Ok(())
    }

    /// Point at a match of the active tournament (the one open for edits).
    pub fn select_match(&mut self, idx: Option<usize>) -> Result<(), TournamentError> {
        if let Some(m) = idx {
            let t_idx = self
                .active_tournament
                .ok_or(TournamentError::NoActiveTournament)?;
            let t = self.tournament(t_idx)?;
            if m >= t.matches.len() {
                return Err(TournamentError::MatchNotFound(m));
            }
        }
        self.current_match = idx;
        Ok(())
    }

    /// Append an empty match and open it when the tournament is active.
    pub fn add_match(&mut self, t_idx: usize, name: &str) -> Result<usize, TournamentError> {
        let m_idx = self.tournament_mut(t_idx)?.add_match(name)?;
        if self.active_tournament == Some(t_idx) {
            self.current_match = Some(m_idx);
        }
        Ok(m_idx)
    }

    /// Bulk-create a series of matches, the last one named "Final", and
    /// open the last one when the tournament is active.
    pub fn add_series(&mut self, t_idx: usize, count: usize) -> Result<(), TournamentError> {
        let t = self.tournament_mut(t_idx)?;
        t.add_series(count)?;
        let last = t.matches.len() - 1;
        if self.active_tournament == Some(t_idx) {
            self.current_match = Some(last);
        }
        Ok(())
    }

    pub fn rename_match(
        &mut self,
        t_idx: usize,
        m_idx: usize,
        name: &str,
    ) -> Result<(), TournamentError> {
        self.tournament_mut(t_idx)?.rename_match(m_idx, name)
    }

    /// Delete a match, shifting the current-match pointer if it pointed
    /// at or after the deleted index (active tournament only).
    pub fn delete_match(&mut self, t_idx: usize, m_idx: usize) -> Result<(), TournamentError> {
        self.tournament_mut(t_idx)?.delete_match(m_idx)?;
        if self.active_tournament == Some(t_idx) {
            self.current_match = match self.current_match {
                Some(c) if c == m_idx => None,
                Some(c) if c > m_idx => Some(c - 1),
                other => other,
            };
        }
        Ok(())
    }

    /// Explicit result-edit command: kills and optional position for one
    /// team in one match.
    pub fn set_result(
        &mut self,
        t_idx: usize,
        m_idx: usize,
        team_idx: usize,
        kills: u32,
        position: Option<i32>,
    ) -> Result<(), TournamentError> {
        self.tournament_mut(t_idx)?
            .set_result(m_idx, team_idx, kills, position)
    }

    pub fn set_manual_win(
        &mut self,
        t_idx: usize,
        team_idx: usize,
        value: i64,
    ) -> Result<(), TournamentError> {
        self.tournament_mut(t_idx)?.set_manual_win(team_idx, value)
    }

    pub fn clear_manual_win(
        &mut self,
        t_idx: usize,
        team_idx: usize,
    ) -> Result<(), TournamentError> {
        self.tournament_mut(t_idx)?.clear_manual_win(team_idx)
    }

    /// Remove a team (and its result column from every match), releasing
    /// its logo blob if it had one.
    pub fn remove_team(
        &mut self,
        t_idx: usize,
        team_idx: usize,
        blobs: &mut dyn BlobStore,
    ) -> Result<(), TournamentError> {
        let logo = self.tournament_mut(t_idx)?.remove_team(team_idx)?;
        if let Some(key) = logo {
            if let Err(e) = blobs.delete(&key) {
                log::warn!("Could not release logo blob {}: {}", key, e);
            }
        }
        Ok(())
    }

    /// Self-healing pass: collapse tournaments sharing a case-insensitive
    /// name, keeping the first occurrence. Run once per load. Returns the
    /// number of duplicates dropped.
    pub fn deduplicate_by_name(&mut self) -> usize {
        let mut seen: Vec<String> = Vec::new();
        let before = self.tournaments.len();
        self.tournaments.retain(|t| {
            let key = normalized_name(&t.name);
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
        let removed = before - self.tournaments.len();
        if removed > 0 {
            if let Some(a) = self.active_tournament {
                if a >= self.tournaments.len() {
                    self.active_tournament = if self.tournaments.is_empty() {
                        None
                    } else {
                        Some(0)
                    };
                    self.current_match = None;
                }
            }
        }
        removed
    }

    /// Load the persisted document and run the self-healing passes:
    /// inline-logo migration, manual-wins length repair, duplicate-name
    /// collapse, pointer validation, and default selection.
    pub fn load(kv: &dyn KvStore, blobs: &mut dyn BlobStore) -> Self {
        let mut tournaments: Vec<Tournament> = match kv.get(KEY_TOURNAMENTS) {
            Some(doc) => serde_json::from_str(&doc).unwrap_or_else(|e| {
                log::warn!("Discarding unreadable tournament document: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        let migrated = migrate_inline_logos(&mut tournaments, blobs);
        if migrated > 0 {
            log::info!("Migrated {} inline logo(s) to the blob store", migrated);
        }
        for t in &mut tournaments {
            t.ensure_manual_wins();
        }

        let mut store = Self {
            tournaments,
            active_tournament: read_index(kv, KEY_ACTIVE_TOURNAMENT),
            current_match: read_index(kv, KEY_CURRENT_MATCH),
        };
        store.deduplicate_by_name();

        // Drop out-of-range pointers rather than failing the load.
        if let Some(a) = store.active_tournament {
            if a >= store.tournaments.len() {
                store.active_tournament = None;
                store.current_match = None;
            }
        }
        if let (Some(a), Some(m)) = (store.active_tournament, store.current_match) {
            if m >= store.tournaments[a].matches.len() {
                store.current_match = None;
            }
        }

        // Default selection: first tournament, its latest match.
        if store.active_tournament.is_none() && !store.tournaments.is_empty() {
            store.active_tournament = Some(0);
            if store.current_match.is_none() && !store.tournaments[0].matches.is_empty() {
                store.current_match = Some(store.tournaments[0].matches.len() - 1);
            }
        }

        store
    }

    /// Persist the whole document. Every mutation re-serializes the full
    /// tournament list; there is no incremental write.
    pub fn save(&self, kv: &mut dyn KvStore) -> Result<(), StorageError> {
        let doc = serde_json::to_string(&self.tournaments)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        kv.set(KEY_TOURNAMENTS, &doc)?;
        write_index(kv, KEY_ACTIVE_TOURNAMENT, self.active_tournament)?;
        write_index(kv, KEY_CURRENT_MATCH, self.current_match)?;
        Ok(())
    }
}

/// Uniqueness key for tournament names: the same normalization guards
/// creation and the load-time duplicate collapse, so a name accepted at
/// creation is never dropped on the next load.
fn normalized_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn read_index(kv: &dyn KvStore, key: &str) -> Option<usize> {
    kv.get(key)?.trim().parse().ok()
}

fn write_index(kv: &mut dyn KvStore, key: &str, value: Option<usize>) -> Result<(), StorageError> {
    match value {
        Some(v) => kv.set(key, &v.to_string()),
        None => kv.remove(key),
    }
}
