//! Blob store collaborator: binary image data behind opaque keys.
//!
//! One content-addressable-by-key store replaces the two independent
//! image stores of the legacy app. Keys look like `img:{uuid}` and stay
//! stable for the blob's lifetime. Resolution returns a displayable
//! data-URL source and is idempotent: repeated resolution of the same key
//! serves the cached handle without re-reading.

use crate::models::{BlobKey, Tournament};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// Errors from blob save/delete. Resolution failures are not errors:
/// `resolve` returns `None` and the caller drops the image placeholder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BlobError {
    /// Underlying file I/O failed.
    Io(String),
    /// Input was not a decodable base64 data URL.
    InvalidData,
}

impl std::fmt::Display for BlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobError::Io(e) => write!(f, "Blob store I/O error: {}", e),
            BlobError::InvalidData => write!(f, "Not a valid base64 data URL"),
        }
    }
}

/// Key-value blob store: put/get/delete binary data by opaque key.
pub trait BlobStore {
    /// Store raw bytes with their mime type; returns the new opaque key.
    fn save(&mut self, bytes: &[u8], mime: &str) -> Result<BlobKey, BlobError>;

    /// Resolve a key to a displayable source (data URL). `None` for
    /// missing or corrupt blobs; never fails the caller's render.
    fn resolve(&mut self, key: &str) -> Option<String>;

    /// Delete a blob. Deleting an already-missing blob is not an error.
    fn delete(&mut self, key: &str) -> Result<(), BlobError>;

    /// Store an inline `data:` URL (decoded, then saved as bytes).
    fn save_data_url(&mut self, data_url: &str) -> Result<BlobKey, BlobError> {
        let (mime, bytes) = decode_data_url(data_url).ok_or(BlobError::InvalidData)?;
        self.save(&bytes, &mime)
    }
}

/// Decode a `data:{mime};base64,{payload}` URL into mime and bytes.
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

/// Encode bytes back into a displayable data URL.
pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// File-backed blob store: one `{uuid}.dat` file per blob under a data
/// directory, holding the data-URL text.
pub struct FileBlobStore {
    dir: PathBuf,
    url_cache: HashMap<BlobKey, String>,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Self {
            dir,
            url_cache: HashMap::new(),
        })
    }

    /// Map a key to its backing file. Keys that don't parse as
    /// `img:{uuid}` resolve to nothing (also keeps arbitrary key strings
    /// from escaping the data dir).
    fn path_for(&self, key: &str) -> Option<PathBuf> {
        let id = key.strip_prefix("img:")?;
        let id = Uuid::parse_str(id).ok()?;
        Some(self.dir.join(format!("{id}.dat")))
    }
}

impl BlobStore for FileBlobStore {
    fn save(&mut self, bytes: &[u8], mime: &str) -> Result<BlobKey, BlobError> {
        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{id}.dat"));
        fs::write(&path, encode_data_url(bytes, mime)).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(format!("img:{id}"))
    }

    fn resolve(&mut self, key: &str) -> Option<String> {
        if let Some(url) = self.url_cache.get(key) {
            return Some(url.clone());
        }
        let path = self.path_for(key)?;
        let url = fs::read_to_string(path).ok()?;
        if !url.starts_with("data:") {
            return None;
        }
        self.url_cache.insert(key.to_string(), url.clone());
        Some(url)
    }

    fn delete(&mut self, key: &str) -> Result<(), BlobError> {
        self.url_cache.remove(key);
        let Some(path) = self.path_for(key) else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::Io(e.to_string())),
        }
    }
}

/// One-time legacy migration: any team logo stored as an inline `data:`
/// string (not yet a blob key) is pushed into the blob store and replaced
/// with the returned key. A failed save is logged and the inline value
/// left in place for the next load. Returns the number of migrated logos.
pub fn migrate_inline_logos(tournaments: &mut [Tournament], blobs: &mut dyn BlobStore) -> usize {
    let mut migrated = 0;
    for t in tournaments {
        for team in &mut t.teams {
            let Some(logo) = &team.logo else { continue };
            if !logo.starts_with("data:") {
                continue;
            }
            match blobs.save_data_url(logo) {
                Ok(key) => {
                    team.logo = Some(key);
                    migrated += 1;
                }
                Err(e) => log::error!("Logo migration failed for team '{}': {}", team.name, e),
            }
        }
    }
    migrated
}
