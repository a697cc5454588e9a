//! Integration tests for the file-backed blob store and data-URL codec.

use esports_standings_web::{decode_data_url, encode_data_url, BlobStore, FileBlobStore};
use std::path::PathBuf;

/// Fresh directory under the system temp dir; removed on drop.
struct TempDir(PathBuf);

impl TempDir {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("blobs-test-{}", uuid::Uuid::new_v4()));
        Self(dir)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[test]
fn data_url_codec_round_trips() {
    let url = encode_data_url(&[1, 2, 3, 255], "image/png");
    assert!(url.starts_with("data:image/png;base64,"));
    let (mime, bytes) = decode_data_url(&url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, vec![1, 2, 3, 255]);
}

#[test]
fn decode_rejects_non_data_urls() {
    assert_eq!(decode_data_url("https://example.com/a.png"), None);
    assert_eq!(decode_data_url("data:image/png,rawpayload"), None);
    assert_eq!(decode_data_url("data:image/png;base64,!!!"), None);
}

#[test]
fn save_resolve_delete_cycle() {
    let tmp = TempDir::new();
    let mut store = FileBlobStore::new(&tmp.0).unwrap();

    let key = store.save(&[9, 8, 7], "image/webp").unwrap();
    assert!(key.starts_with("img:"));

    let src = store.resolve(&key).unwrap();
    assert_eq!(src, encode_data_url(&[9, 8, 7], "image/webp"));
    // second resolution serves the cached handle
    assert_eq!(store.resolve(&key), Some(src));

    store.delete(&key).unwrap();
    assert_eq!(store.resolve(&key), None);
}

#[test]
fn deleting_a_missing_blob_is_not_an_error() {
    let tmp = TempDir::new();
    let mut store = FileBlobStore::new(&tmp.0).unwrap();
    let key = store.save(&[1], "image/png").unwrap();
    store.delete(&key).unwrap();
    // already gone: still fine
    store.delete(&key).unwrap();
    // garbage keys never resolve and never fail deletion
    store.delete("not-a-key").unwrap();
    assert_eq!(store.resolve("not-a-key"), None);
}

#[test]
fn save_from_data_url_stores_the_decoded_bytes() {
    let tmp = TempDir::new();
    let mut store = FileBlobStore::new(&tmp.0).unwrap();
    let url = encode_data_url(&[4, 5, 6], "image/jpeg");
    let key = store.save_data_url(&url).unwrap();
    assert_eq!(store.resolve(&key), Some(url));
}
