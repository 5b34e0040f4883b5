//! Local-disk object storage for message attachments.
//!
//! Objects are content-addressed: the stored name is the SHA-256 of the bytes
//! plus the original extension, so re-uploading a file is harmless and two
//! uploads never overwrite each other with different content.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use rapport_core::storage::ObjectStorage;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
  #[error("invalid storage directory {0:?}")]
  InvalidDirectory(String),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

/// Writes objects below `root/<directory>/` and serves them from
/// `base_url/<directory>/`.
pub struct LocalDiskStorage {
  root:     PathBuf,
  base_url: String,
}

impl LocalDiskStorage {
  pub fn new(root: impl Into<PathBuf>, base_url: impl AsRef<str>) -> Self {
    Self {
      root:     root.into(),
      base_url: base_url.as_ref().trim_end_matches('/').to_owned(),
    }
  }

  /// `<sha256 hex>[.<ext>]`. Extensions that are not short and alphanumeric
  /// are dropped.
  pub fn object_name(data: &[u8], filename: &str) -> String {
    let digest = hex::encode(Sha256::digest(data));
    let ext = Path::new(filename)
      .extension()
      .and_then(|e| e.to_str())
      .filter(|e| !e.is_empty() && e.len() <= 16 && e.chars().all(|c| c.is_ascii_alphanumeric()));
    match ext {
      Some(ext) => format!("{digest}.{}", ext.to_ascii_lowercase()),
      None => digest,
    }
  }
}

/// A single path segment of `[A-Za-z0-9_-]`.
fn is_safe_segment(s: &str) -> bool {
  !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl ObjectStorage for LocalDiskStorage {
  type Error = StorageError;

  async fn upload(&self, data: Bytes, directory: String, filename: String) -> Result<String, StorageError> {
    if !is_safe_segment(&directory) {
      return Err(StorageError::InvalidDirectory(directory));
    }
    let dir = self.root.join(&directory);
    tokio::fs::create_dir_all(&dir).await?;

    let name = Self::object_name(&data, &filename);
    tokio::fs::write(dir.join(&name), &data).await?;
    tracing::debug!(%directory, %name, bytes = data.len(), "object stored");
    Ok(format!("{}/{directory}/{name}", self.base_url))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_are_content_addressed() {
    let a = LocalDiskStorage::object_name(b"hello", "Greeting.TXT");
    let b = LocalDiskStorage::object_name(b"hello", "other.txt");
    assert_eq!(a, b);
    assert!(a.ends_with(".txt"));
    assert_eq!(a.len(), 64 + 4);

    let odd = LocalDiskStorage::object_name(b"hello", "../../etc/passwd");
    assert_eq!(odd.len(), 64);
    let odd = LocalDiskStorage::object_name(b"hello", "x.t/x");
    assert_eq!(odd.len(), 64);
  }

  #[test]
  fn directories_are_single_segments() {
    assert!(is_safe_segment("chat"));
    assert!(is_safe_segment("room_media-2"));
    assert!(!is_safe_segment(""));
    assert!(!is_safe_segment("../up"));
    assert!(!is_safe_segment("a/b"));
  }

  #[tokio::test]
  async fn upload_writes_the_file_and_returns_its_url() {
    let root = std::env::temp_dir().join(format!("rapport-media-{}", uuid::Uuid::new_v4()));
    let storage = LocalDiskStorage::new(&root, "https://cdn.example/media/");

    let url = storage
      .upload(Bytes::from_static(b"pixels"), "chat".into(), "cat.png".into())
      .await
      .unwrap();
    let name = LocalDiskStorage::object_name(b"pixels", "cat.png");
    assert_eq!(url, format!("https://cdn.example/media/chat/{name}"));
    assert_eq!(tokio::fs::read(root.join("chat").join(&name)).await.unwrap(), b"pixels");

    let rejected = storage.upload(Bytes::new(), "../escape".into(), "x".into()).await;
    assert!(matches!(rejected, Err(StorageError::InvalidDirectory(_))));

    tokio::fs::remove_dir_all(&root).await.unwrap();
  }
}
