//! The object-storage collaborator used for message attachments.

use std::future::Future;

use bytes::Bytes;

/// Accepts a byte stream and returns a retrievable URL.
pub trait ObjectStorage: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `data` under `directory` and return its public URL. `filename` is
  /// a hint; implementations may rename the object.
  fn upload(
    &self,
    data: Bytes,
    directory: String,
    filename: String,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;
}
