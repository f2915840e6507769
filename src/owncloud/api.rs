//! Trait definitions for the two ownCloud surfaces the node talks to.
//!
//! The dispatcher only ever sees these traits, so tests can swap in
//! in-memory fakes for the real HTTP clients.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::models::FileStat;

/// File and folder operations over WebDAV.
///
/// All paths are relative to the user's WebDAV root and start with `/`.
#[async_trait]
pub trait WebDavApi: Send + Sync {
  /// Write `data` to `path`.
  ///
  /// # Arguments
  /// * `path` - Destination file.
  /// * `data` - Complete file content.
  /// * `overwrite` - When `false`, the write fails if `path` already exists.
  async fn put_file_contents(&self, path: &str, data: Vec<u8>, overwrite: bool) -> Result<()>;

  /// Read the complete content of the file at `path`.
  async fn get_file_contents(&self, path: &str) -> Result<Vec<u8>>;

  /// Delete the file or folder at `path`.
  async fn delete_file(&self, path: &str) -> Result<()>;

  /// Create the folder `path`. The parent must exist.
  async fn create_directory(&self, path: &str) -> Result<()>;

  /// List the direct children of the folder at `path`.
  ///
  /// # Returns
  /// One [`FileStat`] per child; the folder itself is not included.
  async fn get_directory_contents(&self, path: &str) -> Result<Vec<FileStat>>;

  /// Move (or rename) `from` to `to`, replacing an existing destination.
  async fn move_file(&self, from: &str, to: &str) -> Result<()>;

  /// Copy `from` to `to`, replacing an existing destination.
  async fn copy_file(&self, from: &str, to: &str) -> Result<()>;

  /// Fetch the metadata of `path`.
  async fn stat(&self, path: &str) -> Result<FileStat>;
}

/// HTTP verbs used against the OCS API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcsMethod {
  Get,
  Post,
  Put,
  Delete,
}

impl OcsMethod {
  /// Upper-case verb as sent on the wire.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Get => "GET",
      Self::Post => "POST",
      Self::Put => "PUT",
      Self::Delete => "DELETE",
    }
  }
}

impl fmt::Display for OcsMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<OcsMethod> for reqwest::Method {
  fn from(method: OcsMethod) -> Self {
    match method {
      OcsMethod::Get => reqwest::Method::GET,
      OcsMethod::Post => reqwest::Method::POST,
      OcsMethod::Put => reqwest::Method::PUT,
      OcsMethod::Delete => reqwest::Method::DELETE,
    }
  }
}

/// Authenticated JSON requests against OCS endpoints.
#[async_trait]
pub trait OcsApi: Send + Sync {
  /// Issue a single OCS request.
  ///
  /// # Arguments
  /// * `method` - HTTP verb.
  /// * `endpoint` - Path below the host, e.g.
  ///   `/ocs/v2.php/apps/files_sharing/api/v1/shares`.
  /// * `body` - Optional JSON body.
  /// * `query` - Extra query parameters; `format=json` is always appended.
  ///
  /// # Returns
  /// The unwrapped `ocs.data` payload, or the raw document when the envelope
  /// is missing.
  ///
  /// # Errors
  /// An [`OcsApiError`](super::error::OcsApiError) when the server explains
  /// the failure in `ocs.meta.message`, otherwise the transport error.
  async fn request(
    &self,
    method: OcsMethod,
    endpoint: &str,
    body: Option<&Value>,
    query: &[(&str, &str)],
  ) -> Result<Value>;
}
