//! Data transfer objects exchanged with ownCloud.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a WebDAV resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
  /// A regular file.
  File,
  /// A collection (folder).
  Directory,
}

/// Metadata for one file or folder, as returned by `stat` and directory
/// listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
  /// Path relative to the user's root, with a leading `/` and no trailing `/`.
  pub filename: String,
  /// Last path segment of `filename`.
  pub basename: String,
  /// Raw `getlastmodified` value (RFC 1123 date).
  pub lastmod: Option<String>,
  /// Size in bytes; `0` for folders.
  pub size: u64,
  #[serde(rename = "type")]
  /// File or directory.
  pub entry_type: EntryType,
  /// Entity tag without surrounding quotes.
  pub etag: Option<String>,
  /// MIME type reported by the server (files only).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mime: Option<String>,
}

impl FileStat {
  /// Whether this entry is a folder.
  pub fn is_directory(&self) -> bool {
    self.entry_type == EntryType::Directory
  }
}

/// Unwrap an OCS response envelope.
///
/// Returns `ocs.data` when it is present and not `null`; otherwise the
/// document is handed back untouched so malformed envelopes still reach the
/// caller.
pub fn unwrap_ocs_data(response: Value) -> Value {
  match response.pointer("/ocs/data") {
    Some(data) if !data.is_null() => data.clone(),
    _ => response,
  }
}

/// The `ocs.meta.message` of an OCS document, if it carries a non-empty one.
pub fn ocs_error_message(response: &Value) -> Option<&str> {
  response
    .pointer("/ocs/meta/message")
    .and_then(Value::as_str)
    .filter(|message| !message.is_empty())
}
