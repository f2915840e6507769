//! File and folder operations over WebDAV.

use std::collections::VecDeque;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use super::error::NodeOperationError;
use super::items::BinaryData;
use super::operation::FileOperation;
use super::outcome::OperationOutcome;
use super::params::ItemParameters;
use crate::owncloud::paths::download_file_name;
use crate::owncloud::{FileStat, WebDavApi};

/// Run one file operation for one item.
///
/// # Errors
/// Returns parameter errors, a [`NodeOperationError`] for a missing upload
/// payload, and any WebDAV failure unchanged.
pub async fn run(webdav: &dyn WebDavApi, operation: FileOperation, params: &ItemParameters<'_>) -> Result<OperationOutcome> {
  match operation {
    FileOperation::Upload => {
      let path = target(operation, params)?;
      let field = params.string("binaryPropertyName")?;
      let options = params.collection("options")?;
      let binary = params.item().binary.get(&field).ok_or_else(|| {
        NodeOperationError::new(format!("No binary data found in field '{field}'."), params.index())
      })?;
      let overwrite = options.get("overwrite") != Some(&Value::Bool(false));

      webdav
        .put_file_contents(&path, binary.data.clone(), overwrite)
        .await?;
      Ok(OperationOutcome::PathAffected { path })
    }
    FileOperation::Download => {
      let path = target(operation, params)?;
      let field = params.string("binaryProperty")?;
      let bytes = webdav.get_file_contents(&path).await?;
      let data = BinaryData::from_bytes(bytes, download_file_name(&path));
      Ok(OperationOutcome::Downloaded { field, data })
    }
    FileOperation::Delete => {
      let path = target(operation, params)?;
      webdav.delete_file(&path).await?;
      Ok(OperationOutcome::PathAffected { path })
    }
    FileOperation::CreateFolder => {
      let path = target(operation, params)?;
      webdav.create_directory(&path).await?;
      Ok(OperationOutcome::PathAffected { path })
    }
    FileOperation::List => {
      let path = target(operation, params)?;
      Ok(OperationOutcome::Entries(webdav.get_directory_contents(&path).await?))
    }
    FileOperation::Move => {
      let path = target(operation, params)?;
      let to = params.string("destinationPath")?;
      webdav.move_file(&path, &to).await?;
      Ok(OperationOutcome::Transferred { from: path, to })
    }
    FileOperation::Copy => {
      let path = target(operation, params)?;
      let to = params.string("destinationPath")?;
      webdav.copy_file(&path, &to).await?;
      Ok(OperationOutcome::Transferred { from: path, to })
    }
    FileOperation::Stat => {
      let path = target(operation, params)?;
      Ok(OperationOutcome::Stat(webdav.stat(&path).await?))
    }
    FileOperation::Search => search(webdav, params).await,
  }
}

/// The `path` parameter every operation except search works on.
fn target(operation: FileOperation, params: &ItemParameters<'_>) -> Result<String> {
  let path = params.path("path")?;
  debug!(operation = operation.as_str(), path = %path, item = params.index(), "File operation");
  Ok(path)
}

/// Breadth-first name search below `searchPath`.
///
/// Matches files and folders whose basename contains the query,
/// case-insensitively, in traversal order.
async fn search(webdav: &dyn WebDavApi, params: &ItemParameters<'_>) -> Result<OperationOutcome> {
  let query = params.string("searchQuery")?.to_lowercase();
  let root = match params.string_or_empty("searchPath")? {
    path if path.is_empty() => "/".to_string(),
    path => path,
  };
  debug!(query = %query, root = %root, item = params.index(), "Searching");

  let mut matches: Vec<FileStat> = Vec::new();
  let mut pending = VecDeque::from([root]);

  while let Some(folder) = pending.pop_front() {
    for entry in webdav.get_directory_contents(&folder).await? {
      if entry.is_directory() {
        pending.push_back(entry.filename.clone());
      }
      if entry.basename.to_lowercase().contains(&query) {
        matches.push(entry);
      }
    }
  }

  debug!(found = matches.len(), "Search finished");
  Ok(OperationOutcome::Entries(matches))
}
