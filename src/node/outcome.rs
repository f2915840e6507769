//! Typed per-operation results and their output item shapes.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};

use super::items::{BinaryData, OutputItem};
use crate::owncloud::FileStat;

/// What one operation produced for one input item.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome {
  /// upload, delete, createFolder: `{success: true, path}`.
  PathAffected { path: String },
  /// move, copy: `{success: true, from, to}`.
  Transferred { from: String, to: String },
  /// download: empty json with the bytes under `field`.
  Downloaded { field: String, data: BinaryData },
  /// list, search: one item per entry.
  Entries(Vec<FileStat>),
  /// stat: the entry verbatim.
  Stat(FileStat),
  /// share delete: `{success: true, shareId}`.
  ShareDeleted { share_id: String },
  /// share create, get, update: the API response.
  Response(Value),
  /// share getAll: one item per share when the response is an array.
  Shares(Value),
}

impl OperationOutcome {
  /// Convert into output items paired with `item_index`.
  ///
  /// # Errors
  /// Returns an error if a file entry cannot be serialized.
  pub fn into_items(self, item_index: usize) -> Result<Vec<OutputItem>> {
    let item = |json: Map<String, Value>| OutputItem::json(json, item_index);

    let items = match self {
      Self::PathAffected { path } => vec![item(object(json!({ "success": true, "path": path })))],
      Self::Transferred { from, to } => vec![item(object(json!({ "success": true, "from": from, "to": to })))],
      Self::Downloaded { field, data } => {
        let mut output = item(Map::new());
        output.binary.insert(field, data);
        vec![output]
      }
      Self::Entries(entries) => entries
        .iter()
        .map(|entry| stat_json(entry).map(item))
        .collect::<Result<_>>()?,
      Self::Stat(entry) => vec![item(stat_json(&entry)?)],
      Self::ShareDeleted { share_id } => vec![item(object(json!({ "success": true, "shareId": share_id })))],
      Self::Response(response) => vec![item(object(response))],
      Self::Shares(Value::Array(shares)) => shares.into_iter().map(|share| item(object(share))).collect(),
      Self::Shares(response) => vec![item(object(response))],
    };

    Ok(items)
  }
}

fn stat_json(entry: &FileStat) -> Result<Map<String, Value>> {
  let value = serde_json::to_value(entry).with_context(|| format!("Failed to serialize entry {}", entry.filename))?;
  Ok(object(value))
}

/// Output json must be an object; anything else is wrapped as `{data}`.
fn object(value: Value) -> Map<String, Value> {
  match value {
    Value::Object(map) => map,
    other => {
      let mut map = Map::new();
      map.insert("data".to_string(), other);
      map
    }
  }
}
