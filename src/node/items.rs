//! Items flowing into and out of the node.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A binary attachment on an item.
///
/// `data` is held fully in memory and serialized as standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
  #[serde(with = "base64_bytes")]
  pub data: Vec<u8>,
  #[serde(default = "default_mime_type")]
  pub mime_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_extension: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file_size: Option<u64>,
}

impl BinaryData {
  /// Wrap downloaded bytes, deriving MIME type and extension from `file_name`.
  pub fn from_bytes(data: Vec<u8>, file_name: &str) -> Self {
    let mime_type = mime_guess::from_path(file_name).first_or_octet_stream().to_string();
    let file_extension = Path::new(file_name)
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_string);

    Self {
      file_size: Some(data.len() as u64),
      data,
      mime_type,
      file_name: Some(file_name.to_string()),
      file_extension,
    }
  }
}

fn default_mime_type() -> String {
  "application/octet-stream".to_string()
}

/// One unit of work handed to the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
  #[serde(default)]
  pub json: Map<String, Value>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub binary: BTreeMap<String, BinaryData>,
}

impl InputItem {
  /// Item carrying only a JSON payload.
  pub fn from_json(json: Map<String, Value>) -> Self {
    Self {
      json,
      binary: BTreeMap::new(),
    }
  }

  /// Attach a binary payload under `field`.
  pub fn with_binary(mut self, field: impl Into<String>, data: BinaryData) -> Self {
    self.binary.insert(field.into(), data);
    self
  }
}

/// Back-reference from an output item to the input index that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
  pub item: usize,
}

/// One result handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
  pub json: Map<String, Value>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub binary: BTreeMap<String, BinaryData>,
  pub paired_item: PairedItem,
}

impl OutputItem {
  /// Output item with a JSON payload only.
  pub fn json(json: Map<String, Value>, item_index: usize) -> Self {
    Self {
      json,
      binary: BTreeMap::new(),
      paired_item: PairedItem { item: item_index },
    }
  }

  /// Error-shaped item produced when the run continues past a failure.
  pub fn error(message: impl Into<String>, item_index: usize) -> Self {
    let mut json = Map::new();
    json.insert("error".to_string(), Value::String(message.into()));
    Self::json(json, item_index)
  }

  /// The `error` text when this is an error-shaped item.
  pub fn error_message(&self) -> Option<&str> {
    self.json.get("error").and_then(Value::as_str)
  }
}

mod base64_bytes {
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as BASE64;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    BASE64.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
  }
}
