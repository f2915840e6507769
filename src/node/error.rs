//! Error types raised by the node.

use std::fmt;

use super::items::OutputItem;

/// A configuration problem detected by the node itself.
///
/// Carries the index of the item being processed when one applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOperationError {
  pub message: String,
  pub item_index: Option<usize>,
}

impl NodeOperationError {
  pub fn new(message: impl Into<String>, item_index: usize) -> Self {
    Self {
      message: message.into(),
      item_index: Some(item_index),
    }
  }

  /// Error not tied to a single item (e.g., an unknown operation).
  pub fn for_run(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      item_index: None,
    }
  }
}

impl fmt::Display for NodeOperationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.message)
  }
}

impl std::error::Error for NodeOperationError {}

/// A run aborted by a failure.
///
/// `output` holds the items emitted before the failure; they remain part of
/// the run's result.
#[derive(Debug)]
pub struct ExecutionError {
  /// Index of the failing item, `None` when the run failed before the first
  /// item.
  pub item_index: Option<usize>,
  pub error: anyhow::Error,
  pub output: Vec<OutputItem>,
}

impl fmt::Display for ExecutionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.item_index {
      Some(index) => write!(f, "Item {index} failed: {:#}", self.error),
      None => write!(f, "{:#}", self.error),
    }
  }
}

// The display already renders the whole chain of `error`.
impl std::error::Error for ExecutionError {}

#[cfg(test)]
mod tests {
  use anyhow::anyhow;

  use super::*;

  #[test]
  fn test_node_operation_error_display() {
    let err = NodeOperationError::new("No binary data found in field 'data'.", 3);
    assert_eq!(err.to_string(), "No binary data found in field 'data'.");
    assert_eq!(err.item_index, Some(3));
    assert_eq!(NodeOperationError::for_run("bad").item_index, None);
  }

  #[test]
  fn test_execution_error_display() {
    let err = ExecutionError {
      item_index: Some(1),
      error: anyhow!("remote failure").context("Failed to delete /a"),
      output: Vec::new(),
    };
    assert_eq!(err.to_string(), "Item 1 failed: Failed to delete /a: remote failure");

    let err = ExecutionError {
      item_index: None,
      error: anyhow!("The resource \"folder\" is not known"),
      output: Vec::new(),
    };
    assert_eq!(err.to_string(), "The resource \"folder\" is not known");
  }
}
