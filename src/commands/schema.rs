//! `schema` subcommand: print the node's parameter schema.

use std::process;

use anyhow::{Context, Result};
use serde_json::{Value, json};

use crate::color::ColorScheme;
use crate::node::schema::{FIELDS, OPERATIONS, describe, describe_operation};
use crate::node::{Operation, Resource};

/// Print the parameter schema as pretty JSON.
///
/// Invalid `resource`/`operation` values exit with code 4, like other
/// argument errors.
///
/// # Arguments
/// * `resource` - Optional resource filter (`file` or `share`).
/// * `operation` - Optional operation; prints only its visible fields.
/// * `colors` - Shared color palette for error output.
pub(crate) fn handle_schema_command(resource: Option<&str>, operation: Option<&str>, colors: &ColorScheme) {
  let document = match schema_document(resource, operation) {
    Ok(document) => document,
    Err(e) => {
      eprintln!("{} {e:#}", colors.error("Error:"));
      process::exit(4);
    }
  };

  match serde_json::to_string_pretty(&document) {
    Ok(text) => println!("{text}"),
    Err(e) => {
      eprintln!("{} {e}", colors.error("Error:"));
      process::exit(1);
    }
  }
}

/// Build the schema document for the given filters.
///
/// With an operation, the resource defaults to `file` and the result lists
/// only the fields that operation shows. Otherwise the whole description is
/// returned, narrowed to one resource when asked.
///
/// # Errors
/// Returns an error for unknown resources or operations.
pub fn schema_document(resource: Option<&str>, operation: Option<&str>) -> Result<Value> {
  if let Some(operation) = operation {
    let operation = Operation::resolve(resource.unwrap_or("file"), operation)?;
    return serde_json::to_value(describe_operation(operation)).context("Failed to serialize schema");
  }

  let mut document = serde_json::to_value(describe()).context("Failed to serialize schema")?;
  let Some(resource) = resource else {
    return Ok(document);
  };

  let resource: Resource = resource.parse()?;
  let operations: Vec<_> = OPERATIONS
    .iter()
    .filter(|entry| entry.operation.resource() == resource)
    .collect();
  let fields: Vec<_> = FIELDS
    .iter()
    .filter(|field| field.show.is_none_or(|show| show.resource == resource))
    .collect();

  if let Some(object) = document.as_object_mut() {
    if let Some(Value::Array(resources)) = object.get_mut("resources") {
      resources.retain(|choice| choice["value"] == json!(resource));
    }
    object.insert("operations".to_string(), serde_json::to_value(operations)?);
    object.insert("fields".to_string(), serde_json::to_value(fields)?);
  }

  Ok(document)
}
