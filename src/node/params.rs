//! Per-item parameter access.
//!
//! [`NodeParameters`] is the host-side lookup (raw values, expressions
//! already resolved). [`ItemParameters`] layers schema defaults, required
//! checks, and typed accessors on top for one item of one operation.

use anyhow::{Result, anyhow, bail};
use serde_json::{Map, Value};

use super::error::NodeOperationError;
use super::items::InputItem;
use super::operation::Operation;
use super::schema::{self, FieldKind};

/// The item a parameter is being resolved for.
#[derive(Debug, Clone, Copy)]
pub struct ItemContext<'a> {
  pub index: usize,
  pub item: &'a InputItem,
}

/// Source of raw node parameters.
pub trait NodeParameters: Send + Sync {
  /// Value of `name` for the given item, `None` when the parameter is unset.
  ///
  /// # Errors
  /// Returns an error when the stored value cannot be resolved (e.g., a
  /// malformed expression).
  fn get(&self, name: &str, context: &ItemContext<'_>) -> Result<Option<Value>>;
}

/// Parameters held as a static JSON object.
///
/// String values starting with `=` are expressions: every `{{ ... }}`
/// placeholder is replaced by the value it refers to. Supported references
/// are `$json` (optionally followed by a `.`-separated path into the item's
/// JSON, numeric segments index arrays) and `$itemIndex`.
#[derive(Debug, Clone, Default)]
pub struct JsonParameters {
  values: Map<String, Value>,
}

impl JsonParameters {
  pub fn new(values: Map<String, Value>) -> Self {
    Self { values }
  }

  pub fn values(&self) -> &Map<String, Value> {
    &self.values
  }
}

impl NodeParameters for JsonParameters {
  fn get(&self, name: &str, context: &ItemContext<'_>) -> Result<Option<Value>> {
    self
      .values
      .get(name)
      .map(|value| resolve_value(value, context))
      .transpose()
  }
}

fn resolve_value(value: &Value, context: &ItemContext<'_>) -> Result<Value> {
  match value {
    Value::String(text) => match text.strip_prefix('=') {
      Some(expression) => resolve_expression(expression, context),
      None => Ok(value.clone()),
    },
    Value::Array(values) => values
      .iter()
      .map(|value| resolve_value(value, context))
      .collect::<Result<Vec<_>>>()
      .map(Value::Array),
    Value::Object(map) => map
      .iter()
      .map(|(key, value)| Ok((key.clone(), resolve_value(value, context)?)))
      .collect::<Result<Map<_, _>>>()
      .map(Value::Object),
    _ => Ok(value.clone()),
  }
}

/// Resolve the body of an expression (the text after `=`).
///
/// A lone placeholder keeps the referenced JSON value as-is; anything else
/// is rendered as a string.
fn resolve_expression(expression: &str, context: &ItemContext<'_>) -> Result<Value> {
  let trimmed = expression.trim();
  let single = trimmed
    .strip_prefix("{{")
    .and_then(|rest| rest.strip_suffix("}}"))
    .filter(|inner| !inner.contains("{{"));
  if let Some(inner) = single {
    return evaluate(inner, context);
  }

  let mut rendered = String::with_capacity(expression.len());
  let mut rest = expression;
  while let Some(start) = rest.find("{{") {
    rendered.push_str(&rest[..start]);
    let after_open = &rest[start + 2..];
    let end = after_open
      .find("}}")
      .ok_or_else(|| anyhow!("Unterminated expression in \"={expression}\""))?;
    rendered.push_str(&render(&evaluate(&after_open[..end], context)?));
    rest = &after_open[end + 2..];
  }
  rendered.push_str(rest);

  Ok(Value::String(rendered))
}

fn evaluate(reference: &str, context: &ItemContext<'_>) -> Result<Value> {
  let reference = reference.trim();

  if reference == "$itemIndex" {
    return Ok(Value::from(context.index));
  }

  let Some(path) = reference.strip_prefix("$json") else {
    bail!("Unsupported expression \"{{{{ {reference} }}}}\"");
  };

  let mut current: Option<&Value> = match path.strip_prefix('.') {
    Some(_) => None,
    None if path.is_empty() => return Ok(Value::Object(context.item.json.clone())),
    None => bail!("Unsupported expression \"{{{{ {reference} }}}}\""),
  };

  for segment in path.trim_start_matches('.').split('.') {
    let next = match current {
      None => context.item.json.get(segment),
      Some(Value::Object(map)) => map.get(segment),
      Some(Value::Array(values)) => segment.parse::<usize>().ok().and_then(|index| values.get(index)),
      Some(_) => None,
    };
    match next {
      Some(value) => current = Some(value),
      None => return Ok(Value::Null),
    }
  }

  Ok(current.cloned().unwrap_or(Value::Null))
}

fn render(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}

/// Typed parameter access for one item of one operation.
pub struct ItemParameters<'a> {
  parameters: &'a dyn NodeParameters,
  operation: Operation,
  context: ItemContext<'a>,
}

impl<'a> ItemParameters<'a> {
  pub fn new(parameters: &'a dyn NodeParameters, operation: Operation, index: usize, item: &'a InputItem) -> Self {
    Self {
      parameters,
      operation,
      context: ItemContext { index, item },
    }
  }

  pub fn index(&self) -> usize {
    self.context.index
  }

  pub fn item(&self) -> &'a InputItem {
    self.context.item
  }

  /// Value of `name`, falling back to the schema default.
  ///
  /// JSON `null` counts as unset.
  ///
  /// # Errors
  /// Returns an error when the raw value cannot be resolved.
  pub fn optional(&self, name: &str) -> Result<Option<Value>> {
    let value = self
      .parameters
      .get(name, &self.context)?
      .filter(|value| !value.is_null());

    Ok(value.or_else(|| schema::field(self.operation, name).and_then(|field| field.default_value())))
  }

  /// Value of a parameter the operation cannot run without.
  ///
  /// # Errors
  /// Fails with `Could not get parameter "<name>"` when neither a value nor a
  /// usable default exists.
  pub fn required(&self, name: &str) -> Result<Value> {
    self.optional(name)?.ok_or_else(|| self.missing(name))
  }

  /// Non-empty string parameter. Numbers are accepted and rendered.
  ///
  /// # Errors
  /// Fails when the parameter is missing, empty, or not a scalar.
  pub fn string(&self, name: &str) -> Result<String> {
    match self.required(name)? {
      Value::String(text) if text.is_empty() => Err(self.missing(name)),
      Value::String(text) => Ok(text),
      Value::Number(number) => Ok(number.to_string()),
      other => bail!("Parameter \"{name}\" must be a string, got {other}"),
    }
  }

  /// String parameter that may legitimately be empty (defaults to `""`).
  pub fn string_or_empty(&self, name: &str) -> Result<String> {
    match self.optional(name)? {
      None => Ok(String::new()),
      Some(Value::String(text)) => Ok(text),
      Some(Value::Number(number)) => Ok(number.to_string()),
      Some(other) => bail!("Parameter \"{name}\" must be a string, got {other}"),
    }
  }

  /// Integer parameter (numeric strings are accepted).
  pub fn integer(&self, name: &str) -> Result<i64> {
    let value = self.required(name)?;
    value
      .as_i64()
      .or_else(|| value.as_str().and_then(|text| text.trim().parse().ok()))
      .ok_or_else(|| anyhow!("Parameter \"{name}\" must be an integer, got {value}"))
  }

  /// Collection parameter as a JSON object (defaults to `{}`).
  pub fn collection(&self, name: &str) -> Result<Map<String, Value>> {
    match self.optional(name)? {
      None => Ok(Map::new()),
      Some(Value::Object(map)) => Ok(map),
      Some(other) => bail!("Parameter \"{name}\" must be an object, got {other}"),
    }
  }

  /// Remote path parameter.
  ///
  /// Resource locator fields accept a plain string or a
  /// `{ "__rl": true, "mode": "list" | "path", "value": "..." }` object;
  /// `path` mode values must start with `/`. Plain string fields go through
  /// [`Self::string`].
  ///
  /// # Errors
  /// Fails when the path is missing, empty, or not a valid locator.
  pub fn path(&self, name: &str) -> Result<String> {
    let is_locator = schema::field(self.operation, name).is_some_and(|field| field.kind == FieldKind::ResourceLocator);
    if !is_locator {
      return self.string(name);
    }

    match self.required(name)? {
      Value::String(text) if text.is_empty() => Err(self.missing(name)),
      Value::String(text) => Ok(text),
      Value::Object(locator) => {
        let mode = locator.get("mode").and_then(Value::as_str).unwrap_or("list");
        let value = match locator.get("value") {
          Some(Value::String(text)) => text.clone(),
          Some(Value::Null) | None => String::new(),
          Some(other) => bail!("Parameter \"{name}\" has a non-string locator value {other}"),
        };

        if value.is_empty() {
          return Err(self.missing(name));
        }
        match mode {
          "list" => Ok(value),
          "path" if value.starts_with('/') => Ok(value),
          "path" => Err(NodeOperationError::new("Path must start with /", self.index()).into()),
          other => bail!("Parameter \"{name}\" uses unknown locator mode \"{other}\""),
        }
      }
      other => bail!("Parameter \"{name}\" must be a path, got {other}"),
    }
  }

  fn missing(&self, name: &str) -> anyhow::Error {
    NodeOperationError::new(format!("Could not get parameter \"{name}\""), self.index()).into()
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::node::operation::{FileOperation, ShareOperation};

  fn parameters(value: Value) -> JsonParameters {
    match value {
      Value::Object(map) => JsonParameters::new(map),
      _ => panic!("parameters must be an object"),
    }
  }

  fn item(value: Value) -> InputItem {
    serde_json::from_value(json!({ "json": value })).unwrap()
  }

  #[test]
  fn test_plain_values_pass_through() {
    let params = parameters(json!({ "path": "/a.txt", "shareType": 0 }));
    let input = InputItem::default();
    let context = ItemContext { index: 0, item: &input };

    assert_eq!(params.get("path", &context).unwrap(), Some(json!("/a.txt")));
    assert_eq!(params.get("shareType", &context).unwrap(), Some(json!(0)));
    assert_eq!(params.get("missing", &context).unwrap(), None);
  }

  #[test]
  fn test_expressions_resolve_against_item_json() {
    let params = parameters(json!({
      "path": "=/reports/{{ $json.name }}.pdf",
      "shareType": "={{ $json.share.type }}",
      "shareId": "={{ $json.ids.1 }}",
      "label": "=item {{ $itemIndex }}",
      "missing": "={{ $json.nope.deeper }}",
    }));
    let input = item(json!({ "name": "q1", "share": { "type": 1 }, "ids": ["a", "b"] }));
    let context = ItemContext { index: 4, item: &input };

    assert_eq!(params.get("path", &context).unwrap(), Some(json!("/reports/q1.pdf")));
    assert_eq!(params.get("shareType", &context).unwrap(), Some(json!(1)));
    assert_eq!(params.get("shareId", &context).unwrap(), Some(json!("b")));
    assert_eq!(params.get("label", &context).unwrap(), Some(json!("item 4")));
    assert_eq!(params.get("missing", &context).unwrap(), Some(Value::Null));
  }

  #[test]
  fn test_evaluate_walks_nested_json() {
    let input = item(json!({ "a": { "b": { "c": [10, 20] } }, "flat": "x" }));
    let context = ItemContext { index: 2, item: &input };

    assert_eq!(evaluate("$json.a.b", &context).unwrap(), json!({ "c": [10, 20] }));
    assert_eq!(evaluate(" $json.a.b.c.1 ", &context).unwrap(), json!(20));
    assert_eq!(evaluate("$json.flat", &context).unwrap(), json!("x"));
    assert_eq!(evaluate("$json", &context).unwrap(), Value::Object(input.json.clone()));
    assert_eq!(evaluate("$itemIndex", &context).unwrap(), json!(2));
  }

  #[test]
  fn test_evaluate_missing_segment_is_null() {
    let input = item(json!({ "a": { "b": 1 } }));
    let context = ItemContext { index: 0, item: &input };

    assert_eq!(evaluate("$json.a.x", &context).unwrap(), Value::Null);
    assert_eq!(evaluate("$json.a.b.c", &context).unwrap(), Value::Null);
    assert_eq!(evaluate("$json.missing", &context).unwrap(), Value::Null);
    assert!(evaluate("$jsonx", &context).is_err());
  }

  #[test]
  fn test_expressions_inside_collections() {
    let params = parameters(json!({ "additionalFields": { "password": "={{ $json.secret }}" } }));
    let input = item(json!({ "secret": "hunter2" }));
    let context = ItemContext { index: 0, item: &input };

    assert_eq!(
      params.get("additionalFields", &context).unwrap(),
      Some(json!({ "password": "hunter2" }))
    );
  }

  #[test]
  fn test_bad_expressions_fail() {
    let params = parameters(json!({ "a": "={{ $node.x }}", "b": "=/x/{{ $json.y" }));
    let input = InputItem::default();
    let context = ItemContext { index: 0, item: &input };

    assert!(params.get("a", &context).is_err());
    assert!(params.get("b", &context).is_err());
  }

  #[test]
  fn test_schema_defaults_apply() {
    let params = parameters(json!({}));
    let input = InputItem::default();

    let upload = ItemParameters::new(&params, Operation::File(FileOperation::Upload), 0, &input);
    assert_eq!(upload.string("binaryPropertyName").unwrap(), "data");
    assert!(upload.collection("options").unwrap().is_empty());

    let create = ItemParameters::new(&params, Operation::Share(ShareOperation::Create), 0, &input);
    assert_eq!(create.integer("shareType").unwrap(), 3);
    assert_eq!(create.string_or_empty("shareWith").unwrap(), "");
  }

  #[test]
  fn test_missing_required_parameter() {
    let params = parameters(json!({ "shareId": "" }));
    let input = InputItem::default();
    let get = ItemParameters::new(&params, Operation::Share(ShareOperation::Get), 2, &input);

    let err = get.string("shareId").unwrap_err();
    assert_eq!(err.to_string(), "Could not get parameter \"shareId\"");
    assert_eq!(err.downcast_ref::<NodeOperationError>().unwrap().item_index, Some(2));

    let err = get.path("path").unwrap_err();
    assert_eq!(err.to_string(), "Could not get parameter \"path\"");
  }

  #[test]
  fn test_resource_locator_forms() {
    let input = InputItem::default();
    let stat = Operation::File(FileOperation::Stat);

    let params = parameters(json!({ "path": "/plain.txt" }));
    assert_eq!(ItemParameters::new(&params, stat, 0, &input).path("path").unwrap(), "/plain.txt");

    let params = parameters(json!({ "path": { "__rl": true, "mode": "list", "value": "/Documents" } }));
    assert_eq!(ItemParameters::new(&params, stat, 0, &input).path("path").unwrap(), "/Documents");

    let params = parameters(json!({ "path": { "__rl": true, "mode": "path", "value": "relative.txt" } }));
    let err = ItemParameters::new(&params, stat, 0, &input).path("path").unwrap_err();
    assert_eq!(err.to_string(), "Path must start with /");

    let params = parameters(json!({ "path": { "__rl": true, "mode": "list", "value": "" } }));
    assert!(ItemParameters::new(&params, stat, 0, &input).path("path").is_err());
  }

  #[test]
  fn test_null_counts_as_unset() {
    let params = parameters(json!({ "binaryPropertyName": null }));
    let input = InputItem::default();
    let upload = ItemParameters::new(&params, Operation::File(FileOperation::Upload), 0, &input);
    assert_eq!(upload.string("binaryPropertyName").unwrap(), "data");
  }
}
