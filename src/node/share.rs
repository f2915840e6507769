//! Share operations over the OCS sharing API.

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::debug;

use super::operation::{ShareOperation, ShareType};
use super::outcome::OperationOutcome;
use super::params::ItemParameters;
use crate::owncloud::{OcsApi, OcsMethod, SHARES_ENDPOINT};

/// Optional share attributes taken from `additionalFields`.
const SHARE_ATTRIBUTES: [&str; 4] = ["password", "permissions", "publicUpload", "expireDate"];

/// Run one share operation for one item.
///
/// # Errors
/// Returns parameter errors and any OCS failure unchanged.
pub async fn run(ocs: &dyn OcsApi, operation: ShareOperation, params: &ItemParameters<'_>) -> Result<OperationOutcome> {
  debug!(operation = operation.as_str(), item = params.index(), "Share operation");

  match operation {
    ShareOperation::Create => {
      let path = params.string("path")?;
      let share_type = ShareType::from(params.integer("shareType")?);
      let additional = params.collection("additionalFields")?;

      let mut body = Map::new();
      body.insert("path".to_string(), Value::String(path));
      body.insert("shareType".to_string(), Value::from(share_type.code()));
      if share_type.requires_recipient() {
        body.insert(
          "shareWith".to_string(),
          Value::String(params.string_or_empty("shareWith")?),
        );
      }
      body.extend(truthy_attributes(&additional));

      let response = ocs
        .request(OcsMethod::Post, SHARES_ENDPOINT, Some(&Value::Object(body)), &[])
        .await?;
      Ok(OperationOutcome::Response(response))
    }
    ShareOperation::Delete => {
      let share_id = params.string("shareId")?;
      ocs
        .request(OcsMethod::Delete, &share_endpoint(&share_id), None, &[])
        .await?;
      Ok(OperationOutcome::ShareDeleted { share_id })
    }
    ShareOperation::Get => {
      let share_id = params.string("shareId")?;
      let response = ocs
        .request(OcsMethod::Get, &share_endpoint(&share_id), None, &[])
        .await?;
      Ok(OperationOutcome::Response(response))
    }
    ShareOperation::GetAll => {
      let path = params.string("path")?;
      let response = ocs
        .request(OcsMethod::Get, SHARES_ENDPOINT, None, &[("path", path.as_str())])
        .await?;
      Ok(OperationOutcome::Shares(response))
    }
    ShareOperation::Update => {
      let share_id = params.string("shareId")?;
      let additional = params.collection("additionalFields")?;
      let body = Value::Object(present_attributes(&additional));

      let response = ocs
        .request(OcsMethod::Put, &share_endpoint(&share_id), Some(&body), &[])
        .await?;
      Ok(OperationOutcome::Response(response))
    }
  }
}

fn share_endpoint(share_id: &str) -> String {
  format!("{SHARES_ENDPOINT}/{}", urlencoding::encode(share_id))
}

/// Attributes a new share is created with: only truthy values count, so
/// `false`, `0` and `""` are left out.
fn truthy_attributes(fields: &Map<String, Value>) -> Map<String, Value> {
  select_attributes(fields, is_truthy)
}

/// Attributes an update sends: anything present (including `false`, `0`
/// and `""`) except `null`.
fn present_attributes(fields: &Map<String, Value>) -> Map<String, Value> {
  select_attributes(fields, |value| !value.is_null())
}

fn select_attributes(fields: &Map<String, Value>, keep: impl Fn(&Value) -> bool) -> Map<String, Value> {
  SHARE_ATTRIBUTES
    .iter()
    .filter_map(|name| {
      fields
        .get(*name)
        .filter(|value| keep(*value))
        .map(|value| (name.to_string(), value.clone()))
    })
    .collect()
}

fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(flag) => *flag,
    Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
    Value::String(text) => !text.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn fields(value: Value) -> Map<String, Value> {
    match value {
      Value::Object(map) => map,
      _ => panic!("expected an object"),
    }
  }

  #[test]
  fn test_create_skips_falsy_attributes() {
    let additional = fields(json!({
      "password": "",
      "permissions": 0,
      "publicUpload": false,
      "expireDate": "2030-01-01",
      "note": "ignored"
    }));

    assert_eq!(
      Value::Object(truthy_attributes(&additional)),
      json!({ "expireDate": "2030-01-01" })
    );
  }

  #[test]
  fn test_update_keeps_falsy_attributes() {
    let additional = fields(json!({
      "password": "",
      "permissions": 0,
      "publicUpload": false,
      "expireDate": null
    }));

    assert_eq!(
      Value::Object(present_attributes(&additional)),
      json!({ "password": "", "permissions": 0, "publicUpload": false })
    );
  }

  #[test]
  fn test_share_endpoint_encodes_id() {
    assert_eq!(share_endpoint("42"), format!("{SHARES_ENDPOINT}/42"));
    assert_eq!(share_endpoint("a b"), format!("{SHARES_ENDPOINT}/a%20b"));
  }

  #[test]
  fn test_truthiness() {
    assert!(is_truthy(&json!(31)));
    assert!(is_truthy(&json!(true)));
    assert!(is_truthy(&json!("x")));
    assert!(!is_truthy(&json!(0.0)));
    assert!(!is_truthy(&Value::Null));
  }
}
