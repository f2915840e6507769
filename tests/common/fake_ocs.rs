//! In-memory OCS sharing API for testing
//!
//! Implements [`OcsApi`] for the shares endpoint and records every request,
//! rejecting bad input with `OcsApiError` the way the server's
//! `ocs.meta.message` would.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use owncloud_node::owncloud::{OcsApi, OcsApiError, OcsMethod, SHARES_ENDPOINT};
use reqwest::StatusCode;
use serde_json::{Map, Value, json};

/// One request seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
  pub method: OcsMethod,
  pub endpoint: String,
  pub body: Option<Value>,
  pub query: Vec<(String, String)>,
}

/// A fake OCS server keeping shares in memory.
pub struct FakeOcs {
  shares: Mutex<Vec<Map<String, Value>>>,
  requests: Mutex<Vec<RecordedRequest>>,
  next_id: Mutex<u64>,
}

impl FakeOcs {
  pub fn new() -> Self {
    Self {
      shares: Mutex::new(Vec::new()),
      requests: Mutex::new(Vec::new()),
      next_id: Mutex::new(1),
    }
  }

  /// Every request received so far, in order.
  #[allow(dead_code)]
  pub fn requests(&self) -> Vec<RecordedRequest> {
    self.requests.lock().unwrap().clone()
  }

  fn create(&self, body: &Map<String, Value>) -> Result<Value> {
    let share_type = body.get("shareType").and_then(Value::as_i64).unwrap_or(-1);
    let path = body.get("path").and_then(Value::as_str).unwrap_or_default();
    let share_with = body.get("shareWith").and_then(Value::as_str).unwrap_or_default();

    if path.is_empty() {
      return Err(rejected(StatusCode::NOT_FOUND, "Please specify a file or folder path"));
    }
    match share_type {
      0 if share_with.is_empty() => return Err(rejected(StatusCode::NOT_FOUND, "Please specify a valid user")),
      1 if share_with.is_empty() => return Err(rejected(StatusCode::NOT_FOUND, "Please specify a valid group")),
      0 | 1 | 3 => {}
      _ => return Err(rejected(StatusCode::BAD_REQUEST, "Unknown share type")),
    }

    let id = {
      let mut next_id = self.next_id.lock().unwrap();
      let id = *next_id;
      *next_id += 1;
      id.to_string()
    };

    let mut share = Map::new();
    share.insert("id".to_string(), json!(id));
    share.insert("share_type".to_string(), json!(share_type));
    share.insert("path".to_string(), json!(path));
    share.insert(
      "permissions".to_string(),
      body.get("permissions").cloned().unwrap_or(json!(1)),
    );
    if share_type == 3 {
      share.insert("token".to_string(), json!(format!("token{id}")));
      share.insert("url".to_string(), json!(format!("https://cloud.example.com/s/token{id}")));
    } else {
      share.insert("share_with".to_string(), json!(share_with));
    }
    if let Some(expiration) = body.get("expireDate") {
      share.insert("expiration".to_string(), expiration.clone());
    }

    self.shares.lock().unwrap().push(share.clone());
    Ok(Value::Object(share))
  }

  fn with_share<T>(&self, id: &str, f: impl FnOnce(&mut Vec<Map<String, Value>>, usize) -> T) -> Result<T> {
    let mut shares = self.shares.lock().unwrap();
    let position = shares
      .iter()
      .position(|share| share.get("id").and_then(Value::as_str) == Some(id))
      .ok_or_else(|| rejected(StatusCode::NOT_FOUND, "Wrong share ID, share doesn't exist"))?;
    Ok(f(&mut shares, position))
  }
}

impl Default for FakeOcs {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl OcsApi for FakeOcs {
  async fn request(
    &self,
    method: OcsMethod,
    endpoint: &str,
    body: Option<&Value>,
    query: &[(&str, &str)],
  ) -> Result<Value> {
    self.requests.lock().unwrap().push(RecordedRequest {
      method,
      endpoint: endpoint.to_string(),
      body: body.cloned(),
      query: query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
    });

    let empty = Map::new();
    let body = body.and_then(Value::as_object).unwrap_or(&empty);

    if endpoint == SHARES_ENDPOINT {
      return match method {
        OcsMethod::Post => self.create(body),
        OcsMethod::Get => {
          let path = query.iter().find(|(key, _)| *key == "path").map(|(_, value)| *value);
          let shares = self.shares.lock().unwrap();
          Ok(Value::Array(
            shares
              .iter()
              .filter(|share| path.is_none_or(|path| share.get("path").and_then(Value::as_str) == Some(path)))
              .cloned()
              .map(Value::Object)
              .collect(),
          ))
        }
        _ => Err(rejected(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")),
      };
    }

    let id = endpoint
      .strip_prefix(SHARES_ENDPOINT)
      .and_then(|rest| rest.strip_prefix('/'))
      .ok_or_else(|| rejected(StatusCode::NOT_FOUND, "Invalid query"))?;

    match method {
      OcsMethod::Get => self.with_share(id, |shares, idx| json!([shares[idx].clone()])),
      OcsMethod::Delete => self.with_share(id, |shares, idx| {
        shares.remove(idx);
        Value::Null
      }),
      OcsMethod::Put => self.with_share(id, |shares, idx| {
        for (key, value) in body {
          let key = if key == "expireDate" { "expiration" } else { key.as_str() };
          shares[idx].insert(key.to_string(), value.clone());
        }
        Value::Object(shares[idx].clone())
      }),
      OcsMethod::Post => Err(rejected(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")),
    }
  }
}

fn rejected(status: StatusCode, message: &str) -> anyhow::Error {
  OcsApiError {
    status,
    message: message.to_string(),
  }
  .into()
}
