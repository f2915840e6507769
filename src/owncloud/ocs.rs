//! Client for ownCloud's OCS REST API.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, trace};

use super::api::{OcsApi, OcsMethod};
use super::error::OcsApiError;
use super::models::{ocs_error_message, unwrap_ocs_data};
use crate::credentials::OwnCloudCredentials;

/// Collection endpoint of the file sharing API.
pub const SHARES_ENDPOINT: &str = "/ocs/v2.php/apps/files_sharing/api/v1/shares";

/// OCS client bound to one instance and login.
#[derive(Clone)]
pub struct OcsClient {
  host: String,
  auth_header: String,
  client: reqwest::Client,
}

impl OcsClient {
  /// Create an OCS client.
  ///
  /// # Arguments
  /// * `credentials` - Resolved instance URL and login.
  /// * `timeout_secs` - Per-request timeout in seconds.
  ///
  /// # Errors
  /// Returns an error if the underlying `reqwest::Client` cannot be built.
  pub fn new(credentials: &OwnCloudCredentials, timeout_secs: u64) -> Result<Self> {
    Ok(Self {
      host: credentials.host().to_string(),
      auth_header: credentials.authorization_header(),
      client: super::http_client(timeout_secs)?,
    })
  }
}

#[async_trait]
impl OcsApi for OcsClient {
  async fn request(
    &self,
    method: OcsMethod,
    endpoint: &str,
    body: Option<&Value>,
    query: &[(&str, &str)],
  ) -> Result<Value> {
    let url = format!("{}{}", self.host, endpoint);
    debug!(%method, endpoint, "OCS request");

    let mut request = self
      .client
      .request(method.into(), &url)
      .header(AUTHORIZATION, &self.auth_header)
      .header("OCS-APIRequest", "true")
      .header(ACCEPT, "application/json")
      .query(query)
      .query(&[("format", "json")]);
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request
      .send()
      .await
      .with_context(|| format!("Failed to send {method} request to {endpoint}"))?;

    let status = response.status();
    let text = response
      .text()
      .await
      .with_context(|| format!("Failed to read OCS response from {endpoint}"))?;
    trace!(%status, body = %text, "OCS response");

    if !status.is_success() {
      let parsed: Option<Value> = serde_json::from_str(&text).ok();
      if let Some(message) = parsed.as_ref().and_then(ocs_error_message) {
        return Err(
          OcsApiError {
            status,
            message: message.to_string(),
          }
          .into(),
        );
      }
      return Err(anyhow!("{method} {endpoint} failed with status {status}"));
    }

    if text.trim().is_empty() {
      return Ok(Value::Null);
    }

    let document: Value =
      serde_json::from_str(&text).with_context(|| format!("Failed to parse OCS response from {endpoint}"))?;
    Ok(unwrap_ocs_data(document))
  }
}
