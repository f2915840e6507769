//! Error types raised by the WebDAV and OCS clients.
//!
//! Both are returned inside `anyhow::Error`; callers that need to branch on
//! the kind use `downcast_ref`.

use std::fmt;

use reqwest::StatusCode;

/// A WebDAV request that reached the server but came back with a non-2xx
/// status.
#[derive(Debug, Clone)]
pub struct HttpStatusError {
  /// HTTP verb that was sent (`PROPFIND`, `MOVE`, ...).
  pub method: String,
  /// Remote path the request targeted.
  pub path: String,
  /// Status returned by the server.
  pub status: StatusCode,
  /// Response body, if the server sent one.
  pub details: String,
}

impl HttpStatusError {
  /// Whether the server reported the resource as missing.
  pub fn is_not_found(&self) -> bool {
    self.status == StatusCode::NOT_FOUND
  }
}

impl fmt::Display for HttpStatusError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} failed with status {}", self.method, self.path, self.status)?;
    if !self.details.is_empty() {
      write!(f, ": {}", self.details)?;
    }
    Ok(())
  }
}

impl std::error::Error for HttpStatusError {}

/// An OCS call rejected by the server with an explanatory `ocs.meta.message`.
#[derive(Debug, Clone)]
pub struct OcsApiError {
  /// HTTP status of the failed response.
  pub status: StatusCode,
  /// The server-supplied message, verbatim.
  pub message: String,
}

impl fmt::Display for OcsApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ownCloud API Error: {}", self.message)
  }
}

impl std::error::Error for OcsApiError {}

/// True when `error` (or anything in its chain) is a WebDAV 404.
pub fn is_not_found(error: &anyhow::Error) -> bool {
  error
    .chain()
    .filter_map(|cause| cause.downcast_ref::<HttpStatusError>())
    .any(HttpStatusError::is_not_found)
}

#[cfg(test)]
mod tests {
  use anyhow::Context;

  use super::*;

  fn not_found() -> HttpStatusError {
    HttpStatusError {
      method: "PROPFIND".to_string(),
      path: "/missing.txt".to_string(),
      status: StatusCode::NOT_FOUND,
      details: String::new(),
    }
  }

  #[test]
  fn test_http_status_error_display() {
    assert_eq!(
      not_found().to_string(),
      "PROPFIND /missing.txt failed with status 404 Not Found"
    );
  }

  #[test]
  fn test_is_not_found_sees_through_context() {
    let error = Err::<(), _>(not_found()).context("stat failed").unwrap_err();
    assert!(is_not_found(&error));
  }

  #[test]
  fn test_is_not_found_ignores_other_errors() {
    let error = anyhow::anyhow!("connection reset");
    assert!(!is_not_found(&error));
  }

  #[test]
  fn test_ocs_error_message_prefix() {
    let error = OcsApiError {
      status: StatusCode::NOT_FOUND,
      message: "Wrong share ID, share doesn't exist".to_string(),
    };
    assert_eq!(
      error.to_string(),
      "ownCloud API Error: Wrong share ID, share doesn't exist"
    );
  }
}
