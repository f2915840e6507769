//! Strongly typed credentials and related errors.
//!
//! [`Credential`] is what a secret store hands back for a host, while
//! [`OwnCloudCredentials`] is the resolved, normalized form the WebDAV and OCS
//! clients are built from.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// A username/password pair found in a secret store.
///
/// For ownCloud the password should be an app password created under
/// *Settings → Security*, which keeps working when two-factor auth is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
  /// The ownCloud login name
  pub username: String,
  /// The password or app password for the login
  pub password: String,
}

/// Connection settings for one ownCloud instance.
///
/// The host is normalized on construction: trailing slashes are removed, so
/// building the same credentials twice always yields the same URLs.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnCloudCredentials {
  host: String,
  username: String,
  password: String,
}

impl OwnCloudCredentials {
  /// Build credentials from raw stored values.
  ///
  /// # Arguments
  /// * `host` - Base URL of the instance (e.g., `https://cloud.example.com`).
  /// * `username` - Login name; also the WebDAV home folder name.
  /// * `password` - Password or app password.
  ///
  /// # Errors
  /// Returns [`CredentialError::MissingHost`] when `host` is empty once
  /// trailing slashes are removed. Username and password are not validated;
  /// the server decides whether they are acceptable.
  pub fn new(
    host: impl Into<String>,
    username: impl Into<String>,
    password: impl Into<String>,
  ) -> Result<Self, CredentialError> {
    let host = host.into();
    let host = host.trim().trim_end_matches('/').to_string();

    if host.is_empty() {
      return Err(CredentialError::MissingHost);
    }

    Ok(Self {
      host,
      username: username.into(),
      password: password.into(),
    })
  }

  /// Normalized base URL without a trailing slash.
  pub fn host(&self) -> &str {
    &self.host
  }

  /// Login name.
  pub fn username(&self) -> &str {
    &self.username
  }

  /// Password or app password.
  pub fn password(&self) -> &str {
    &self.password
  }

  /// Root of the user's WebDAV tree: `{host}/remote.php/dav/files/{username}/`.
  pub fn webdav_url(&self) -> String {
    format!("{}/remote.php/dav/files/{}/", self.host, self.username)
  }

  /// `base64(username:password)`, the Basic-Auth token.
  pub fn basic_auth_token(&self) -> String {
    let credentials = format!("{}:{}", self.username, self.password);
    BASE64.encode(credentials.as_bytes())
  }

  /// Value for the `Authorization` header.
  pub fn authorization_header(&self) -> String {
    format!("Basic {}", self.basic_auth_token())
  }
}

impl fmt::Debug for OwnCloudCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("OwnCloudCredentials")
      .field("host", &self.host)
      .field("username", &self.username)
      .field("password", &"********")
      .finish()
  }
}

/// Errors that can occur during credential operations.
#[derive(Debug)]
pub enum CredentialError {
  /// The .netrc file could not be found or read
  NetrcNotFound,
  /// No ownCloud host was configured
  MissingHost,
  /// An I/O error occurred while reading credentials
  IoError(std::io::Error),
}

impl fmt::Display for CredentialError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NetrcNotFound => write!(f, ".netrc file not found"),
      Self::MissingHost => write!(f, "ownCloud URL must not be empty"),
      Self::IoError(err) => write!(f, "I/O error: {err}"),
    }
  }
}

impl std::error::Error for CredentialError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::IoError(err) => Some(err),
      _ => None,
    }
  }
}

impl From<std::io::Error> for CredentialError {
  fn from(err: std::io::Error) -> Self {
    Self::IoError(err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_host_trailing_slash_is_removed() {
    let creds = OwnCloudCredentials::new("https://cloud.example.com/", "alice", "secret").unwrap();
    assert_eq!(creds.host(), "https://cloud.example.com");
  }

  #[test]
  fn test_host_normalization_is_idempotent() {
    let once = OwnCloudCredentials::new("https://cloud.example.com//", "alice", "secret").unwrap();
    let twice = OwnCloudCredentials::new(once.host(), "alice", "secret").unwrap();
    assert_eq!(once, twice);
  }

  #[test]
  fn test_empty_host_is_rejected() {
    let err = OwnCloudCredentials::new("/", "alice", "secret").unwrap_err();
    assert!(matches!(err, CredentialError::MissingHost));
  }

  #[test]
  fn test_webdav_url_layout() {
    let creds = OwnCloudCredentials::new("https://cloud.example.com/owncloud/", "alice", "secret").unwrap();
    assert_eq!(
      creds.webdav_url(),
      "https://cloud.example.com/owncloud/remote.php/dav/files/alice/"
    );
  }

  #[test]
  fn test_authorization_header_round_trips() {
    let creds = OwnCloudCredentials::new("https://cloud.example.com", "alice", "p:ss").unwrap();
    let header = creds.authorization_header();

    let encoded = header.strip_prefix("Basic ").unwrap();
    let decoded = String::from_utf8(BASE64.decode(encoded).unwrap()).unwrap();
    assert_eq!(decoded, "alice:p:ss");
  }

  #[test]
  fn test_debug_masks_password() {
    let creds = OwnCloudCredentials::new("https://cloud.example.com", "alice", "hunter2").unwrap();
    let rendered = format!("{creds:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("alice"));
  }
}
