//! `.netrc` credential discovery.
//!
//! Lets users keep their ownCloud app password in `~/.netrc` instead of shell
//! history or environment variables:
//!
//! ```text
//! machine cloud.example.com
//!   login alice
//!   password your-app-password
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Credential, CredentialError, CredentialsProvider};

/// A credentials provider backed by a `.netrc` file.
#[derive(Debug, Default)]
pub struct NetrcProvider {
  path: Option<PathBuf>,
}

impl NetrcProvider {
  /// Provider reading `$HOME/.netrc`.
  pub fn new() -> Self {
    Self { path: None }
  }

  /// Provider reading an explicit file instead of `$HOME/.netrc`.
  pub fn with_path(path: impl AsRef<Path>) -> Self {
    Self {
      path: Some(path.as_ref().to_path_buf()),
    }
  }

  fn resolve_path(&self) -> Result<PathBuf, CredentialError> {
    if let Some(path) = &self.path {
      return Ok(path.clone());
    }

    let home = std::env::var("HOME").map_err(|_| CredentialError::NetrcNotFound)?;
    Ok(Path::new(&home).join(".netrc"))
  }
}

impl CredentialsProvider for NetrcProvider {
  /// Resolve credentials for `host` from the `.netrc` file.
  ///
  /// # Returns
  /// * `Ok(Some(Credential))` when a `machine` entry (or a `default` entry)
  ///   supplies both login and password.
  /// * `Ok(None)` when the file is missing or has no usable entry.
  ///
  /// # Errors
  /// Returns `Err(CredentialError)` when the home directory cannot be
  /// determined or the file exists but cannot be read.
  fn get_credentials(&self, host: &str) -> Result<Option<Credential>, CredentialError> {
    let netrc_path = self.resolve_path()?;

    if !netrc_path.exists() {
      debug!(path = %netrc_path.display(), "no .netrc file present");
      return Ok(None);
    }

    let content = std::fs::read_to_string(&netrc_path)?;
    Ok(parse_netrc(&content, host))
  }
}

#[derive(Debug, Default)]
struct NetrcEntry {
  machine: Option<String>,
  is_default: bool,
  login: Option<String>,
  password: Option<String>,
}

impl NetrcEntry {
  fn into_credential(self) -> Option<Credential> {
    Some(Credential {
      username: self.login?,
      password: self.password?,
    })
  }
}

/// Parses `.netrc` content and picks the entry for `target_host`.
///
/// Tokens are whitespace separated, so both the multi-line layout and the
/// classic one-line `machine h login u password p` form work. Lines starting
/// with `#` are comments. An exact `machine` match wins over `default`.
fn parse_netrc(content: &str, target_host: &str) -> Option<Credential> {
  let mut tokens = content
    .lines()
    .map(str::trim)
    .filter(|line| !line.starts_with('#'))
    .flat_map(str::split_whitespace);

  let mut entries: Vec<NetrcEntry> = Vec::new();

  while let Some(token) = tokens.next() {
    match token {
      "machine" => entries.push(NetrcEntry {
        machine: tokens.next().map(str::to_string),
        ..NetrcEntry::default()
      }),
      "default" => entries.push(NetrcEntry {
        is_default: true,
        ..NetrcEntry::default()
      }),
      "login" => {
        let value = tokens.next().map(str::to_string);
        if let Some(entry) = entries.last_mut() {
          entry.login = value;
        }
      }
      "password" => {
        let value = tokens.next().map(str::to_string);
        if let Some(entry) = entries.last_mut() {
          entry.password = value;
        }
      }
      // `account` and `macdef` carry a value we do not use
      "account" | "macdef" => {
        tokens.next();
      }
      _ => {}
    }
  }

  let mut fallback = None;
  for entry in entries {
    if entry.machine.as_deref() == Some(target_host) {
      return entry.into_credential();
    }
    if entry.is_default && fallback.is_none() {
      fallback = Some(entry);
    }
  }

  fallback.and_then(NetrcEntry::into_credential)
}
