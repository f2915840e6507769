//! Credential provider abstractions.

use super::{Credential, CredentialError};

/// A source of stored ownCloud logins, keyed by hostname.
pub trait CredentialsProvider {
  /// Retrieves credentials for the specified host.
  ///
  /// # Arguments
  /// * `host` - Hostname whose credentials should be resolved (e.g., `cloud.example.com`).
  ///
  /// # Returns
  /// * `Ok(Some(Credential))` when the provider knows the host.
  /// * `Ok(None)` when it does not, so the caller can try the next source.
  ///
  /// # Errors
  /// Returns `Err(CredentialError)` when the backing store is unreadable.
  fn get_credentials(&self, host: &str) -> Result<Option<Credential>, CredentialError>;
}
