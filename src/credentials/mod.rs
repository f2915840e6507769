//! Credentials for talking to an ownCloud instance.
//!
//! [`OwnCloudCredentials`] turns a stored host/username/password triple into
//! the two things the rest of the crate needs: the WebDAV root URL and the
//! Basic-Auth header used for OCS calls. Stored logins can come from CLI
//! flags, environment variables, or a [`NetrcProvider`].

mod netrc;
mod provider;
mod types;

pub use netrc::NetrcProvider;
pub use provider::CredentialsProvider;
pub use types::{Credential, CredentialError, OwnCloudCredentials};
