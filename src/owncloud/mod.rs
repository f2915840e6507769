//! ownCloud module providing the WebDAV and OCS API abstractions, their HTTP
//! clients, data models, and path helpers.

use std::time::Duration;

use anyhow::{Context, Result};

pub mod api;
pub mod error;
pub mod models;
pub mod ocs;
pub mod paths;
pub mod propfind;
pub mod webdav;

pub use api::{OcsApi, OcsMethod, WebDavApi};
pub use error::{HttpStatusError, OcsApiError, is_not_found};
pub use models::{EntryType, FileStat};
pub use ocs::{OcsClient, SHARES_ENDPOINT};
pub use webdav::WebDavClient;

/// Build the HTTP client shared by the WebDAV and OCS clients.
fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
  reqwest::Client::builder()
    .timeout(Duration::from_secs(timeout_secs))
    .user_agent(format!(
      "owncloud-node/{} ({})",
      env!("CARGO_PKG_VERSION"),
      env!("TARGET")
    ))
    .build()
    .context("Failed to create HTTP client")
}
