//! reqwest-based WebDAV client for the user's ownCloud file tree.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, IF_NONE_MATCH};
use reqwest::{Method, RequestBuilder, Response};
use tracing::{debug, trace};
use url::Url;

use super::api::WebDavApi;
use super::error::HttpStatusError;
use super::models::{EntryType, FileStat};
use super::paths::{self, join_remote_path, normalize_remote_path, remote_path_from_href};
use super::propfind::{self, PROPFIND_BODY, PropfindEntry};
use crate::credentials::OwnCloudCredentials;

/// WebDAV client rooted at `{host}/remote.php/dav/files/{username}/`.
#[derive(Clone)]
pub struct WebDavClient {
  root: Url,
  auth_header: String,
  client: reqwest::Client,
}

impl WebDavClient {
  /// Create a client for the credentials' WebDAV root.
  ///
  /// # Arguments
  /// * `credentials` - Resolved instance URL and login.
  /// * `timeout_secs` - Per-request timeout in seconds.
  ///
  /// # Errors
  /// Returns an error if the host does not form a valid URL or the HTTP
  /// client cannot be built.
  pub fn new(credentials: &OwnCloudCredentials, timeout_secs: u64) -> Result<Self> {
    let root = Url::parse(&credentials.webdav_url())
      .with_context(|| format!("Invalid ownCloud URL: {}", credentials.host()))?;

    Ok(Self {
      root,
      auth_header: credentials.authorization_header(),
      client: super::http_client(timeout_secs)?,
    })
  }

  /// The WebDAV root URL all paths are resolved against.
  pub fn root(&self) -> &Url {
    &self.root
  }

  fn url_for(&self, path: &str) -> Result<Url> {
    join_remote_path(&self.root, path)
  }

  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
    let url = self.url_for(path)?;
    Ok(
      self
        .client
        .request(method, url)
        .header(AUTHORIZATION, &self.auth_header),
    )
  }

  /// Send `request` and turn any non-2xx status into an [`HttpStatusError`].
  async fn send(&self, request: RequestBuilder, method: &str, path: &str) -> Result<Response> {
    debug!(method, path, "WebDAV request");

    let response = request
      .send()
      .await
      .with_context(|| format!("Failed to send {method} request for {path}"))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      trace!(method, path, %status, body = %body, "WebDAV error response");
      return Err(
        HttpStatusError {
          method: method.to_string(),
          path: path.to_string(),
          status,
          details: propfind::error_message(&body).unwrap_or_default(),
        }
        .into(),
      );
    }

    Ok(response)
  }

  async fn propfind(&self, path: &str, depth: &'static str) -> Result<Vec<PropfindEntry>> {
    let request = self
      .request(dav_method("PROPFIND")?, path)?
      .header("Depth", depth)
      .header(CONTENT_TYPE, "application/xml; charset=utf-8")
      .body(PROPFIND_BODY);

    let response = self.send(request, "PROPFIND", path).await?;
    let body = response
      .text()
      .await
      .with_context(|| format!("Failed to read PROPFIND response for {path}"))?;
    trace!(path, body = %body, "PROPFIND response");

    propfind::parse_multistatus(&body).with_context(|| format!("Invalid PROPFIND response for {path}"))
  }

  fn to_file_stat(&self, entry: PropfindEntry) -> FileStat {
    let filename = remote_path_from_href(&self.root, &entry.href);
    let basename = paths::basename(&filename).to_string();

    if entry.is_collection {
      FileStat {
        filename,
        basename,
        lastmod: entry.last_modified,
        size: 0,
        entry_type: EntryType::Directory,
        etag: entry.etag,
        mime: None,
      }
    } else {
      FileStat {
        filename,
        basename,
        lastmod: entry.last_modified,
        size: entry.content_length.unwrap_or(0),
        entry_type: EntryType::File,
        etag: entry.etag,
        mime: entry.content_type,
      }
    }
  }
}

#[async_trait]
impl WebDavApi for WebDavClient {
  async fn put_file_contents(&self, path: &str, data: Vec<u8>, overwrite: bool) -> Result<()> {
    let mut request = self
      .request(Method::PUT, path)?
      .header(CONTENT_TYPE, "application/octet-stream")
      .body(data);
    if !overwrite {
      request = request.header(IF_NONE_MATCH, "*");
    }

    self.send(request, "PUT", path).await?;
    Ok(())
  }

  async fn get_file_contents(&self, path: &str) -> Result<Vec<u8>> {
    let request = self.request(Method::GET, path)?;
    let response = self.send(request, "GET", path).await?;

    let bytes = response
      .bytes()
      .await
      .with_context(|| format!("Failed to read file content of {path}"))?;
    Ok(bytes.to_vec())
  }

  async fn delete_file(&self, path: &str) -> Result<()> {
    let request = self.request(Method::DELETE, path)?;
    self.send(request, "DELETE", path).await?;
    Ok(())
  }

  async fn create_directory(&self, path: &str) -> Result<()> {
    let request = self.request(dav_method("MKCOL")?, path)?;
    self.send(request, "MKCOL", path).await?;
    Ok(())
  }

  async fn get_directory_contents(&self, path: &str) -> Result<Vec<FileStat>> {
    let listed = normalize_remote_path(path);
    let entries = self.propfind(path, "1").await?;

    Ok(
      entries
        .into_iter()
        .map(|entry| self.to_file_stat(entry))
        .filter(|stat| stat.filename != listed)
        .collect(),
    )
  }

  async fn move_file(&self, from: &str, to: &str) -> Result<()> {
    let destination = self.url_for(to)?;
    let request = self
      .request(dav_method("MOVE")?, from)?
      .header("Destination", destination.as_str())
      .header("Overwrite", "T");

    self.send(request, "MOVE", from).await?;
    Ok(())
  }

  async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
    let destination = self.url_for(to)?;
    let request = self
      .request(dav_method("COPY")?, from)?
      .header("Destination", destination.as_str())
      .header("Overwrite", "T");

    self.send(request, "COPY", from).await?;
    Ok(())
  }

  async fn stat(&self, path: &str) -> Result<FileStat> {
    let entry = self
      .propfind(path, "0")
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| anyhow!("PROPFIND {path} returned no entries"))?;

    Ok(self.to_file_stat(entry))
  }
}

fn dav_method(name: &'static str) -> Result<Method> {
  Method::from_bytes(name.as_bytes()).with_context(|| format!("Invalid HTTP method {name}"))
}
