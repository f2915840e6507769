//! Helpers for mapping remote paths to WebDAV URLs and back.

use std::borrow::Cow;

use anyhow::{Result, anyhow};
use url::Url;

/// Append a user-facing remote path (e.g., `/Documents/a b.txt`) to the WebDAV
/// root URL, percent-encoding each segment.
///
/// A trailing `/` on `path` is kept so folder URLs stay folder URLs; an empty
/// path or `/` resolves to the root itself.
///
/// # Errors
/// Returns an error when `root` cannot carry path segments (e.g., `data:` URLs).
pub fn join_remote_path(root: &Url, path: &str) -> Result<Url> {
  let mut url = root.clone();
  {
    let mut segments = url
      .path_segments_mut()
      .map_err(|_| anyhow!("WebDAV root URL cannot carry a path: {root}"))?;
    segments.pop_if_empty();
    segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
    if path.is_empty() || path.ends_with('/') {
      segments.push("");
    }
  }
  Ok(url)
}

/// Convert an `href` from a multistatus response into a path relative to the
/// WebDAV root, with a leading `/` and without a trailing one.
///
/// Hrefs may be absolute URLs or absolute paths and are percent-decoded.
pub fn remote_path_from_href(root: &Url, href: &str) -> String {
  let href_path = if href.starts_with("http://") || href.starts_with("https://") {
    Url::parse(href)
      .map(|url| url.path().to_string())
      .unwrap_or_else(|_| href.to_string())
  } else {
    href.to_string()
  };

  let decoded = percent_decode(&href_path);
  let root_path = percent_decode(root.path());
  let root_path = root_path.trim_end_matches('/');

  let relative = decoded.strip_prefix(root_path).unwrap_or(&decoded);
  normalize_remote_path(relative)
}

/// Force a remote path into `/a/b` form.
pub fn normalize_remote_path(path: &str) -> String {
  format!("/{}", path.trim_matches('/'))
}

/// Last segment of a normalized remote path; empty for the root.
pub fn basename(path: &str) -> &str {
  path.rsplit('/').next().unwrap_or_default()
}

/// File name used for downloaded content: the last path segment, or `"file"`
/// when there is none (e.g., the path ends in `/`).
pub fn download_file_name(path: &str) -> &str {
  path
    .rsplit('/')
    .next()
    .filter(|segment| !segment.is_empty())
    .unwrap_or("file")
}

fn percent_decode(value: &str) -> String {
  urlencoding::decode(value)
    .map(Cow::into_owned)
    .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn root() -> Url {
    Url::parse("https://cloud.example.com/remote.php/dav/files/alice/").unwrap()
  }

  #[test]
  fn test_join_remote_path_encodes_segments() {
    let url = join_remote_path(&root(), "/Documents/Q1 report.pdf").unwrap();
    assert_eq!(
      url.as_str(),
      "https://cloud.example.com/remote.php/dav/files/alice/Documents/Q1%20report.pdf"
    );
  }

  #[test]
  fn test_join_remote_path_keeps_trailing_slash() {
    let url = join_remote_path(&root(), "/Photos/").unwrap();
    assert_eq!(url.as_str(), "https://cloud.example.com/remote.php/dav/files/alice/Photos/");
  }

  #[test]
  fn test_join_remote_path_root() {
    assert_eq!(join_remote_path(&root(), "/").unwrap(), root());
    assert_eq!(join_remote_path(&root(), "").unwrap(), root());
  }

  #[test]
  fn test_join_remote_path_collapses_duplicate_slashes() {
    let url = join_remote_path(&root(), "//a//b.txt").unwrap();
    assert_eq!(url.as_str(), "https://cloud.example.com/remote.php/dav/files/alice/a/b.txt");
  }

  #[test]
  fn test_remote_path_from_absolute_path_href() {
    let path = remote_path_from_href(&root(), "/remote.php/dav/files/alice/Documents/Q1%20report.pdf");
    assert_eq!(path, "/Documents/Q1 report.pdf");
  }

  #[test]
  fn test_remote_path_from_full_url_href() {
    let path = remote_path_from_href(
      &root(),
      "https://cloud.example.com/remote.php/dav/files/alice/Photos/",
    );
    assert_eq!(path, "/Photos");
  }

  #[test]
  fn test_remote_path_from_root_href() {
    assert_eq!(remote_path_from_href(&root(), "/remote.php/dav/files/alice/"), "/");
  }

  #[test]
  fn test_basename() {
    assert_eq!(basename("/Documents/report.pdf"), "report.pdf");
    assert_eq!(basename("/"), "");
  }

  #[test]
  fn test_download_file_name() {
    assert_eq!(download_file_name("/Documents/report.pdf"), "report.pdf");
    assert_eq!(download_file_name("report.pdf"), "report.pdf");
    assert_eq!(download_file_name("/Documents/"), "file");
    assert_eq!(download_file_name(""), "file");
  }
}
