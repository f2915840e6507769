//! In-memory WebDAV store for testing
//!
//! Implements [`WebDavApi`] over a map of paths, failing with the same
//! `HttpStatusError` statuses a real server would return.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use owncloud_node::owncloud::{EntryType, FileStat, HttpStatusError, WebDavApi};
use reqwest::StatusCode;

#[derive(Debug, Clone)]
enum Node {
  File(Vec<u8>),
  Folder,
}

/// A fake WebDAV server holding a whole file tree in memory.
pub struct FakeWebDav {
  nodes: Mutex<BTreeMap<String, Node>>,
  broken: Mutex<HashSet<String>>,
}

impl FakeWebDav {
  /// An empty store containing only the root folder.
  pub fn new() -> Self {
    let mut nodes = BTreeMap::new();
    nodes.insert("/".to_string(), Node::Folder);
    Self {
      nodes: Mutex::new(nodes),
      broken: Mutex::new(HashSet::new()),
    }
  }

  /// Add a file, creating its parent folders.
  pub fn add_file(&self, path: &str, data: &[u8]) {
    let path = normalize(path);
    self.add_parents(&path);
    self.nodes.lock().unwrap().insert(path, Node::File(data.to_vec()));
  }

  /// Add a folder, creating its parent folders.
  pub fn add_folder(&self, path: &str) {
    let path = normalize(path);
    self.add_parents(&path);
    self.nodes.lock().unwrap().insert(path, Node::Folder);
  }

  /// Make every request touching `path` fail with a 500.
  #[allow(dead_code)]
  pub fn break_path(&self, path: &str) {
    self.broken.lock().unwrap().insert(normalize(path));
  }

  /// Raw content of a stored file.
  #[allow(dead_code)]
  pub fn file(&self, path: &str) -> Option<Vec<u8>> {
    match self.nodes.lock().unwrap().get(&normalize(path)) {
      Some(Node::File(data)) => Some(data.clone()),
      _ => None,
    }
  }

  fn add_parents(&self, path: &str) {
    let mut nodes = self.nodes.lock().unwrap();
    let mut current = parent(path);
    while let Some(folder) = current {
      nodes.entry(folder.clone()).or_insert(Node::Folder);
      current = parent(&folder);
    }
  }

  fn check(&self, method: &str, path: &str) -> Result<String> {
    let path = normalize(path);
    if self.broken.lock().unwrap().contains(&path) {
      return Err(status_error(method, &path, StatusCode::INTERNAL_SERVER_ERROR).into());
    }
    Ok(path)
  }

  fn entry(nodes: &BTreeMap<String, Node>, path: &str) -> FileStat {
    let basename = path.rsplit('/').next().unwrap_or_default().to_string();
    match &nodes[path] {
      Node::File(data) => FileStat {
        filename: path.to_string(),
        basename,
        lastmod: Some("Tue, 29 Jul 2025 01:34:17 GMT".to_string()),
        size: data.len() as u64,
        entry_type: EntryType::File,
        etag: Some(format!("etag-{}", data.len())),
        mime: Some(mime_guess::from_path(path).first_or_octet_stream().to_string()),
      },
      Node::Folder => FileStat {
        filename: path.to_string(),
        basename,
        lastmod: Some("Tue, 29 Jul 2025 01:34:17 GMT".to_string()),
        size: 0,
        entry_type: EntryType::Directory,
        etag: Some("etag-folder".to_string()),
        mime: None,
      },
    }
  }
}

impl Default for FakeWebDav {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl WebDavApi for FakeWebDav {
  async fn put_file_contents(&self, path: &str, data: Vec<u8>, overwrite: bool) -> Result<()> {
    let path = self.check("PUT", path)?;
    let mut nodes = self.nodes.lock().unwrap();

    match parent(&path).and_then(|folder| nodes.get(&folder).cloned()) {
      Some(Node::Folder) => {}
      _ => return Err(status_error("PUT", &path, StatusCode::CONFLICT).into()),
    }
    match nodes.get(&path) {
      Some(Node::Folder) => return Err(status_error("PUT", &path, StatusCode::METHOD_NOT_ALLOWED).into()),
      Some(Node::File(_)) if !overwrite => return Err(status_error("PUT", &path, StatusCode::PRECONDITION_FAILED).into()),
      _ => {}
    }

    nodes.insert(path, Node::File(data));
    Ok(())
  }

  async fn get_file_contents(&self, path: &str) -> Result<Vec<u8>> {
    let path = self.check("GET", path)?;
    match self.nodes.lock().unwrap().get(&path) {
      Some(Node::File(data)) => Ok(data.clone()),
      Some(Node::Folder) => Err(status_error("GET", &path, StatusCode::METHOD_NOT_ALLOWED).into()),
      None => Err(status_error("GET", &path, StatusCode::NOT_FOUND).into()),
    }
  }

  async fn delete_file(&self, path: &str) -> Result<()> {
    let path = self.check("DELETE", path)?;
    let mut nodes = self.nodes.lock().unwrap();
    if !nodes.contains_key(&path) {
      return Err(status_error("DELETE", &path, StatusCode::NOT_FOUND).into());
    }
    nodes.retain(|key, _| !is_within(key, &path));
    Ok(())
  }

  async fn create_directory(&self, path: &str) -> Result<()> {
    let path = self.check("MKCOL", path)?;
    let mut nodes = self.nodes.lock().unwrap();
    if nodes.contains_key(&path) {
      return Err(status_error("MKCOL", &path, StatusCode::METHOD_NOT_ALLOWED).into());
    }
    match parent(&path).and_then(|folder| nodes.get(&folder).cloned()) {
      Some(Node::Folder) => {
        nodes.insert(path, Node::Folder);
        Ok(())
      }
      _ => Err(status_error("MKCOL", &path, StatusCode::CONFLICT).into()),
    }
  }

  async fn get_directory_contents(&self, path: &str) -> Result<Vec<FileStat>> {
    let path = self.check("PROPFIND", path)?;
    let nodes = self.nodes.lock().unwrap();
    match nodes.get(&path) {
      Some(Node::Folder) => {}
      Some(Node::File(_)) => return Ok(vec![]),
      None => return Err(status_error("PROPFIND", &path, StatusCode::NOT_FOUND).into()),
    }

    Ok(
      nodes
        .keys()
        .filter(|key| parent(key).as_deref() == Some(path.as_str()))
        .map(|key| Self::entry(&nodes, key))
        .collect(),
    )
  }

  async fn move_file(&self, from: &str, to: &str) -> Result<()> {
    self.transfer("MOVE", from, to, true)
  }

  async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
    self.transfer("COPY", from, to, false)
  }

  async fn stat(&self, path: &str) -> Result<FileStat> {
    let path = self.check("PROPFIND", path)?;
    let nodes = self.nodes.lock().unwrap();
    if !nodes.contains_key(&path) {
      return Err(status_error("PROPFIND", &path, StatusCode::NOT_FOUND).into());
    }
    Ok(Self::entry(&nodes, &path))
  }
}

impl FakeWebDav {
  fn transfer(&self, method: &str, from: &str, to: &str, remove_source: bool) -> Result<()> {
    let from = self.check(method, from)?;
    let to = self.check(method, to)?;
    let mut nodes = self.nodes.lock().unwrap();

    if !nodes.contains_key(&from) {
      return Err(status_error(method, &from, StatusCode::NOT_FOUND).into());
    }
    match parent(&to).and_then(|folder| nodes.get(&folder).cloned()) {
      Some(Node::Folder) => {}
      _ => return Err(status_error(method, &to, StatusCode::CONFLICT).into()),
    }

    let moved: Vec<(String, Node)> = nodes
      .iter()
      .filter(|(key, _)| is_within(key, &from))
      .map(|(key, node)| (format!("{to}{}", &key[from.len()..]), node.clone()))
      .collect();

    nodes.retain(|key, _| !is_within(key, &to));
    if remove_source {
      nodes.retain(|key, _| !is_within(key, &from));
    }
    nodes.extend(moved);
    Ok(())
  }
}

fn status_error(method: &str, path: &str, status: StatusCode) -> HttpStatusError {
  HttpStatusError {
    method: method.to_string(),
    path: path.to_string(),
    status,
    details: String::new(),
  }
}

fn normalize(path: &str) -> String {
  let trimmed = path.trim_end_matches('/');
  if trimmed.is_empty() {
    "/".to_string()
  } else if trimmed.starts_with('/') {
    trimmed.to_string()
  } else {
    format!("/{trimmed}")
  }
}

fn parent(path: &str) -> Option<String> {
  if path == "/" {
    return None;
  }
  match path.rfind('/') {
    Some(0) => Some("/".to_string()),
    Some(idx) => Some(path[..idx].to_string()),
    None => None,
  }
}

fn is_within(key: &str, root: &str) -> bool {
  key == root || (key.starts_with(root) && key[root.len()..].starts_with('/'))
}
