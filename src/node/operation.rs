//! The resource/operation selection and related enums.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Top-level resource the node acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resource {
  File,
  Share,
}

impl Resource {
  pub const ALL: [Resource; 2] = [Resource::File, Resource::Share];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::File => "file",
      Self::Share => "share",
    }
  }
}

impl FromStr for Resource {
  type Err = anyhow::Error;

  fn from_str(value: &str) -> Result<Self> {
    match value {
      "file" => Ok(Self::File),
      "share" => Ok(Self::Share),
      other => Err(anyhow!("The resource \"{other}\" is not known")),
    }
  }
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// File and folder operations (WebDAV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileOperation {
  Copy,
  CreateFolder,
  Delete,
  Download,
  List,
  Move,
  Search,
  Stat,
  Upload,
}

impl FileOperation {
  pub const ALL: [FileOperation; 9] = [
    FileOperation::Copy,
    FileOperation::CreateFolder,
    FileOperation::Delete,
    FileOperation::Download,
    FileOperation::List,
    FileOperation::Move,
    FileOperation::Search,
    FileOperation::Stat,
    FileOperation::Upload,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Copy => "copy",
      Self::CreateFolder => "createFolder",
      Self::Delete => "delete",
      Self::Download => "download",
      Self::List => "list",
      Self::Move => "move",
      Self::Search => "search",
      Self::Stat => "stat",
      Self::Upload => "upload",
    }
  }
}

/// Share operations (OCS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShareOperation {
  Create,
  Delete,
  Get,
  GetAll,
  Update,
}

impl ShareOperation {
  pub const ALL: [ShareOperation; 5] = [
    ShareOperation::Create,
    ShareOperation::Delete,
    ShareOperation::Get,
    ShareOperation::GetAll,
    ShareOperation::Update,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Delete => "delete",
      Self::Get => "get",
      Self::GetAll => "getAll",
      Self::Update => "update",
    }
  }
}

/// A resolved resource + operation pair.
///
/// Resolved once per run; every item of the run executes the same operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  File(FileOperation),
  Share(ShareOperation),
}

impl Operation {
  /// Resolve the raw `resource` and `operation` parameter values.
  ///
  /// # Errors
  /// Returns an error when either value is unknown or the operation does not
  /// belong to the resource.
  pub fn resolve(resource: &str, operation: &str) -> Result<Self> {
    let resource: Resource = resource.parse()?;
    let unknown = || anyhow!("The operation \"{operation}\" is not known for resource \"{resource}\"");

    match resource {
      Resource::File => FileOperation::ALL
        .into_iter()
        .find(|op| op.as_str() == operation)
        .map(Self::File)
        .ok_or_else(unknown),
      Resource::Share => ShareOperation::ALL
        .into_iter()
        .find(|op| op.as_str() == operation)
        .map(Self::Share)
        .ok_or_else(unknown),
    }
  }

  /// Every operation the node offers, file operations first.
  pub fn all() -> impl Iterator<Item = Operation> {
    FileOperation::ALL
      .into_iter()
      .map(Self::File)
      .chain(ShareOperation::ALL.into_iter().map(Self::Share))
  }

  /// Operation selected when only the resource is given.
  pub fn default_for(resource: Resource) -> Self {
    match resource {
      Resource::File => Self::File(FileOperation::Upload),
      Resource::Share => Self::Share(ShareOperation::Create),
    }
  }

  pub fn resource(self) -> Resource {
    match self {
      Self::File(_) => Resource::File,
      Self::Share(_) => Resource::Share,
    }
  }

  /// Operation value as used in parameters (`createFolder`, `getAll`, ...).
  pub fn name(self) -> &'static str {
    match self {
      Self::File(op) => op.as_str(),
      Self::Share(op) => op.as_str(),
    }
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.resource(), self.name())
  }
}

/// Who a share grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareType {
  User,
  Group,
  PublicLink,
  /// Any other numeric type the server understands (e.g., federated).
  Other(i64),
}

impl ShareType {
  pub fn code(self) -> i64 {
    match self {
      Self::User => 0,
      Self::Group => 1,
      Self::PublicLink => 3,
      Self::Other(code) => code,
    }
  }

  /// User and group shares name their recipient in `shareWith`.
  pub fn requires_recipient(self) -> bool {
    matches!(self, Self::User | Self::Group)
  }
}

impl From<i64> for ShareType {
  fn from(code: i64) -> Self {
    match code {
      0 => Self::User,
      1 => Self::Group,
      3 => Self::PublicLink,
      other => Self::Other(other),
    }
  }
}
