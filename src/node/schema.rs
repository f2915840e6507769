//! Declarative parameter table of the node.
//!
//! Describes which fields exist for which resource/operation pair, their
//! defaults, and their option lists. The dispatcher consults it only for
//! defaults and required-ness; everything else is for the host's UI.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::{Map, Value, json};

use super::operation::{FileOperation as F, Operation, Resource, ShareOperation as S};

/// Kind of input a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
  String,
  Options,
  Boolean,
  DateTime,
  Collection,
  ResourceLocator,
}

/// A constant default or option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
  Str(&'static str),
  Int(i64),
  Bool(bool),
  EmptyObject,
  /// Resource locator in the given mode with an empty value.
  Locator(&'static str),
}

impl Literal {
  pub fn to_value(self) -> Value {
    match self {
      Self::Str(text) => Value::String(text.to_string()),
      Self::Int(number) => Value::from(number),
      Self::Bool(flag) => Value::Bool(flag),
      Self::EmptyObject => Value::Object(Map::new()),
      Self::Locator(mode) => json!({ "mode": mode, "value": "" }),
    }
  }

  /// Whether the default stands in for a real value.
  ///
  /// Empty strings and empty locators are placeholders only; a required
  /// field whose sole value is a placeholder counts as missing.
  pub fn is_placeholder(self) -> bool {
    matches!(self, Self::Str("") | Self::Locator(_))
  }
}

impl Serialize for Literal {
  fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
    self.to_value().serialize(serializer)
  }
}

/// One entry of an options list.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Choice {
  pub name: &'static str,
  pub value: Literal,
}

/// Conditions under which a field is shown.
#[derive(Debug, Clone, Copy)]
pub struct Show {
  pub resource: Resource,
  /// Empty means every operation of `resource`.
  pub operations: &'static [Operation],
  /// Only shown for these `shareType` values (empty means any).
  pub share_types: &'static [i64],
}

impl Show {
  pub fn matches(&self, operation: Operation) -> bool {
    operation.resource() == self.resource && (self.operations.is_empty() || self.operations.contains(&operation))
  }
}

impl Serialize for Show {
  fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("resource", &[self.resource])?;
    if !self.operations.is_empty() {
      let names: Vec<&str> = self.operations.iter().map(|op| op.name()).collect();
      map.serialize_entry("operation", &names)?;
    }
    if !self.share_types.is_empty() {
      map.serialize_entry("shareType", self.share_types)?;
    }
    map.end()
  }
}

/// A parameter of the node.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
  pub name: &'static str,
  pub display_name: &'static str,
  #[serde(rename = "type")]
  pub kind: FieldKind,
  pub required: bool,
  pub default: Literal,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub show: Option<Show>,
  #[serde(skip_serializing_if = "is_empty_slice")]
  pub options: &'static [Choice],
  /// Children of a collection field.
  #[serde(skip_serializing_if = "is_empty_slice")]
  pub fields: &'static [FieldSpec],
  pub description: &'static str,
}

fn is_empty_slice<T>(slice: &&[T]) -> bool {
  slice.is_empty()
}

impl FieldSpec {
  /// A present, usable default; `None` for placeholders.
  pub fn default_value(&self) -> Option<Value> {
    (!self.default.is_placeholder()).then(|| self.default.to_value())
  }
}

/// Human-facing description of one operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
  pub operation: Operation,
  pub name: &'static str,
  pub description: &'static str,
  pub action: &'static str,
}

impl Serialize for OperationSpec {
  fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
    let mut map = serializer.serialize_map(Some(5))?;
    map.serialize_entry("resource", &self.operation.resource())?;
    map.serialize_entry("value", self.operation.name())?;
    map.serialize_entry("name", self.name)?;
    map.serialize_entry("description", self.description)?;
    map.serialize_entry("action", self.action)?;
    map.end()
  }
}

const fn op(operation: Operation, name: &'static str, description: &'static str, action: &'static str) -> OperationSpec {
  OperationSpec {
    operation,
    name,
    description,
    action,
  }
}

pub static OPERATIONS: [OperationSpec; 14] = [
  op(Operation::File(F::Copy), "Copy", "Copy a file or folder", "Copy a file or folder"),
  op(Operation::File(F::CreateFolder), "Create Folder", "Create a new folder", "Create a new folder"),
  op(Operation::File(F::Delete), "Delete", "Delete a file or folder", "Delete a file or folder"),
  op(Operation::File(F::Download), "Download", "Download a file", "Download a file"),
  op(
    Operation::File(F::Stat),
    "Get Properties",
    "Get properties of a file or folder",
    "Get properties of a file or folder",
  ),
  op(Operation::File(F::List), "List", "List contents of a folder", "List contents of a folder"),
  op(Operation::File(F::Move), "Move", "Move or rename a file or folder", "Move a file or folder"),
  op(
    Operation::File(F::Search),
    "Search",
    "Search for files and folders",
    "Search for files and folders",
  ),
  op(Operation::File(F::Upload), "Upload", "Upload a file", "Upload a file"),
  op(Operation::Share(S::Create), "Create", "Create a new share", "Create a share"),
  op(Operation::Share(S::Delete), "Delete", "Delete a share", "Delete a share"),
  op(Operation::Share(S::Get), "Get", "Get a share", "Get a share"),
  op(Operation::Share(S::GetAll), "Get Many", "Get many shares", "Get many shares"),
  op(Operation::Share(S::Update), "Update", "Update a share", "Update a share"),
];

const fn show(resource: Resource, operations: &'static [Operation]) -> Option<Show> {
  Some(Show {
    resource,
    operations,
    share_types: &[],
  })
}

const NO_CHOICES: &[Choice] = &[];
const NO_FIELDS: &[FieldSpec] = &[];

const OVERWRITE: FieldSpec = FieldSpec {
  name: "overwrite",
  display_name: "Overwrite",
  kind: FieldKind::Boolean,
  required: false,
  default: Literal::Bool(true),
  show: show(Resource::File, &[Operation::File(F::Upload)]),
  options: NO_CHOICES,
  fields: NO_FIELDS,
  description: "Whether to overwrite an existing file",
};

const SHARE_FIELDS: &[FieldSpec] = &[
  FieldSpec {
    name: "expireDate",
    display_name: "Expiration Date",
    kind: FieldKind::DateTime,
    required: false,
    default: Literal::Str(""),
    show: None,
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Expiration date of the share",
  },
  FieldSpec {
    name: "password",
    display_name: "Password",
    kind: FieldKind::String,
    required: false,
    default: Literal::Str(""),
    show: None,
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Password for the share",
  },
  FieldSpec {
    name: "permissions",
    display_name: "Permissions",
    kind: FieldKind::Options,
    required: false,
    default: Literal::Int(1),
    show: None,
    options: &[
      Choice {
        name: "All",
        value: Literal::Int(31),
      },
      Choice {
        name: "Create",
        value: Literal::Int(4),
      },
      Choice {
        name: "Delete",
        value: Literal::Int(8),
      },
      Choice {
        name: "Read",
        value: Literal::Int(1),
      },
      Choice {
        name: "Share",
        value: Literal::Int(16),
      },
      Choice {
        name: "Update",
        value: Literal::Int(2),
      },
    ],
    fields: NO_FIELDS,
    description: "Permissions for the share",
  },
  FieldSpec {
    name: "publicUpload",
    display_name: "Public Upload",
    kind: FieldKind::Boolean,
    required: false,
    default: Literal::Bool(false),
    show: None,
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Whether to allow public upload",
  },
];

/// Every parameter except the resource/operation selectors.
pub static FIELDS: &[FieldSpec] = &[
  FieldSpec {
    name: "path",
    display_name: "Path",
    kind: FieldKind::ResourceLocator,
    required: true,
    default: Literal::Locator("list"),
    show: show(
      Resource::File,
      &[
        Operation::File(F::Upload),
        Operation::File(F::Download),
        Operation::File(F::Delete),
        Operation::File(F::List),
        Operation::File(F::Move),
        Operation::File(F::Copy),
        Operation::File(F::Stat),
      ],
    ),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "The file or folder to operate on",
  },
  FieldSpec {
    name: "path",
    display_name: "Folder Path",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str(""),
    show: show(Resource::File, &[Operation::File(F::CreateFolder)]),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "The full path for the new folder",
  },
  FieldSpec {
    name: "searchQuery",
    display_name: "Search Query",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str(""),
    show: show(Resource::File, &[Operation::File(F::Search)]),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Search for files and folders by name (case-insensitive)",
  },
  FieldSpec {
    name: "searchPath",
    display_name: "Search Path",
    kind: FieldKind::String,
    required: false,
    default: Literal::Str("/"),
    show: show(Resource::File, &[Operation::File(F::Search)]),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "The folder to search in (default: root)",
  },
  FieldSpec {
    name: "binaryPropertyName",
    display_name: "Binary Property",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str("data"),
    show: show(Resource::File, &[Operation::File(F::Upload)]),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Name of the field in the input item that contains the binary data",
  },
  FieldSpec {
    name: "binaryProperty",
    display_name: "Put Output In Field",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str("data"),
    show: show(Resource::File, &[Operation::File(F::Download)]),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Name of the field for the downloaded binary data",
  },
  FieldSpec {
    name: "destinationPath",
    display_name: "Destination Path",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str(""),
    show: show(Resource::File, &[Operation::File(F::Move), Operation::File(F::Copy)]),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "The destination path for the operation",
  },
  FieldSpec {
    name: "options",
    display_name: "Options",
    kind: FieldKind::Collection,
    required: false,
    default: Literal::EmptyObject,
    show: show(Resource::File, &[]),
    options: NO_CHOICES,
    fields: &[OVERWRITE],
    description: "",
  },
  FieldSpec {
    name: "path",
    display_name: "Path",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str(""),
    show: show(
      Resource::Share,
      &[Operation::Share(S::Create), Operation::Share(S::GetAll)],
    ),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "The path to the file or folder",
  },
  FieldSpec {
    name: "shareId",
    display_name: "Share ID",
    kind: FieldKind::String,
    required: true,
    default: Literal::Str(""),
    show: show(
      Resource::Share,
      &[
        Operation::Share(S::Get),
        Operation::Share(S::Delete),
        Operation::Share(S::Update),
      ],
    ),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "The ID of the share",
  },
  FieldSpec {
    name: "shareType",
    display_name: "Share Type",
    kind: FieldKind::Options,
    required: false,
    default: Literal::Int(3),
    show: show(Resource::Share, &[Operation::Share(S::Create)]),
    options: &[
      Choice {
        name: "Group",
        value: Literal::Int(1),
      },
      Choice {
        name: "Public Link",
        value: Literal::Int(3),
      },
      Choice {
        name: "User",
        value: Literal::Int(0),
      },
    ],
    fields: NO_FIELDS,
    description: "The type of share",
  },
  FieldSpec {
    name: "shareWith",
    display_name: "Share With",
    kind: FieldKind::String,
    required: false,
    default: Literal::Str(""),
    show: Some(Show {
      resource: Resource::Share,
      operations: &[Operation::Share(S::Create)],
      share_types: &[0, 1],
    }),
    options: NO_CHOICES,
    fields: NO_FIELDS,
    description: "Username or group name",
  },
  FieldSpec {
    name: "additionalFields",
    display_name: "Additional Fields",
    kind: FieldKind::Collection,
    required: false,
    default: Literal::EmptyObject,
    show: show(
      Resource::Share,
      &[Operation::Share(S::Create), Operation::Share(S::Update)],
    ),
    options: NO_CHOICES,
    fields: SHARE_FIELDS,
    description: "",
  },
];

/// Display metadata for `operation`.
pub fn operation_spec(operation: Operation) -> &'static OperationSpec {
  OPERATIONS
    .iter()
    .find(|spec| spec.operation == operation)
    .unwrap_or(&OPERATIONS[0])
}

/// Fields shown for `operation`, in table order.
pub fn visible_fields(operation: Operation) -> impl Iterator<Item = &'static FieldSpec> {
  FIELDS
    .iter()
    .filter(move |field| field.show.is_some_and(|show| show.matches(operation)))
}

/// The visible field called `name`, if `operation` has one.
pub fn field(operation: Operation, name: &str) -> Option<&'static FieldSpec> {
  visible_fields(operation).find(|field| field.name == name)
}

/// Whole-node description as served by `schema`.
#[derive(Debug, Serialize)]
pub struct NodeDescription {
  pub name: &'static str,
  #[serde(rename = "displayName")]
  pub display_name: &'static str,
  pub description: &'static str,
  pub resources: Vec<ResourceChoice>,
  pub operations: &'static [OperationSpec],
  pub fields: &'static [FieldSpec],
}

#[derive(Debug, Serialize)]
pub struct ResourceChoice {
  pub value: Resource,
  pub name: &'static str,
  pub description: &'static str,
  #[serde(rename = "defaultOperation")]
  pub default_operation: &'static str,
}

/// Fields visible for one operation.
#[derive(Debug, Serialize)]
pub struct OperationDescription {
  pub resource: Resource,
  pub operation: &'static str,
  pub action: &'static str,
  pub fields: Vec<&'static FieldSpec>,
}

pub fn describe() -> NodeDescription {
  let resources = Resource::ALL
    .into_iter()
    .map(|resource| ResourceChoice {
      value: resource,
      name: match resource {
        Resource::File => "File",
        Resource::Share => "Share",
      },
      description: match resource {
        Resource::File => "Operations with files and folders",
        Resource::Share => "Operations with shares",
      },
      default_operation: Operation::default_for(resource).name(),
    })
    .collect();

  NodeDescription {
    name: "ownCloud",
    display_name: "ownCloud",
    description: "Interact with ownCloud API (WebDAV and OCS)",
    resources,
    operations: &OPERATIONS,
    fields: FIELDS,
  }
}

pub fn describe_operation(operation: Operation) -> OperationDescription {
  OperationDescription {
    resource: operation.resource(),
    operation: operation.name(),
    action: operation_spec(operation).action,
    fields: visible_fields(operation).collect(),
  }
}
