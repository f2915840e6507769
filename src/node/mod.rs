//! The ownCloud workflow node: operation selection, parameters, and the
//! per-item dispatcher over the WebDAV and OCS clients.

pub mod error;
pub mod execute;
pub mod file;
pub mod items;
pub mod operation;
pub mod outcome;
pub mod params;
pub mod schema;
pub mod share;

pub use error::{ExecutionError, NodeOperationError};
pub use execute::{ExecutionOptions, OwnCloudNode};
pub use items::{BinaryData, InputItem, OutputItem, PairedItem};
pub use operation::{FileOperation, Operation, Resource, ShareOperation, ShareType};
pub use outcome::OperationOutcome;
pub use params::{ItemContext, ItemParameters, JsonParameters, NodeParameters};
