//! The per-item execution loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::error::{ExecutionError, NodeOperationError};
use super::file;
use super::items::{InputItem, OutputItem};
use super::operation::{Operation, Resource};
use super::params::{ItemContext, ItemParameters, NodeParameters};
use super::share;
use crate::credentials::OwnCloudCredentials;
use crate::owncloud::{OcsApi, OcsClient, WebDavApi, WebDavClient};

/// Run-level settings supplied by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionOptions {
  /// Record per-item failures as `{error}` items instead of aborting.
  pub continue_on_fail: bool,
}

/// The ownCloud node: dispatches operations to WebDAV and OCS.
#[derive(Clone)]
pub struct OwnCloudNode {
  webdav: Arc<dyn WebDavApi>,
  ocs: Arc<dyn OcsApi>,
}

impl OwnCloudNode {
  pub fn new(webdav: Arc<dyn WebDavApi>, ocs: Arc<dyn OcsApi>) -> Self {
    Self { webdav, ocs }
  }

  /// Build a node backed by the HTTP clients for `credentials`.
  ///
  /// # Arguments
  /// * `credentials` - Instance URL and login.
  /// * `timeout_secs` - Per-request timeout in seconds.
  ///
  /// # Errors
  /// Returns an error if either HTTP client cannot be created.
  pub fn connect(credentials: &OwnCloudCredentials, timeout_secs: u64) -> Result<Self> {
    let webdav = WebDavClient::new(credentials, timeout_secs).context("Failed to create WebDAV client")?;
    let ocs = OcsClient::new(credentials, timeout_secs).context("Failed to create OCS client")?;
    Ok(Self::new(Arc::new(webdav), Arc::new(ocs)))
  }

  /// Resolve the operation for the whole run from the parameters of item 0.
  ///
  /// # Errors
  /// Fails when `resource` or `operation` is not a string or is unknown.
  pub fn resolve_operation(parameters: &dyn NodeParameters, items: &[InputItem]) -> Result<Operation> {
    let empty = InputItem::default();
    let context = ItemContext {
      index: 0,
      item: items.first().unwrap_or(&empty),
    };

    let resource = match selector(parameters, "resource", &context)? {
      Some(name) => name.parse()?,
      None => Resource::File,
    };
    match selector(parameters, "operation", &context)? {
      Some(name) => Operation::resolve(resource.as_str(), &name),
      None => Ok(Operation::default_for(resource)),
    }
  }

  /// Execute the node over `items`.
  ///
  /// Items are processed strictly in order, one at a time. Every item yields
  /// its operation's output items (all paired with the item's index) or, when
  /// `continue_on_fail` is set and the item fails, one `{error}` item.
  ///
  /// # Arguments
  /// * `items` - Input items of the run.
  /// * `parameters` - Node parameters, resolved per item.
  /// * `options` - Run-level settings.
  ///
  /// # Returns
  /// The output items of the whole run.
  ///
  /// # Errors
  /// Returns an [`ExecutionError`] when the operation cannot be resolved, or
  /// when an item fails and `continue_on_fail` is off. The error keeps the
  /// items emitted before the failure.
  pub async fn execute(
    &self,
    items: &[InputItem],
    parameters: &dyn NodeParameters,
    options: ExecutionOptions,
  ) -> Result<Vec<OutputItem>, ExecutionError> {
    let operation = Self::resolve_operation(parameters, items).map_err(|error| ExecutionError {
      item_index: None,
      error,
      output: Vec::new(),
    })?;
    info!(%operation, items = items.len(), continue_on_fail = options.continue_on_fail, "Executing ownCloud node");

    let mut output = Vec::new();
    for (index, item) in items.iter().enumerate() {
      let params = ItemParameters::new(parameters, operation, index, item);

      match self.execute_item(operation, &params).await {
        Ok(produced) => {
          debug!(item = index, produced = produced.len(), "Item done");
          output.extend(produced);
        }
        Err(error) if options.continue_on_fail => {
          warn!(item = index, error = %format!("{error:#}"), "Item failed, continuing");
          output.push(OutputItem::error(format!("{error:#}"), index));
        }
        Err(error) => {
          warn!(item = index, error = %format!("{error:#}"), "Item failed, aborting run");
          return Err(ExecutionError {
            item_index: Some(index),
            error,
            output,
          });
        }
      }
    }

    Ok(output)
  }

  async fn execute_item(&self, operation: Operation, params: &ItemParameters<'_>) -> Result<Vec<OutputItem>> {
    let outcome = match operation {
      Operation::File(op) => file::run(self.webdav.as_ref(), op, params).await?,
      Operation::Share(op) => share::run(self.ocs.as_ref(), op, params).await?,
    };
    outcome.into_items(params.index())
  }
}

fn selector(parameters: &dyn NodeParameters, name: &str, context: &ItemContext<'_>) -> Result<Option<String>> {
  match parameters.get(name, context)? {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(value)) if value.is_empty() => Ok(None),
    Some(Value::String(value)) => Ok(Some(value)),
    Some(other) => Err(NodeOperationError::for_run(format!("Parameter \"{name}\" must be a string, got {other}")).into()),
  }
}
