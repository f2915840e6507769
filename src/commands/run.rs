//! `run` subcommand: execute the node over input items.
//!
//! Loads the node configuration and the input items, runs the dispatcher
//! against the configured instance, and writes the output items as JSON.
//! Status lines go to stderr so stdout carries only the JSON document.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::cli::{Cli, RunArgs};
use crate::color::ColorScheme;
use crate::commands::auth::load_credentials;
use crate::node::{ExecutionOptions, InputItem, JsonParameters, OutputItem, OwnCloudNode};

/// Node configuration file contents.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
  #[serde(default)]
  pub resource: Option<String>,
  #[serde(default)]
  pub operation: Option<String>,
  #[serde(default)]
  pub parameters: Map<String, Value>,
  #[serde(default)]
  pub continue_on_fail: bool,
}

impl NodeConfig {
  /// Node parameters with top-level `resource`/`operation` folded in.
  pub fn into_parameters(self) -> JsonParameters {
    let mut parameters = self.parameters;
    if let Some(resource) = self.resource {
      parameters.insert("resource".to_string(), Value::String(resource));
    }
    if let Some(operation) = self.operation {
      parameters.insert("operation".to_string(), Value::String(operation));
    }
    JsonParameters::new(parameters)
  }
}

/// Execute the `run` subcommand.
///
/// Exits with code 2 when credentials cannot be resolved and 1 for any other
/// failure. When an item aborts the run, the items produced before it are
/// still written.
///
/// # Arguments
/// * `args` - `run` arguments (config, input, output, flags).
/// * `cli` - Top-level CLI options for connection and behavior.
/// * `colors` - Shared color palette for status output.
pub(crate) async fn handle_run_command(args: &RunArgs, cli: &Cli, colors: &ColorScheme) {
  let credentials = match load_credentials(cli) {
    Ok(credentials) => credentials,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to resolve credentials"));
      eprintln!("  {e:#}");
      process::exit(2);
    }
  };

  let node = match OwnCloudNode::connect(&credentials, cli.auth.timeout) {
    Ok(node) => node,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to create clients"));
      eprintln!("  {e:#}");
      process::exit(1);
    }
  };

  if let Err(e) = run_node(&node, args, cli, colors).await {
    eprintln!("{} {}", colors.error("✗"), colors.error("Run failed"));
    eprintln!("  {}: {e:#}", colors.emphasis("Error"));
    process::exit(1);
  }
}

async fn run_node(node: &OwnCloudNode, args: &RunArgs, cli: &Cli, colors: &ColorScheme) -> Result<()> {
  let config = load_node_config(&args.config).await?;
  let items = read_items(args.input.as_deref()).await?;
  let options = ExecutionOptions {
    continue_on_fail: args.continue_on_fail || config.continue_on_fail,
  };
  let parameters = config.into_parameters();

  if !cli.behavior.quiet {
    eprintln!(
      "{} {} {}",
      colors.progress("→"),
      colors.info("Processing"),
      colors.number(items.len())
    );
  }

  let (output, failure) = match node.execute(&items, &parameters, options).await {
    Ok(output) => (output, None),
    Err(mut error) => (std::mem::take(&mut error.output), Some(error)),
  };

  let document = match &args.binary_dir {
    Some(dir) => export_binaries(&output, dir).await?,
    None => serde_json::to_value(&output).context("Failed to serialize output items")?,
  };
  write_output(&document, args.output.as_deref()).await?;

  if let Some(failure) = failure {
    return Err(match failure.item_index {
      Some(index) => failure.error.context(format!("Item {index} failed")),
      None => failure.error,
    });
  }

  if !cli.behavior.quiet {
    let failed = output.iter().filter(|item| item.error_message().is_some()).count();
    eprintln!(
      "{} {} {} {}",
      colors.success("✓"),
      colors.info("Produced"),
      colors.number(output.len()),
      if failed > 0 {
        colors.warning(format!("({failed} failed)"))
      } else {
        String::new()
      }
    );
  }

  Ok(())
}

/// Read and parse the node configuration file.
pub async fn load_node_config(path: &Path) -> Result<NodeConfig> {
  let text = tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("Failed to read node configuration {}", path.display()))?;
  serde_json::from_str(&text).with_context(|| format!("Invalid node configuration {}", path.display()))
}

/// Read input items from a file, stdin (`-`), or default to one empty item.
pub async fn read_items(input: Option<&str>) -> Result<Vec<InputItem>> {
  let text = match input {
    None => return Ok(vec![InputItem::default()]),
    Some("-") => {
      let mut text = String::new();
      tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("Failed to read input items from stdin")?;
      text
    }
    Some(path) => tokio::fs::read_to_string(path)
      .await
      .with_context(|| format!("Failed to read input items {path}"))?,
  };

  parse_items(&text)
}

/// Parse a JSON array of `{json, binary?}` items.
pub fn parse_items(text: &str) -> Result<Vec<InputItem>> {
  serde_json::from_str(text).context("Input items must be a JSON array of {\"json\": ..., \"binary\": ...} objects")
}

/// Serialize `items`, writing every binary payload into `dir`.
///
/// Each payload's `data` is replaced by the `path` of the written file, named
/// `<item>-<field>-<fileName>`.
pub async fn export_binaries(items: &[OutputItem], dir: &Path) -> Result<Value> {
  tokio::fs::create_dir_all(dir)
    .await
    .with_context(|| format!("Failed to create {}", dir.display()))?;

  let mut exported = Vec::with_capacity(items.len());
  for (position, item) in items.iter().enumerate() {
    let mut value = serde_json::to_value(item).context("Failed to serialize output item")?;

    for (field, binary) in &item.binary {
      let name = binary.file_name.as_deref().unwrap_or(field.as_str());
      let target: PathBuf = dir.join(file_component(&format!("{position}-{field}-{name}")));
      tokio::fs::write(&target, &binary.data)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
      debug!(path = %target.display(), bytes = binary.data.len(), "Wrote binary payload");

      let entry = value
        .get_mut("binary")
        .and_then(|binaries| binaries.get_mut(field.as_str()))
        .and_then(Value::as_object_mut);
      if let Some(entry) = entry {
        entry.remove("data");
        entry.insert("path".to_string(), Value::String(target.display().to_string()));
      }
    }

    exported.push(value);
  }

  Ok(Value::Array(exported))
}

/// Keep exported names inside the target directory.
fn file_component(name: &str) -> String {
  name.replace(['/', '\\'], "_")
}

async fn write_output(document: &Value, output: Option<&Path>) -> Result<()> {
  let mut text = serde_json::to_string_pretty(document).context("Failed to serialize output")?;
  text.push('\n');

  match output {
    Some(path) => tokio::fs::write(path, text)
      .await
      .with_context(|| format!("Failed to write {}", path.display())),
    None => {
      use tokio::io::AsyncWriteExt;
      let mut stdout = tokio::io::stdout();
      stdout.write_all(text.as_bytes()).await.context("Failed to write output")?;
      stdout.flush().await.context("Failed to write output")
    }
  }
}
