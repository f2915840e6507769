//! Command-line interface definitions for owncloud-node.
//!
//! The binary acts as a local host for the node: it loads a node
//! configuration and input items, runs the dispatcher, and prints the output
//! items. A few inspection commands (`ls`, `schema`, `auth`) sit next to it.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::color::ColorScheme;
use crate::commands::auth::handle_auth_command;
use crate::commands::completions::handle_completions_command;
use crate::commands::ls::handle_ls_command;
use crate::commands::run::handle_run_command;
use crate::commands::schema::handle_schema_command;
use crate::commands::version::handle_version_command;

/// owncloud-node - Run ownCloud file and share operations
#[derive(Debug, Parser)]
#[command(
  name = "owncloud-node",
  version,
  about = "Run ownCloud file and share operations",
  long_about = "Runs the ownCloud workflow node locally: WebDAV file operations and OCS share\n\
                operations, one input item at a time, with JSON items in and out.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Connection options
  #[command(flatten)]
  pub auth: AuthOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
  /// Execute the node over a list of input items
  Run(RunArgs),

  /// Print the remote folder tree
  Ls {
    /// Remote folder to start from
    #[arg(value_name = "PATH", default_value = "/")]
    path: String,

    /// Maximum depth when descending into folders (0 lists only PATH itself)
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
  },

  /// Print the node's parameter schema as JSON
  Schema {
    /// Limit output to one resource (file or share)
    #[arg(long, value_name = "RESOURCE")]
    resource: Option<String>,

    /// Show only the fields visible for this operation
    #[arg(long, value_name = "OPERATION")]
    operation: Option<String>,
  },

  /// Authentication testing and inspection
  Auth {
    #[command(subcommand)]
    subcommand: AuthCommand,
  },

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Arguments of `owncloud-node run`
#[derive(Debug, clap::Args)]
pub struct RunArgs {
  /// Node configuration file (JSON)
  #[arg(short, long, value_name = "FILE")]
  pub config: PathBuf,

  /// Input items file (JSON array), `-` for stdin
  #[arg(short, long, value_name = "FILE")]
  pub input: Option<String>,

  /// Write output items here instead of stdout
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// Record failing items as `{"error": ...}` and keep going
  #[arg(long)]
  pub continue_on_fail: bool,

  /// Write binary payloads to this directory instead of inlining base64
  #[arg(long, value_name = "DIR")]
  pub binary_dir: Option<PathBuf>,
}

/// Authentication subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum AuthCommand {
  /// Check the credentials against the WebDAV endpoint
  Test,
  /// Show where each credential comes from
  Show,
}

/// Shells supported by `completions`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Normalize a URL by adding https:// if no scheme is present
fn normalize_url(url: &str) -> Result<String, String> {
  let trimmed = url.trim();

  let parsed = match Url::parse(trimmed) {
    Ok(parsed) if parsed.has_host() => parsed,
    _ => Url::parse(&format!("https://{trimmed}")).map_err(|e| format!("Invalid URL: {e}"))?,
  };

  Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Connection options
#[derive(Debug, Parser)]
pub struct AuthOptions {
  /// ownCloud base URL
  #[arg(long, global = true, env = "OWNCLOUD_URL", value_name = "URL", value_parser = normalize_url)]
  pub url: Option<String>,

  /// ownCloud login name
  #[arg(long, global = true, env = "OWNCLOUD_USER", value_name = "USER")]
  pub user: Option<String>,

  /// ownCloud password or app password
  #[arg(long, global = true, env = "OWNCLOUD_PASSWORD", value_name = "PASSWORD", hide_env_values = true)]
  pub password: Option<String>,

  /// Request timeout in seconds
  #[arg(long, global = true, default_value = "30", value_name = "SECONDS")]
  pub timeout: u64,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.auth.timeout == 0 {
      return Err("--timeout must be at least 1 second".to_string());
    }

    match &self.command {
      Command::Ls { path, .. } if !path.starts_with('/') => Err("PATH must start with /".to_string()),
      Command::Run(args) if args.input.as_deref() == Some("") => Err("--input must not be empty".to_string()),
      _ => Ok(()),
    }
  }
}

/// Parse CLI arguments, initialize shared services, and dispatch to the chosen
/// command.
pub async fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Run(args) => handle_run_command(args, &cli, &colors).await,
    Command::Ls { path, max_depth } => handle_ls_command(path, *max_depth, &cli, &colors).await,
    Command::Schema { resource, operation } => {
      handle_schema_command(resource.as_deref(), operation.as_deref(), &colors);
    }
    Command::Auth { subcommand } => handle_auth_command(*subcommand, &cli, &colors).await,
    Command::Version { json, short } => handle_version_command(*json, *short, &colors),
    Command::Completions { shell } => handle_completions_command(*shell),
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
