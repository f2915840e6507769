//! Authentication subcommand handlers.
//!
//! Covers `owncloud-node auth test`, which stats the WebDAV root with the
//! resolved credentials, and `owncloud-node auth show`, which prints where
//! each credential value comes from.

use std::process;

use anyhow::{Context, Result, anyhow, bail};
use url::Url;

use crate::cli::{AuthCommand, Cli};
use crate::color::ColorScheme;
use crate::credentials::{Credential, CredentialsProvider, NetrcProvider, OwnCloudCredentials};
use crate::owncloud::{WebDavApi, WebDavClient};

/// Dispatch the authentication subcommands defined under `owncloud-node auth`.
///
/// # Arguments
/// * `subcommand` - Auth-specific variant to execute.
/// * `cli` - Parsed CLI settings containing the connection options.
/// * `colors` - Shared color scheme used to render output consistently.
pub(crate) async fn handle_auth_command(subcommand: AuthCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    AuthCommand::Test => test_auth(cli, colors).await,
    AuthCommand::Show => show_auth_config(cli, colors),
  }
}

async fn test_auth(cli: &Cli, colors: &ColorScheme) {
  let credentials = match load_credentials(cli) {
    Ok(credentials) => credentials,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to load credentials"));
      eprintln!("  {e}");
      eprintln!("\n{}", colors.info("Provide credentials via:"));
      eprintln!("  • CLI flags: --url, --user and --password");
      eprintln!("  • Environment variables: OWNCLOUD_URL, OWNCLOUD_USER and OWNCLOUD_PASSWORD");
      eprintln!("  • ~/.netrc file (user and password only)");
      process::exit(2);
    }
  };

  println!("{} {}", colors.info("→"), colors.info("Testing authentication"));
  println!("  {}: {}", colors.emphasis("URL"), colors.link(credentials.host()));
  println!("  {}: {}", colors.emphasis("Username"), credentials.username());
  println!("  {}: {}", colors.emphasis("WebDAV"), colors.link(credentials.webdav_url()));

  let client = match WebDavClient::new(&credentials, cli.auth.timeout) {
    Ok(client) => client,
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Failed to create WebDAV client"));
      eprintln!("  {e:#}");
      process::exit(1);
    }
  };

  println!("\n{} {}", colors.info("→"), colors.info("Reading the WebDAV root..."));
  match client.stat("/").await {
    Ok(root) => {
      println!(
        "\n{} {}",
        colors.success("✓"),
        colors.success("Authentication successful!")
      );
      if let Some(lastmod) = &root.lastmod {
        println!("  {}: {}", colors.emphasis("Last modified"), colors.dimmed(lastmod));
      }
      if let Some(etag) = &root.etag {
        println!("  {}: {}", colors.emphasis("ETag"), colors.dimmed(etag));
      }
    }
    Err(e) => {
      eprintln!("\n{} {}", colors.error("✗"), colors.error("Authentication failed"));
      eprintln!("  {e:#}");
      eprintln!("\n{}", colors.info("Common issues:"));
      eprintln!("  1. Wrong password - with two-factor auth enabled, use an app password");
      eprintln!("  2. Wrong username - must be the login name, not the display name");
      eprintln!("  3. Wrong base URL - include the sub-path if ownCloud is not served at /");
      eprintln!("  4. Network connectivity issues");
      eprintln!(
        "\n{}",
        colors.dimmed("Run 'owncloud-node auth show' to see your current configuration")
      );
      process::exit(2);
    }
  }
}

/// Where a credential value was found.
fn source_label(env_var: &str, flag_value: Option<&str>) -> &'static str {
  if std::env::var(env_var).is_ok() {
    "environment variable"
  } else if flag_value.is_some() {
    "command-line flag"
  } else {
    "not set"
  }
}

/// Display the configured connection settings and their sources.
///
/// # Arguments
/// * `cli` - Parsed CLI options containing the user-facing configuration.
/// * `colors` - Color palette used for consistent output.
fn show_auth_config(cli: &Cli, colors: &ColorScheme) {
  println!("{}\n", colors.emphasis("Authentication Configuration"));

  let url = cli.auth.url.as_deref();
  match url {
    Some(value) => {
      println!("{}: {}", colors.emphasis("Base URL"), colors.link(value));
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(source_label("OWNCLOUD_URL", url))
      );
    }
    None => println!("{}: {}", colors.emphasis("Base URL"), colors.dimmed("(not set)")),
  }

  let username = cli.auth.user.as_deref();
  let password = cli.auth.password.as_deref();
  let netrc = if username.is_none() || password.is_none() {
    url.and_then(|url| netrc_credential(&NetrcProvider::new(), url).ok().flatten())
  } else {
    None
  };

  if let Some(value) = username {
    println!("\n{}: {}", colors.emphasis("Username"), value);
    println!(
      "  {}: {}",
      colors.dimmed("Source"),
      colors.dimmed(source_label("OWNCLOUD_USER", username))
    );
  } else if let Some(credential) = &netrc {
    println!("\n{}: {}", colors.emphasis("Username"), credential.username);
    println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(".netrc file"));
  } else {
    println!("\n{}: {}", colors.emphasis("Username"), colors.dimmed("(not set)"));
  }

  if let Some(value) = password {
    println!("\n{}: {}", colors.emphasis("Password"), colors.dimmed(mask(value)));
    println!(
      "  {}: {}",
      colors.dimmed("Source"),
      colors.dimmed(source_label("OWNCLOUD_PASSWORD", password))
    );
  } else if netrc.is_some() {
    println!("\n{}: {}", colors.emphasis("Password"), colors.dimmed("********"));
    println!("  {}: {}", colors.dimmed("Source"), colors.dimmed(".netrc file"));
  } else {
    println!("\n{}: {}", colors.emphasis("Password"), colors.dimmed("(not set)"));
  }

  let has_username = username.is_some() || netrc.is_some();
  let has_password = password.is_some() || netrc.is_some();

  if url.is_none() || !has_username || !has_password {
    println!(
      "\n{} {}",
      colors.warning("⚠"),
      colors.warning("Configuration incomplete")
    );
    if url.is_none() {
      println!("  Missing: base URL (use --url or OWNCLOUD_URL)");
    }
    if !has_username {
      println!("  Missing: username (use --user or OWNCLOUD_USER)");
    }
    if !has_password {
      println!("  Missing: password (use --password or OWNCLOUD_PASSWORD)");
    }
  } else {
    println!("\n{} {}", colors.success("✓"), colors.success("Credentials configured"));
  }
}

/// Mask a secret, keeping the first four characters of long values.
fn mask(secret: &str) -> String {
  let length = secret.chars().count();
  if length > 8 {
    let head: String = secret.chars().take(4).collect();
    format!("{head}{}", "*".repeat(length - 4))
  } else {
    "*".repeat(length)
  }
}

/// Resolve ownCloud credentials from CLI flags, environment variables, or
/// `.netrc`.
///
/// Explicit flags and environment variables win; missing values are filled
/// from the `.netrc` entry for the URL's host.
///
/// # Errors
/// Returns an error when no base URL is configured, when `.netrc` cannot be
/// read, or when no source provides both username and password.
pub(crate) fn load_credentials(cli: &Cli) -> Result<OwnCloudCredentials> {
  resolve_credentials(
    cli.auth.url.as_deref(),
    cli.auth.user.as_deref(),
    cli.auth.password.as_deref(),
    &NetrcProvider::new(),
  )
}

fn resolve_credentials(
  url: Option<&str>,
  user: Option<&str>,
  password: Option<&str>,
  provider: &dyn CredentialsProvider,
) -> Result<OwnCloudCredentials> {
  let url = url.ok_or_else(|| anyhow!("Base URL not provided (use --url or OWNCLOUD_URL)"))?;

  if let (Some(user), Some(password)) = (user, password) {
    return Ok(OwnCloudCredentials::new(url, user, password)?);
  }

  if let Some(credential) = netrc_credential(provider, url)? {
    let user = user.map(str::to_string).unwrap_or(credential.username);
    let password = password.map(str::to_string).unwrap_or(credential.password);
    return Ok(OwnCloudCredentials::new(url, user, password)?);
  }

  bail!(
    "Credentials not found. Provide --user and --password, set OWNCLOUD_USER and OWNCLOUD_PASSWORD, or add to ~/.netrc"
  )
}

fn netrc_credential(provider: &dyn CredentialsProvider, url: &str) -> Result<Option<Credential>> {
  let host = Url::parse(url)
    .ok()
    .and_then(|parsed| parsed.host_str().map(str::to_string))
    .with_context(|| format!("Invalid base URL: {url}"))?;

  Ok(provider.get_credentials(&host)?)
}
