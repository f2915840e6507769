//! `ls` subcommand for printing remote folder trees.
//!
//! Walks the WebDAV tree below a folder with `getDirectoryContents` and
//! renders it as an ASCII tree without downloading any content.

use std::future::Future;
use std::pin::Pin;
use std::process;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::commands::auth::load_credentials;
use crate::owncloud::{FileStat, WebDavApi, WebDavClient};

/// A folder entry with its loaded children.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTree {
  pub entry: FileStat,
  pub depth: usize,
  pub children: Vec<RemoteTree>,
}

/// Execute the `ls` subcommand to display a folder tree.
///
/// # Arguments
/// * `path` - Remote folder to start from.
/// * `max_depth` - Optional depth limit (0 lists only `path` itself).
/// * `cli` - Top-level CLI options for auth, behavior, and networking.
/// * `colors` - Shared color palette used to render terminal output.
pub(crate) async fn handle_ls_command(path: &str, max_depth: Option<usize>, cli: &Cli, colors: &ColorScheme) {
  let credentials = match load_credentials(cli) {
    Ok(credentials) => credentials,
    Err(e) => {
      eprintln!("{} {}", colors.error("✗"), colors.error("Failed to resolve credentials"));
      eprintln!("  {e:#}");
      process::exit(2);
    }
  };

  let result = async {
    let client = WebDavClient::new(&credentials, cli.auth.timeout).context("Unable to construct WebDAV client")?;
    run_ls_command(&client, path, max_depth, colors).await
  };

  if let Err(error) = result.await {
    eprintln!("{} {}", colors.error("✗"), colors.error("Failed to list folder tree"));
    eprintln!("  {}: {error:#}", colors.emphasis("Error"));
    process::exit(1);
  }
}

async fn run_ls_command(
  webdav: &dyn WebDavApi,
  path: &str,
  max_depth: Option<usize>,
  colors: &ColorScheme,
) -> Result<()> {
  println!("{} {}", colors.progress("→"), colors.info("Inspecting folder tree"));
  println!("  {}: {}", colors.emphasis("Path"), colors.path(path));
  if let Some(depth) = max_depth {
    println!("  {}: {}", colors.emphasis("Max depth"), colors.number(depth));
  }

  let root = webdav
    .stat(path)
    .await
    .with_context(|| format!("Failed to read {path}"))?;
  let tree = load_tree(webdav, root, 0, max_depth).await?;

  let total = count_nodes(&tree) - 1;
  println!(
    "  {} {}",
    colors.success("✓"),
    colors.info(format!(
      "Found {} {}",
      colors.number(total),
      if total == 1 { "entry" } else { "entries" }
    ))
  );

  println!("\n{}", colors.emphasis("Folder Tree"));
  for line in format_tree_lines(&tree, colors) {
    println!("  {line}");
  }

  Ok(())
}

/// Load `entry` and, for folders within the depth limit, its descendants.
pub fn load_tree<'a>(
  webdav: &'a dyn WebDavApi,
  entry: FileStat,
  depth: usize,
  max_depth: Option<usize>,
) -> Pin<Box<dyn Future<Output = Result<RemoteTree>> + Send + 'a>> {
  Box::pin(async move {
    let mut children = Vec::new();
    let descend = entry.is_directory() && max_depth.is_none_or(|limit| depth < limit);

    if descend {
      for child in webdav.get_directory_contents(&entry.filename).await? {
        children.push(load_tree(webdav, child, depth + 1, max_depth).await?);
      }
    }

    Ok(RemoteTree {
      entry,
      depth,
      children,
    })
  })
}

fn format_tree_lines(tree: &RemoteTree, colors: &ColorScheme) -> Vec<String> {
  let mut lines = Vec::new();
  format_tree_lines_recursive(tree, String::new(), true, true, colors, &mut lines);
  lines
}

fn format_tree_lines_recursive(
  node: &RemoteTree,
  prefix: String,
  is_last: bool,
  is_root: bool,
  colors: &ColorScheme,
  lines: &mut Vec<String>,
) {
  let name = if is_root {
    node.entry.filename.as_str()
  } else {
    node.entry.basename.as_str()
  };
  let label = if node.entry.is_directory() {
    colors.path(format!("{}/", name.trim_end_matches('/')))
  } else {
    colors.emphasis(name)
  };

  let line = if is_root {
    format!("{label} {}", format_metadata(node, colors))
  } else {
    let connector = if is_last { "└── " } else { "├── " };
    format!("{prefix}{connector}{label} {}", format_metadata(node, colors))
  };
  lines.push(line);

  let next_prefix = if is_root {
    prefix
  } else if is_last {
    format!("{prefix}    ")
  } else {
    format!("{prefix}│   ")
  };

  for (idx, child) in node.children.iter().enumerate() {
    let child_is_last = idx + 1 == node.children.len();
    format_tree_lines_recursive(child, next_prefix.clone(), child_is_last, false, colors, lines);
  }
}

fn format_metadata(node: &RemoteTree, colors: &ColorScheme) -> String {
  let modified = node.entry.lastmod.as_deref().unwrap_or("-");
  if node.entry.is_directory() {
    format!("[modified {}]", colors.dimmed(modified))
  } else {
    format!(
      "[{} bytes | modified {}]",
      colors.number(node.entry.size),
      colors.dimmed(modified)
    )
  }
}

fn count_nodes(tree: &RemoteTree) -> usize {
  1 + tree.children.iter().map(count_nodes).sum::<usize>()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cli::ColorOption;
  use crate::owncloud::EntryType;

  fn stat(filename: &str, entry_type: EntryType, size: u64) -> FileStat {
    FileStat {
      filename: filename.to_string(),
      basename: filename.rsplit('/').next().unwrap_or_default().to_string(),
      lastmod: Some("Tue, 29 Jul 2025 01:34:17 GMT".to_string()),
      size,
      entry_type,
      etag: None,
      mime: None,
    }
  }

  fn make_tree() -> RemoteTree {
    RemoteTree {
      entry: stat("/Documents", EntryType::Directory, 0),
      depth: 0,
      children: vec![
        RemoteTree {
          entry: stat("/Documents/Reports", EntryType::Directory, 0),
          depth: 1,
          children: vec![RemoteTree {
            entry: stat("/Documents/Reports/q1.pdf", EntryType::File, 2048),
            depth: 2,
            children: vec![],
          }],
        },
        RemoteTree {
          entry: stat("/Documents/notes.txt", EntryType::File, 12),
          depth: 1,
          children: vec![],
        },
      ],
    }
  }

  #[test]
  fn test_format_tree_lines_structure() {
    let colors = ColorScheme::new(ColorOption::Never);
    let lines = format_tree_lines(&make_tree(), &colors);

    assert_eq!(
      lines,
      vec![
        "/Documents/ [modified Tue, 29 Jul 2025 01:34:17 GMT]",
        "├── Reports/ [modified Tue, 29 Jul 2025 01:34:17 GMT]",
        "│   └── q1.pdf [2048 bytes | modified Tue, 29 Jul 2025 01:34:17 GMT]",
        "└── notes.txt [12 bytes | modified Tue, 29 Jul 2025 01:34:17 GMT]",
      ]
    );
  }

  #[test]
  fn test_count_nodes() {
    assert_eq!(count_nodes(&make_tree()), 4);
  }
}
