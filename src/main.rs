//! owncloud-node - Run ownCloud file and share operations
//!
//! This is the main entry point for the CLI application.

#[tokio::main]
async fn main() {
  owncloud_node::cli::run().await;
}
