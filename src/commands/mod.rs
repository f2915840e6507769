//! CLI subcommand handlers.
//!
//! One module per `owncloud-node` subcommand; `cli::run` dispatches to the
//! `handle_*_command` entry points.

pub mod auth;
pub mod completions;
pub mod ls;
pub mod run;
pub mod schema;
pub mod version;
