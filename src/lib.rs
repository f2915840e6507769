//! ownCloud workflow node
//!
//! Runs WebDAV file operations and OCS share operations against an ownCloud
//! instance, one input item at a time.

pub mod cli;
pub mod color;
pub mod commands;
pub mod credentials;
pub mod node;
pub mod owncloud;
