//! Shared fakes for the integration tests.

pub mod fake_ocs;
pub mod fake_webdav;
