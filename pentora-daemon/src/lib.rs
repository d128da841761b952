//! Pentora daemon library.
//!
//! Exposes internal modules so integration tests can exercise CLI
//! parsing, configuration overrides, and daemon assembly without
//! spawning the binary.

pub mod cli;
pub mod daemon;
pub mod logging;
pub mod metrics_server;
pub mod pidfile;
