#![doc = include_str!("../README.md")]

pub mod command;
pub mod runner;

pub use command::{build_command, validate_component, validate_target};
pub use runner::SystemToolRunner;
