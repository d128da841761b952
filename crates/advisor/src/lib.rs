#![doc = include_str!("../README.md")]

pub mod engine;
pub mod rules;

pub use engine::{derive, derive_with_advisory};
