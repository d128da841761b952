#![doc = include_str!("../README.md")]

pub mod orchestrator;
pub mod pipeline;
pub mod store;

pub use orchestrator::{ScanOrchestrator, StartScanRequest};
pub use pipeline::{ScanKind, StageDef, StagePrecondition, stages_for};
pub use store::MemoryScanStore;
