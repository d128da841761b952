#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod event;
pub mod hub;
pub mod metrics;
pub mod ports;
pub mod types;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{
    AdvisoryError, ConfigError, ExecError, PentoraError, StoreError, ValidationError,
};

// 설정
pub use config::PentoraConfig;

// 이벤트
pub use event::{
    Event, EventMetadata, RecommendationsEvent, ScanEvent, ScanUpdateEvent, ToolOutputEvent,
    WireEvent,
};

// 허브
pub use hub::{BroadcastHub, SubscriberId};

// 포트 trait
pub use ports::{
    AdvisoryPort, BoxFuture, DynAdvisoryPort, DynScanStore, DynToolRunner, ScanStore, ToolRunner,
};

// 도메인 타입
pub use types::{
    AdvisoryResult, CommandSpec, Finding, FindingCategory, Priority, RawResult, Recommendation,
    RecommendationKind, ScanContext, ScanSession, ScanStatus, Severity, ToolExecution, ToolKind,
};
