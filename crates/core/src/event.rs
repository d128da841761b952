//! 이벤트 시스템 — 스캔 생명주기 알림의 기본 단위
//!
//! 오케스트레이터는 스캔 상태 변화, 도구 출력, 권고 생성을 이벤트로
//! 발행하고 [`crate::hub::BroadcastHub`]가 구독자에게 전달합니다.
//! [`EventMetadata`]는 모든 이벤트에 공통으로 포함되는 메타데이터이며,
//! [`Event`] trait은 모든 이벤트 타입이 구현해야 하는 인터페이스입니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Recommendation, ScanStatus, ToolKind};

// --- 모듈명 상수 ---

/// 오케스트레이터 모듈명
pub const MODULE_ORCHESTRATOR: &str = "orchestrator";
/// 도구 실행기 모듈명
pub const MODULE_TOOL_RUNNER: &str = "tool-runner";
/// 권고 엔진 모듈명
pub const MODULE_ADVISOR: &str = "advisor";

// --- 이벤트 타입 상수 ---

/// 스캔 상태 변화 이벤트 타입
pub const EVENT_TYPE_SCAN_UPDATE: &str = "scan_update";
/// 도구 출력 이벤트 타입
pub const EVENT_TYPE_TOOL_OUTPUT: &str = "tool_output";
/// 권고 생성 이벤트 타입
pub const EVENT_TYPE_RECOMMENDATIONS: &str = "recommendations";

/// 이벤트 메타데이터 — 모든 이벤트에 공통으로 포함되는 추적 정보
///
/// 각 이벤트의 발생 시각, 생성 모듈, 추적 ID를 담고 있어
/// 이벤트 흐름을 추적하고 디버깅할 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// 이벤트 발생 시각
    pub timestamp: SystemTime,
    /// 이벤트를 생성한 모듈명 (예: "orchestrator")
    pub source_module: String,
    /// 추적 ID — 같은 스캔의 이벤트를 연결합니다
    pub trace_id: String,
}

impl EventMetadata {
    /// 기존 trace_id를 사용하여 새 메타데이터를 생성합니다.
    ///
    /// 스캔 세션 ID를 trace_id로 사용하면 한 스캔의 이벤트가 모두 연결됩니다.
    pub fn new(source_module: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: trace_id.into(),
        }
    }

    /// 새로운 UUID v4 trace_id를 생성하여 메타데이터를 만듭니다.
    pub fn with_new_trace(source_module: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            source_module: source_module.into(),
            trace_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl fmt::Display for EventMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] source={} trace={}",
            unix_timestamp_str(self.timestamp),
            self.source_module,
            self.trace_id,
        )
    }
}

/// 모든 이벤트가 구현해야 하는 기본 trait
///
/// `Send + Sync + 'static` 바운드로 `tokio::mpsc` 채널을 통한
/// 안전한 전송을 보장합니다.
pub trait Event: Send + Sync + 'static {
    /// 이벤트 고유 ID (UUID v4)
    fn event_id(&self) -> &str;

    /// 이벤트 메타데이터 (timestamp, source_module, trace_id)
    fn metadata(&self) -> &EventMetadata;

    /// 이벤트 타입명 (로깅 및 직렬화에 사용)
    fn event_type(&self) -> &str;
}

/// 스캔 세션 상태 변화 이벤트
#[derive(Debug, Clone)]
pub struct ScanUpdateEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 스캔 세션 ID
    pub scan_id: String,
    /// 새 상태
    pub status: ScanStatus,
    /// 상태별 부가 데이터 (실패 사유, 단계 요약 등)
    pub data: Option<Value>,
}

impl ScanUpdateEvent {
    /// 스캔 ID를 trace로 사용하는 상태 변화 이벤트를 생성합니다.
    pub fn new(scan_id: impl Into<String>, status: ScanStatus) -> Self {
        let scan_id = scan_id.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_ORCHESTRATOR, scan_id.clone()),
            scan_id,
            status,
            data: None,
        }
    }

    /// 부가 데이터를 설정한 뒤 자신을 반환합니다.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl Event for ScanUpdateEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_SCAN_UPDATE
    }
}

impl fmt::Display for ScanUpdateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanUpdateEvent[{}] scan={} status={}",
            &self.id[..8.min(self.id.len())],
            &self.scan_id[..8.min(self.scan_id.len())],
            self.status,
        )
    }
}

/// 도구 출력 이벤트
///
/// 한 단계의 실행이 끝날 때 해당 도구의 출력 요약과 함께 발행됩니다.
#[derive(Debug, Clone)]
pub struct ToolOutputEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 스캔 세션 ID
    pub scan_id: String,
    /// 출력을 생성한 도구
    pub tool: ToolKind,
    /// 출력 내용
    pub output: String,
}

impl ToolOutputEvent {
    pub fn new(scan_id: impl Into<String>, tool: ToolKind, output: impl Into<String>) -> Self {
        let scan_id = scan_id.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_TOOL_RUNNER, scan_id.clone()),
            scan_id,
            tool,
            output: output.into(),
        }
    }
}

impl Event for ToolOutputEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_TOOL_OUTPUT
    }
}

impl fmt::Display for ToolOutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ToolOutputEvent[{}] scan={} tool={} bytes={}",
            &self.id[..8.min(self.id.len())],
            &self.scan_id[..8.min(self.scan_id.len())],
            self.tool,
            self.output.len(),
        )
    }
}

/// 권고 생성 이벤트
///
/// 세션이 종료 상태에 도달하여 권고가 도출되었을 때 발행됩니다.
#[derive(Debug, Clone)]
pub struct RecommendationsEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 스캔 세션 ID
    pub scan_id: String,
    /// 도출된 권고 목록
    pub recommendations: Vec<Recommendation>,
}

impl RecommendationsEvent {
    pub fn new(scan_id: impl Into<String>, recommendations: Vec<Recommendation>) -> Self {
        let scan_id = scan_id.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_ADVISOR, scan_id.clone()),
            scan_id,
            recommendations,
        }
    }
}

impl Event for RecommendationsEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_RECOMMENDATIONS
    }
}

impl fmt::Display for RecommendationsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RecommendationsEvent[{}] scan={} count={}",
            &self.id[..8.min(self.id.len())],
            &self.scan_id[..8.min(self.scan_id.len())],
            self.recommendations.len(),
        )
    }
}

/// 허브로 전달되는 이벤트의 합 타입
#[derive(Debug, Clone)]
pub enum ScanEvent {
    ScanUpdate(ScanUpdateEvent),
    ToolOutput(ToolOutputEvent),
    Recommendations(RecommendationsEvent),
}

impl ScanEvent {
    /// 이벤트가 속한 스캔 세션 ID를 반환합니다.
    pub fn scan_id(&self) -> &str {
        match self {
            Self::ScanUpdate(e) => &e.scan_id,
            Self::ToolOutput(e) => &e.scan_id,
            Self::Recommendations(e) => &e.scan_id,
        }
    }

    /// 이벤트 타입명을 반환합니다.
    pub fn event_type(&self) -> &str {
        match self {
            Self::ScanUpdate(e) => e.event_type(),
            Self::ToolOutput(e) => e.event_type(),
            Self::Recommendations(e) => e.event_type(),
        }
    }

    /// 구독자에게 직렬화해 보낼 수 있는 와이어 형식으로 변환합니다.
    pub fn to_wire(&self) -> WireEvent {
        match self {
            Self::ScanUpdate(e) => WireEvent {
                event_type: EVENT_TYPE_SCAN_UPDATE.to_owned(),
                scan_id: e.scan_id.clone(),
                status: Some(e.status),
                tool: None,
                output: None,
                recommendations: None,
                data: e.data.clone(),
            },
            Self::ToolOutput(e) => WireEvent {
                event_type: EVENT_TYPE_TOOL_OUTPUT.to_owned(),
                scan_id: e.scan_id.clone(),
                status: None,
                tool: Some(e.tool),
                output: Some(e.output.clone()),
                recommendations: None,
                data: None,
            },
            Self::Recommendations(e) => WireEvent {
                event_type: EVENT_TYPE_RECOMMENDATIONS.to_owned(),
                scan_id: e.scan_id.clone(),
                status: None,
                tool: None,
                output: None,
                recommendations: Some(e.recommendations.clone()),
                data: None,
            },
        }
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanUpdate(e) => e.fmt(f),
            Self::ToolOutput(e) => e.fmt(f),
            Self::Recommendations(e) => e.fmt(f),
        }
    }
}

/// 구독자 전달용 직렬화 형식
///
/// `{"type": "...", "scan_id": "...", ...}` 형태로 직렬화되며
/// 값이 없는 필드는 생략됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEvent {
    /// 이벤트 타입 ("scan_update", "tool_output", "recommendations")
    #[serde(rename = "type")]
    pub event_type: String,
    /// 스캔 세션 ID
    pub scan_id: String,
    /// 새 상태 (scan_update)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ScanStatus>,
    /// 도구 (tool_output)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolKind>,
    /// 출력 내용 (tool_output)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// 권고 목록 (recommendations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Recommendation>>,
    /// 부가 데이터 (scan_update)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// SystemTime을 사람이 읽을 수 있는 형태로 변환합니다.
fn unix_timestamp_str(time: SystemTime) -> String {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => {
            let secs = duration.as_secs();
            format!("{secs}")
        }
        Err(_) => "unknown".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, RecommendationKind};

    fn sample_recommendation() -> Recommendation {
        Recommendation::new(
            "scan-1",
            RecommendationKind::Mitigation,
            "SSH Security Hardening",
            "Weak SSH credentials were found",
            Priority::High,
            "Enforce key-based authentication",
        )
    }

    #[test]
    fn event_metadata_new_preserves_trace_id() {
        let meta = EventMetadata::new("test-module", "trace-abc-123");
        assert_eq!(meta.source_module, "test-module");
        assert_eq!(meta.trace_id, "trace-abc-123");
        assert!(meta.timestamp <= SystemTime::now());
    }

    #[test]
    fn event_metadata_with_new_trace_generates_uuid() {
        let meta = EventMetadata::with_new_trace("test-module");
        // UUID v4 형식 확인: 8-4-4-4-12
        assert_eq!(meta.trace_id.len(), 36);
        assert_eq!(meta.trace_id.chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn scan_update_event_uses_scan_id_as_trace() {
        let event = ScanUpdateEvent::new("scan-abc", ScanStatus::Running);
        assert_eq!(event.event_type(), "scan_update");
        assert_eq!(event.metadata().trace_id, "scan-abc");
        assert_eq!(event.metadata().source_module, "orchestrator");
        assert!(event.data.is_none());
    }

    #[test]
    fn scan_update_event_with_data() {
        let event = ScanUpdateEvent::new("scan-abc", ScanStatus::Failed)
            .with_data(serde_json::json!({"reason": "critical stage failed"}));
        assert!(event.data.is_some());
    }

    #[test]
    fn tool_output_event_implements_event_trait() {
        let event = ToolOutputEvent::new("scan-abc", ToolKind::Nmap, "22/tcp open ssh");
        assert_eq!(event.event_type(), "tool_output");
        assert!(!event.event_id().is_empty());
        assert_eq!(event.metadata().source_module, "tool-runner");
    }

    #[test]
    fn recommendations_event_display() {
        let event = RecommendationsEvent::new("scan-abcdef01", vec![sample_recommendation()]);
        let display = event.to_string();
        assert!(display.contains("count=1"));
        assert!(display.contains("scan-abc"));
    }

    #[test]
    fn scan_event_scan_id() {
        let event = ScanEvent::ToolOutput(ToolOutputEvent::new("scan-1", ToolKind::Nikto, "out"));
        assert_eq!(event.scan_id(), "scan-1");
        assert_eq!(event.event_type(), "tool_output");
    }

    #[test]
    fn wire_event_scan_update_shape() {
        let event = ScanEvent::ScanUpdate(ScanUpdateEvent::new("scan-1", ScanStatus::Completed));
        let json = serde_json::to_value(event.to_wire()).unwrap();
        assert_eq!(json["type"], "scan_update");
        assert_eq!(json["scan_id"], "scan-1");
        assert_eq!(json["status"], "completed");
        assert!(json.get("tool").is_none());
        assert!(json.get("output").is_none());
    }

    #[test]
    fn wire_event_tool_output_shape() {
        let event = ScanEvent::ToolOutput(ToolOutputEvent::new(
            "scan-1",
            ToolKind::Gobuster,
            "/admin (Status: 200)",
        ));
        let json = serde_json::to_value(event.to_wire()).unwrap();
        assert_eq!(json["type"], "tool_output");
        assert_eq!(json["tool"], "gobuster");
        assert_eq!(json["output"], "/admin (Status: 200)");
        assert!(json.get("status").is_none());
    }

    #[test]
    fn wire_event_recommendations_shape() {
        let event =
            ScanEvent::Recommendations(RecommendationsEvent::new("scan-1", vec![
                sample_recommendation(),
            ]));
        let json = serde_json::to_value(event.to_wire()).unwrap();
        assert_eq!(json["type"], "recommendations");
        assert_eq!(json["recommendations"].as_array().unwrap().len(), 1);
        assert_eq!(
            json["recommendations"][0]["title"],
            "SSH Security Hardening"
        );
    }

    #[test]
    fn events_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<ScanUpdateEvent>();
        assert_send_sync::<ToolOutputEvent>();
        assert_send_sync::<RecommendationsEvent>();
        assert_send_sync::<ScanEvent>();
    }
}
