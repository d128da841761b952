//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pentora_`
//! - 영역: `scans_`, `stages_`, `findings_`, `events_`, `daemon_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(pentora_core::metrics::SCANS_STARTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 도구 레이블 키 (nmap, nikto, hydra, sqlmap, gobuster)
pub const LABEL_TOOL: &str = "tool";

/// 심각도 레이블 키 (info, low, medium, high, critical)
pub const LABEL_SEVERITY: &str = "severity";

/// 스캔 종류 레이블 키 (nmap, ..., comprehensive)
pub const LABEL_SCAN_KIND: &str = "scan_kind";

/// 상태 레이블 키 (completed, failed, cancelled)
pub const LABEL_STATUS: &str = "status";

/// 결과 레이블 키 (success, failure, timeout, cancelled)
pub const LABEL_RESULT: &str = "result";

// ─── Scan 메트릭 ────────────────────────────────────────────────────

/// Scan: 시작된 스캔 세션 수 (counter, label: scan_kind)
pub const SCANS_STARTED_TOTAL: &str = "pentora_scans_started_total";

/// Scan: 완료된 스캔 세션 수 (counter, label: scan_kind)
pub const SCANS_COMPLETED_TOTAL: &str = "pentora_scans_completed_total";

/// Scan: 실패한 스캔 세션 수 (counter, label: scan_kind)
pub const SCANS_FAILED_TOTAL: &str = "pentora_scans_failed_total";

/// Scan: 취소된 스캔 세션 수 (counter, label: scan_kind)
pub const SCANS_CANCELLED_TOTAL: &str = "pentora_scans_cancelled_total";

/// Scan: 현재 실행 중인 스캔 세션 수 (gauge)
pub const SCANS_RUNNING: &str = "pentora_scans_running";

// ─── Stage / Tool 메트릭 ────────────────────────────────────────────

/// Stage: 실행된 단계 수 (counter, labels: tool, result)
pub const STAGES_EXECUTED_TOTAL: &str = "pentora_stages_executed_total";

/// Stage: 전제 조건 미충족으로 건너뛴 단계 수 (counter, label: tool)
pub const STAGES_SKIPPED_TOTAL: &str = "pentora_stages_skipped_total";

/// Tool: 도구 실행 소요 시간 (histogram, 초, label: tool)
pub const TOOL_EXEC_DURATION_SECONDS: &str = "pentora_tool_exec_duration_seconds";

// ─── Finding / Recommendation 메트릭 ────────────────────────────────

/// Finding: 정규화된 발견 사항 수 (counter, labels: tool, severity)
pub const FINDINGS_TOTAL: &str = "pentora_findings_total";

/// Finding: 파싱 실패 마커 수 (counter, label: tool)
pub const PARSE_ERRORS_TOTAL: &str = "pentora_parse_errors_total";

/// Recommendation: 도출된 권고 수 (counter)
pub const RECOMMENDATIONS_TOTAL: &str = "pentora_recommendations_total";

// ─── Hub 메트릭 ─────────────────────────────────────────────────────

/// Hub: 구독자에게 전달된 이벤트 수 (counter)
pub const EVENTS_BROADCAST_TOTAL: &str = "pentora_events_broadcast_total";

/// Hub: 전달 실패로 제거된 구독자 수 (counter)
pub const SUBSCRIBERS_EVICTED_TOTAL: &str = "pentora_subscribers_evicted_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "pentora_daemon_uptime_seconds";

/// Daemon: 빌드 정보 (gauge, 항상 1, labels: version, rust_version)
pub const DAEMON_BUILD_INFO: &str = "pentora_daemon_build_info";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 도구 실행 소요 시간 히스토그램 버킷 (초)
///
/// 1s ~ 30m 범위 (외부 도구는 수 분 단위로 동작)
pub const TOOL_EXEC_DURATION_BUCKETS: [f64; 9] =
    [1.0, 5.0, 15.0, 60.0, 180.0, 300.0, 600.0, 1200.0, 1800.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// `metrics::describe_counter!()`, `describe_gauge!()`, `describe_histogram!()`을
/// 호출하여 Prometheus HELP 텍스트를 설정합니다.
///
/// 이 함수는 전역 레코더 설치 후 한 번만 호출해야 합니다.
/// 일반적으로 `pentora-daemon`의 시작 시점에서 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Scan
    describe_counter!(SCANS_STARTED_TOTAL, "Total number of scan sessions started");
    describe_counter!(
        SCANS_COMPLETED_TOTAL,
        "Total number of scan sessions that reached completed state"
    );
    describe_counter!(
        SCANS_FAILED_TOTAL,
        "Total number of scan sessions that reached failed state"
    );
    describe_counter!(
        SCANS_CANCELLED_TOTAL,
        "Total number of scan sessions cancelled by request"
    );
    describe_gauge!(SCANS_RUNNING, "Number of scan sessions currently running");

    // Stage / Tool
    describe_counter!(
        STAGES_EXECUTED_TOTAL,
        "Total number of pipeline stages executed, by tool and result"
    );
    describe_counter!(
        STAGES_SKIPPED_TOTAL,
        "Total number of pipeline stages skipped due to unmet preconditions"
    );
    describe_histogram!(
        TOOL_EXEC_DURATION_SECONDS,
        "Wall-clock duration of external tool executions in seconds"
    );

    // Finding / Recommendation
    describe_counter!(
        FINDINGS_TOTAL,
        "Total number of normalized findings, by tool and severity"
    );
    describe_counter!(
        PARSE_ERRORS_TOTAL,
        "Total number of parse-error marker findings emitted by normalizers"
    );
    describe_counter!(
        RECOMMENDATIONS_TOTAL,
        "Total number of recommendations derived"
    );

    // Hub
    describe_counter!(
        EVENTS_BROADCAST_TOTAL,
        "Total number of events delivered to hub subscribers"
    );
    describe_counter!(
        SUBSCRIBERS_EVICTED_TOTAL,
        "Total number of hub subscribers evicted after delivery failure"
    );

    // Daemon
    describe_gauge!(DAEMON_UPTIME_SECONDS, "Pentora daemon uptime in seconds");
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version labels)"
    );
}
