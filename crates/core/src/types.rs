//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 스캔 세션, 도구 실행, 발견 사항, 권고 등 모든 크레이트가 공유하는
//! 데이터 구조를 정의합니다.

use std::fmt;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// 스캔 세션 상태
///
/// `Pending -> Running -> {Completed, Failed, Cancelled}` 순서로만 전이하며,
/// 종료 상태에 도달한 세션은 더 이상 변경되지 않습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// 생성됨, 아직 실행 전
    #[default]
    Pending,
    /// 단계 실행 중
    Running,
    /// 정상 종료
    Completed,
    /// 실패로 종료
    Failed,
    /// 요청에 의해 취소됨
    Cancelled,
}

impl ScanStatus {
    /// 종료 상태 여부를 반환합니다.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// `next`로의 전이가 허용되는지 확인합니다.
    ///
    /// 전이는 단조롭습니다: 종료 상태에서는 어떤 전이도 허용되지 않고,
    /// `Pending`은 `Running` 또는 종료 상태로만 이동합니다.
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::Running | Self::Completed | Self::Failed | Self::Cancelled
            ),
            Self::Running => matches!(next, Self::Completed | Self::Failed | Self::Cancelled),
            Self::Completed | Self::Failed | Self::Cancelled => false,
        }
    }

    /// 직렬화와 동일한 snake_case 표기를 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 지원하는 보안 도구
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// 포트/서비스 스캐너
    Nmap,
    /// 웹 서버 취약점 스캐너
    Nikto,
    /// 자격 증명 무차별 대입
    Hydra,
    /// SQL 인젝션 탐지
    Sqlmap,
    /// 디렉터리/파일 열거
    Gobuster,
}

impl ToolKind {
    /// 도구명 소문자 표기를 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nmap => "nmap",
            Self::Nikto => "nikto",
            Self::Hydra => "hydra",
            Self::Sqlmap => "sqlmap",
            Self::Gobuster => "gobuster",
        }
    }

    /// 모든 도구 종류를 반환합니다.
    pub fn all() -> [ToolKind; 5] {
        [
            Self::Nmap,
            Self::Nikto,
            Self::Hydra,
            Self::Sqlmap,
            Self::Gobuster,
        ]
    }

    /// 문자열에서 도구 종류를 파싱합니다. 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nmap" => Some(Self::Nmap),
            "nikto" => Some(Self::Nikto),
            "hydra" => Some(Self::Hydra),
            "sqlmap" => Some(Self::Sqlmap),
            "gobuster" => Some(Self::Gobuster),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Info < Low < Medium < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// 정보성 이벤트
    #[default]
    Info,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 — 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" | "informational" => Some(Self::Info),
            "low" => Some(Self::Low),
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            _ => None,
        }
    }

    /// 메트릭 레이블 등에 쓰는 소문자 표기를 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "Info"),
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// 발견 사항 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// 열린 포트에서 노출된 서비스
    ServiceExposure,
    /// SQL 등 인젝션 계열
    Injection,
    /// 크로스 사이트 스크립팅
    CrossSiteScripting,
    /// 경로 탐색
    PathTraversal,
    /// 인증/세션 관련 취약점
    Authentication,
    /// 전송 계층 보안 (SSL/TLS)
    TransportSecurity,
    /// 정보 노출 (배너, 버전 등)
    InformationDisclosure,
    /// 취약한 자격 증명
    WeakCredential,
    /// 관심 경로 (관리자 페이지, 백업 파일 등)
    InterestingPath,
    /// 기타
    Other,
}

impl FindingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceExposure => "service_exposure",
            Self::Injection => "injection",
            Self::CrossSiteScripting => "cross_site_scripting",
            Self::PathTraversal => "path_traversal",
            Self::Authentication => "authentication",
            Self::TransportSecurity => "transport_security",
            Self::InformationDisclosure => "information_disclosure",
            Self::WeakCredential => "weak_credential",
            Self::InterestingPath => "interesting_path",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 권고 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// 확인된 취약점에 대한 권고
    Vulnerability,
    /// 후속 점검 단계 제안
    NextStep,
    /// 완화 조치
    Mitigation,
    /// 정보성 안내
    Information,
    /// 외부 분석 서비스가 제안한 항목
    AiRecommendation,
}

impl RecommendationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vulnerability => "vulnerability",
            Self::NextStep => "next_step",
            Self::Mitigation => "mitigation",
            Self::Information => "information",
            Self::AiRecommendation => "ai_recommendation",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 권고 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// 심각도를 권고 우선순위로 변환합니다.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Info | Severity::Low => Self::Low,
            Severity::Medium => Self::Medium,
            Severity::High => Self::High,
            Severity::Critical => Self::Critical,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// 스캔 세션
///
/// 하나의 대상에 대한 평가 단위입니다. 상태 전이는 [`ScanStatus`]의
/// 규칙을 따르며, 타임스탬프는 전이 시점에 기록됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSession {
    /// 세션 고유 ID (UUID v4)
    pub id: String,
    /// 사람이 읽을 수 있는 세션 이름
    pub name: String,
    /// 스캔 대상 (호스트명, IP 또는 URL)
    pub target: String,
    /// 스캔 종류 (예: "nmap", "comprehensive")
    pub scan_kind: String,
    /// 현재 상태
    pub status: ScanStatus,
    /// 생성 시각
    pub created_at: SystemTime,
    /// 실행 시작 시각
    pub started_at: Option<SystemTime>,
    /// 종료 시각
    pub completed_at: Option<SystemTime>,
}

impl ScanSession {
    /// `Pending` 상태의 새 세션을 생성합니다.
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
        scan_kind: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            target: target.into(),
            scan_kind: scan_kind.into(),
            status: ScanStatus::Pending,
            created_at: SystemTime::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

impl fmt::Display for ScanSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} target={} kind={}",
            self.status,
            &self.id[..8.min(self.id.len())],
            self.target,
            self.scan_kind,
        )
    }
}

/// 도구 실행 기록
///
/// 파이프라인의 한 단계가 실제로 시도될 때마다 정확히 하나 생성됩니다.
/// 전제 조건 미충족으로 건너뛴 단계는 기록을 남기지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecution {
    /// 실행 고유 ID (UUID v4)
    pub id: String,
    /// 소속 스캔 세션 ID
    pub scan_id: String,
    /// 실행한 도구
    pub tool: ToolKind,
    /// 실행한 명령줄 (프로그램 + 인자, 공백 결합)
    pub command: String,
    /// 표준 출력 (부분 출력 포함)
    pub stdout: String,
    /// 표준 에러 (부분 출력 포함)
    pub stderr: String,
    /// 실행 상태
    pub status: ScanStatus,
    /// 생성 시각
    pub created_at: SystemTime,
    /// 종료 시각
    pub completed_at: Option<SystemTime>,
}

impl ToolExecution {
    /// `Pending` 상태의 새 실행 기록을 생성합니다.
    pub fn new(scan_id: impl Into<String>, tool: ToolKind, command: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scan_id: scan_id.into(),
            tool,
            command: command.into(),
            stdout: String::new(),
            stderr: String::new(),
            status: ScanStatus::Pending,
            created_at: SystemTime::now(),
            completed_at: None,
        }
    }
}

impl fmt::Display for ToolExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} scan={}",
            self.status,
            self.tool,
            &self.scan_id[..8.min(self.scan_id.len())],
        )
    }
}

/// 정규화된 발견 사항
///
/// 도구 원시 출력에서 추출된 보안 관련 관찰 결과입니다.
/// 파싱 불가능한 출력은 `parse_error`가 표시된 마커 발견 사항이 됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// 발견 사항 고유 ID (UUID v4)
    pub id: String,
    /// 소속 스캔 세션 ID
    pub scan_id: String,
    /// 원천 도구 실행 ID
    pub execution_id: String,
    /// 원천 도구
    pub tool: ToolKind,
    /// 분류
    pub category: FindingCategory,
    /// 심각도
    pub severity: Severity,
    /// 설명
    pub description: String,
    /// 구조화된 증거 (key-value 쌍)
    pub evidence: Vec<(String, String)>,
    /// 연관 CVE ID (있을 경우)
    pub cve: Option<String>,
    /// 파싱 실패 마커 여부
    pub parse_error: bool,
}

impl Finding {
    /// 새 발견 사항을 생성합니다.
    pub fn new(
        scan_id: impl Into<String>,
        execution_id: impl Into<String>,
        tool: ToolKind,
        category: FindingCategory,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scan_id: scan_id.into(),
            execution_id: execution_id.into(),
            tool,
            category,
            severity,
            description: description.into(),
            evidence: Vec::new(),
            cve: None,
            parse_error: false,
        }
    }

    /// 증거 쌍을 추가한 뒤 자신을 반환합니다.
    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.evidence.push((key.into(), value.into()));
        self
    }

    /// CVE ID를 설정한 뒤 자신을 반환합니다.
    pub fn with_cve(mut self, cve: impl Into<String>) -> Self {
        self.cve = Some(cve.into());
        self
    }

    /// 파싱 실패 마커로 표시한 뒤 자신을 반환합니다.
    pub fn as_parse_error(mut self) -> Self {
        self.parse_error = true;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}): {}",
            self.severity, self.tool, self.category, self.description,
        )
    }
}

/// 권고 사항
///
/// 생성 이후 불변입니다. `finding_ids`는 이 권고의 근거가 된
/// 발견 사항들을 가리킵니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// 권고 고유 ID (UUID v4)
    pub id: String,
    /// 소속 스캔 세션 ID
    pub scan_id: String,
    /// 권고 종류
    pub kind: RecommendationKind,
    /// 제목
    pub title: String,
    /// 상세 설명
    pub description: String,
    /// 우선순위
    pub priority: Priority,
    /// 권장 조치
    pub action: String,
    /// 근거가 된 발견 사항 ID 목록
    pub finding_ids: Vec<String>,
}

impl Recommendation {
    pub fn new(
        scan_id: impl Into<String>,
        kind: RecommendationKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        action: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            scan_id: scan_id.into(),
            kind,
            title: title.into(),
            description: description.into(),
            priority,
            action: action.into(),
            finding_ids: Vec::new(),
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.priority, self.title, self.kind)
    }
}

/// 실행할 명령 명세
///
/// 항상 argv 배열로 구성되며 셸을 거치지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// 대상 도구
    pub tool: ToolKind,
    /// 실행 파일 경로 또는 이름
    pub program: String,
    /// 인자 목록
    pub args: Vec<String>,
}

impl CommandSpec {
    /// 로깅/기록용 명령줄 문자열을 반환합니다.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_line())
    }
}

/// 도구 실행의 원시 결과
///
/// 예외가 아닌 태그된 값으로 결과를 전달합니다. 타임아웃이나 취소로
/// 중단된 경우에도 그때까지 수집된 부분 출력을 담습니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResult {
    /// 표준 출력
    pub stdout: String,
    /// 표준 에러
    pub stderr: String,
    /// 종료 코드 (시그널로 종료되면 None)
    pub exit_code: Option<i32>,
    /// 타임아웃으로 중단되었는지 여부
    pub timed_out: bool,
    /// 취소로 중단되었는지 여부
    pub cancelled: bool,
    /// 실행 소요 시간
    pub duration: Duration,
}

impl RawResult {
    /// 정상 종료(exit 0, 중단 없음) 여부를 반환합니다.
    pub fn is_success(&self) -> bool {
        !self.timed_out && !self.cancelled && self.exit_code == Some(0)
    }
}

/// 외부 분석 서비스에 전달하는 스캔 요약
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanContext {
    /// 스캔 세션 ID
    pub scan_id: String,
    /// 스캔 대상
    pub target: String,
    /// 스캔 종류
    pub scan_kind: String,
    /// 지금까지의 발견 사항
    pub findings: Vec<Finding>,
}

/// 외부 분석 서비스의 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryResult {
    /// 전체 위험 요약
    pub risk_summary: String,
    /// 탐지된 취약점 설명 목록
    pub vulnerabilities: Vec<String>,
    /// 권고 목록
    pub recommendations: Vec<String>,
    /// 후속 단계 제안 목록
    pub next_steps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_status_terminal() {
        assert!(!ScanStatus::Pending.is_terminal());
        assert!(!ScanStatus::Running.is_terminal());
        assert!(ScanStatus::Completed.is_terminal());
        assert!(ScanStatus::Failed.is_terminal());
        assert!(ScanStatus::Cancelled.is_terminal());
    }

    #[test]
    fn scan_status_transitions_monotonic() {
        assert!(ScanStatus::Pending.can_transition_to(ScanStatus::Running));
        assert!(ScanStatus::Running.can_transition_to(ScanStatus::Completed));
        assert!(ScanStatus::Running.can_transition_to(ScanStatus::Cancelled));
        assert!(!ScanStatus::Completed.can_transition_to(ScanStatus::Running));
        assert!(!ScanStatus::Cancelled.can_transition_to(ScanStatus::Completed));
        assert!(!ScanStatus::Failed.can_transition_to(ScanStatus::Pending));
        assert!(!ScanStatus::Running.can_transition_to(ScanStatus::Pending));
    }

    #[test]
    fn scan_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ScanStatus::Running).unwrap(),
            "\"running\""
        );
        assert_eq!(
            serde_json::to_string(&ScanStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn tool_kind_roundtrip() {
        for tool in ToolKind::all() {
            assert_eq!(ToolKind::from_str_loose(tool.as_str()), Some(tool));
        }
        assert_eq!(ToolKind::from_str_loose("NMAP"), Some(ToolKind::Nmap));
        assert_eq!(ToolKind::from_str_loose("dirb"), None);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_from_str_loose() {
        assert_eq!(Severity::from_str_loose("info"), Some(Severity::Info));
        assert_eq!(
            Severity::from_str_loose("CRITICAL"),
            Some(Severity::Critical)
        );
        assert_eq!(Severity::from_str_loose("Med"), Some(Severity::Medium));
        assert_eq!(Severity::from_str_loose("unknown"), None);
    }

    #[test]
    fn priority_from_severity() {
        assert_eq!(Priority::from_severity(Severity::Info), Priority::Low);
        assert_eq!(Priority::from_severity(Severity::Low), Priority::Low);
        assert_eq!(Priority::from_severity(Severity::Medium), Priority::Medium);
        assert_eq!(Priority::from_severity(Severity::High), Priority::High);
        assert_eq!(
            Priority::from_severity(Severity::Critical),
            Priority::Critical
        );
    }

    #[test]
    fn scan_session_starts_pending() {
        let session = ScanSession::new("weekly", "10.0.0.5", "comprehensive");
        assert_eq!(session.status, ScanStatus::Pending);
        assert_eq!(session.target, "10.0.0.5");
        assert!(session.started_at.is_none());
        assert!(session.completed_at.is_none());
        assert_eq!(session.id.len(), 36);
    }

    #[test]
    fn scan_session_display() {
        let session = ScanSession::new("weekly", "10.0.0.5", "nmap");
        let display = session.to_string();
        assert!(display.contains("pending"));
        assert!(display.contains("10.0.0.5"));
        assert!(display.contains("nmap"));
    }

    #[test]
    fn tool_execution_starts_pending() {
        let exec = ToolExecution::new("scan-1", ToolKind::Nikto, "nikto -h example.com");
        assert_eq!(exec.status, ScanStatus::Pending);
        assert_eq!(exec.tool, ToolKind::Nikto);
        assert!(exec.stdout.is_empty());
        assert!(exec.completed_at.is_none());
    }

    #[test]
    fn finding_builders() {
        let finding = Finding::new(
            "scan-1",
            "exec-1",
            ToolKind::Nikto,
            FindingCategory::PathTraversal,
            Severity::High,
            "Directory traversal possible",
        )
        .with_evidence("path", "/etc/passwd")
        .with_cve("CVE-2020-1234");
        assert_eq!(finding.evidence.len(), 1);
        assert_eq!(finding.cve.as_deref(), Some("CVE-2020-1234"));
        assert!(!finding.parse_error);
        assert!(finding.as_parse_error().parse_error);
    }

    #[test]
    fn finding_display() {
        let finding = Finding::new(
            "scan-1",
            "exec-1",
            ToolKind::Hydra,
            FindingCategory::WeakCredential,
            Severity::Critical,
            "Valid credentials found",
        );
        let display = finding.to_string();
        assert!(display.contains("Critical"));
        assert!(display.contains("hydra"));
        assert!(display.contains("weak_credential"));
    }

    #[test]
    fn command_spec_display_line() {
        let spec = CommandSpec {
            tool: ToolKind::Nmap,
            program: "nmap".to_owned(),
            args: vec!["-sV".to_owned(), "10.0.0.1".to_owned()],
        };
        assert_eq!(spec.display_line(), "nmap -sV 10.0.0.1");
    }

    #[test]
    fn raw_result_success() {
        let ok = RawResult {
            exit_code: Some(0),
            ..RawResult::default()
        };
        assert!(ok.is_success());

        let timed_out = RawResult {
            exit_code: Some(0),
            timed_out: true,
            ..RawResult::default()
        };
        assert!(!timed_out.is_success());

        let killed = RawResult {
            exit_code: None,
            ..RawResult::default()
        };
        assert!(!killed.is_success());
    }

    #[test]
    fn recommendation_serialize_roundtrip() {
        let rec = Recommendation::new(
            "scan-1",
            RecommendationKind::Vulnerability,
            "SQL Injection Detected",
            "Confirmed injectable parameter",
            Priority::Critical,
            "Use parameterized queries",
        );
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.title, rec.title);
        assert_eq!(parsed.kind, RecommendationKind::Vulnerability);
        assert_eq!(parsed.priority, Priority::Critical);
    }
}
