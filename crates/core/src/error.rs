//! 에러 타입 — 도메인별 에러 정의

/// Pentora 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PentoraError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 요청 검증 실패
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// 도구 실행 에러
    #[error("exec error: {0}")]
    Exec(#[from] ExecError),

    /// 저장소 에러
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 외부 분석 서비스 에러
    #[error("advisory error: {0}")]
    Advisory(#[from] AdvisoryError),

    /// 동시 스캔 한도 초과
    #[error("scan capacity exhausted: {limit} sessions already running")]
    Busy { limit: usize },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 스캔 요청 검증 에러
///
/// 검증 실패 시 세션은 생성되지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// 필수 필드가 비어 있음
    #[error("field '{field}' must not be empty")]
    EmptyField { field: String },

    /// 셸 메타문자 등 허용되지 않는 문자 포함
    #[error("field '{field}' contains forbidden character '{ch}'")]
    ForbiddenCharacter { field: String, ch: char },

    /// 옵션으로 전달된 값이 플래그처럼 보임
    #[error("field '{field}' must not start with '-': {value}")]
    LeadingDash { field: String, value: String },

    /// 알 수 없는 스캔 종류
    #[error("unknown scan kind: {0}")]
    UnknownScanKind(String),
}

/// 도구 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// 프로세스 시작 실패 (도구 미설치 등)
    #[error("failed to launch '{program}': {reason}")]
    Launch { program: String, reason: String },

    /// 실행 중 대기 실패
    #[error("failed to wait for '{program}': {reason}")]
    Wait { program: String, reason: String },

    /// 프로세스 그룹 종료 실패
    #[error("failed to terminate process group {pgid}: {reason}")]
    Terminate { pgid: i32, reason: String },
}

/// 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 대상 레코드를 찾을 수 없음
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// 허용되지 않는 상태 전이 또는 충돌
    #[error("conflict on {entity} {id}: {reason}")]
    Conflict {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// 백엔드 오류
    #[error("store backend error: {0}")]
    Backend(String),
}

/// 외부 분석 서비스 에러
///
/// 권고 도출 경로에서 이 에러는 기록 후 무시되며,
/// 결정적 권고 결과에는 영향을 주지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum AdvisoryError {
    /// 서비스 비활성화 또는 연결 불가
    #[error("advisory service unavailable: {0}")]
    Unavailable(String),

    /// 응답 시간 초과
    #[error("advisory request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// 서비스 내부 오류
    #[error("advisory backend error: {0}")]
    Backend(String),
}
