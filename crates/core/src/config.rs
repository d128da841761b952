//! 설정 관리 — pentora.toml 파싱 및 런타임 설정
//!
//! [`PentoraConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PENTORA_TOOLS_NMAP_TIMEOUT_SECS=600` 형식)
//! 3. 설정 파일 (`pentora.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pentora_core::error::PentoraError> {
//! use pentora_core::config::PentoraConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = PentoraConfig::load("pentora.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = PentoraConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PentoraError};
use crate::types::ToolKind;

/// Pentora 통합 설정
///
/// `pentora.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 크레이트는 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PentoraConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 도구 설정
    #[serde(default)]
    pub tools: ToolsConfig,
    /// 스캔 오케스트레이션 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 외부 분석 서비스 설정
    #[serde(default)]
    pub advisory: AdvisoryConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl PentoraConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PentoraError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PentoraError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PentoraError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PentoraError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PentoraError> {
        toml::from_str(toml_str).map_err(|e| {
            PentoraError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PENTORA_{SECTION}_{FIELD}`
    /// 예: `PENTORA_SCAN_MAX_CONCURRENT_SCANS=8`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PENTORA_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "PENTORA_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "PENTORA_GENERAL_DATA_DIR");
        override_string(&mut self.general.pid_file, "PENTORA_GENERAL_PID_FILE");

        // Tools
        override_string(&mut self.tools.nmap_path, "PENTORA_TOOLS_NMAP_PATH");
        override_string(&mut self.tools.nikto_path, "PENTORA_TOOLS_NIKTO_PATH");
        override_string(&mut self.tools.hydra_path, "PENTORA_TOOLS_HYDRA_PATH");
        override_string(&mut self.tools.sqlmap_path, "PENTORA_TOOLS_SQLMAP_PATH");
        override_string(&mut self.tools.gobuster_path, "PENTORA_TOOLS_GOBUSTER_PATH");
        override_u64(
            &mut self.tools.nmap_timeout_secs,
            "PENTORA_TOOLS_NMAP_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.tools.nikto_timeout_secs,
            "PENTORA_TOOLS_NIKTO_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.tools.hydra_timeout_secs,
            "PENTORA_TOOLS_HYDRA_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.tools.sqlmap_timeout_secs,
            "PENTORA_TOOLS_SQLMAP_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.tools.gobuster_timeout_secs,
            "PENTORA_TOOLS_GOBUSTER_TIMEOUT_SECS",
        );
        override_string(&mut self.tools.username, "PENTORA_TOOLS_USERNAME");
        override_string(&mut self.tools.password_list, "PENTORA_TOOLS_PASSWORD_LIST");
        override_string(&mut self.tools.dir_wordlist, "PENTORA_TOOLS_DIR_WORDLIST");
        override_u32(&mut self.tools.hydra_threads, "PENTORA_TOOLS_HYDRA_THREADS");
        override_u32(
            &mut self.tools.gobuster_threads,
            "PENTORA_TOOLS_GOBUSTER_THREADS",
        );

        // Scan
        override_usize(
            &mut self.scan.max_concurrent_scans,
            "PENTORA_SCAN_MAX_CONCURRENT_SCANS",
        );
        override_usize(
            &mut self.scan.event_channel_capacity,
            "PENTORA_SCAN_EVENT_CHANNEL_CAPACITY",
        );

        // Advisory
        override_bool(&mut self.advisory.enabled, "PENTORA_ADVISORY_ENABLED");
        override_string(&mut self.advisory.endpoint, "PENTORA_ADVISORY_ENDPOINT");
        override_u64(
            &mut self.advisory.timeout_secs,
            "PENTORA_ADVISORY_TIMEOUT_SECS",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "PENTORA_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "PENTORA_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "PENTORA_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PentoraError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // 타임아웃 검증: 0초 타임아웃은 즉시 실패를 의미하므로 거부
        for tool in ToolKind::all() {
            if self.tools.timeout_secs(tool) == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("tools.{}_timeout_secs", tool),
                    reason: "timeout must be greater than zero".to_owned(),
                }
                .into());
            }
        }

        if self.scan.max_concurrent_scans == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_concurrent_scans".to_owned(),
                reason: "must be greater than zero".to_owned(),
            }
            .into());
        }

        if self.scan.event_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.event_channel_capacity".to_owned(),
                reason: "must be greater than zero".to_owned(),
            }
            .into());
        }

        if self.advisory.enabled && self.advisory.endpoint.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "advisory.endpoint".to_owned(),
                reason: "endpoint must not be empty when advisory is enabled".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리
    pub data_dir: String,
    /// PID 파일 경로
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            data_dir: "/var/lib/pentora".to_owned(),
            pid_file: "/var/run/pentora.pid".to_owned(),
        }
    }
}

/// 도구 설정
///
/// 도구별 실행 파일 경로, 타임아웃, 사전 파일을 지정합니다.
/// 정찰 도구는 짧은 타임아웃, 무차별 대입/인젝션 도구는 긴 타임아웃이
/// 기본값입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// nmap 실행 파일 경로
    pub nmap_path: String,
    /// nikto 실행 파일 경로
    pub nikto_path: String,
    /// hydra 실행 파일 경로
    pub hydra_path: String,
    /// sqlmap 실행 파일 경로
    pub sqlmap_path: String,
    /// gobuster 실행 파일 경로
    pub gobuster_path: String,
    /// nmap 타임아웃 (초)
    pub nmap_timeout_secs: u64,
    /// nikto 타임아웃 (초)
    pub nikto_timeout_secs: u64,
    /// hydra 타임아웃 (초)
    pub hydra_timeout_secs: u64,
    /// sqlmap 타임아웃 (초)
    pub sqlmap_timeout_secs: u64,
    /// gobuster 타임아웃 (초)
    pub gobuster_timeout_secs: u64,
    /// hydra 기본 사용자명
    pub username: String,
    /// hydra 비밀번호 사전 경로
    pub password_list: String,
    /// gobuster 디렉터리 사전 경로
    pub dir_wordlist: String,
    /// hydra 병렬 연결 수
    pub hydra_threads: u32,
    /// gobuster 병렬 스레드 수
    pub gobuster_threads: u32,
}

impl ToolsConfig {
    /// 도구 실행 파일 경로를 반환합니다.
    pub fn path(&self, tool: ToolKind) -> &str {
        match tool {
            ToolKind::Nmap => &self.nmap_path,
            ToolKind::Nikto => &self.nikto_path,
            ToolKind::Hydra => &self.hydra_path,
            ToolKind::Sqlmap => &self.sqlmap_path,
            ToolKind::Gobuster => &self.gobuster_path,
        }
    }

    /// 도구 타임아웃(초)을 반환합니다.
    pub fn timeout_secs(&self, tool: ToolKind) -> u64 {
        match tool {
            ToolKind::Nmap => self.nmap_timeout_secs,
            ToolKind::Nikto => self.nikto_timeout_secs,
            ToolKind::Hydra => self.hydra_timeout_secs,
            ToolKind::Sqlmap => self.sqlmap_timeout_secs,
            ToolKind::Gobuster => self.gobuster_timeout_secs,
        }
    }

    /// 도구 타임아웃을 [`Duration`]으로 반환합니다.
    pub fn timeout(&self, tool: ToolKind) -> Duration {
        Duration::from_secs(self.timeout_secs(tool))
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            nmap_path: "nmap".to_owned(),
            nikto_path: "nikto".to_owned(),
            hydra_path: "hydra".to_owned(),
            sqlmap_path: "sqlmap".to_owned(),
            gobuster_path: "gobuster".to_owned(),
            nmap_timeout_secs: 5 * 60,
            nikto_timeout_secs: 15 * 60,
            hydra_timeout_secs: 30 * 60,
            sqlmap_timeout_secs: 20 * 60,
            gobuster_timeout_secs: 10 * 60,
            username: "admin".to_owned(),
            password_list: "/usr/share/wordlists/rockyou.txt".to_owned(),
            dir_wordlist: "/usr/share/wordlists/dirb/common.txt".to_owned(),
            hydra_threads: 4,
            gobuster_threads: 50,
        }
    }
}

/// 스캔 오케스트레이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 동시 실행 가능한 스캔 세션 수
    pub max_concurrent_scans: usize,
    /// 구독자 이벤트 채널 용량
    pub event_channel_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrent_scans: 4,
            event_channel_capacity: 256,
        }
    }
}

/// 외부 분석 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 서비스 엔드포인트
    pub endpoint: String,
    /// 응답 대기 시간 (초)
    pub timeout_secs: u64,
}

impl AdvisoryConfig {
    /// 응답 대기 시간을 [`Duration`]으로 반환합니다.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            timeout_secs: 30,
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// Prometheus exporter 바인드 주소
    pub listen_addr: String,
    /// Prometheus exporter 포트
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9499,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
