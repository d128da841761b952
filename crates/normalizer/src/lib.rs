#![doc = include_str!("../README.md")]

use pentora_core::types::{Finding, ToolExecution, ToolKind};

pub mod gobuster;
pub mod hydra;
pub mod nikto;
pub mod nmap;
pub mod sqlmap;
pub mod taxonomy;

/// 정규화 결과
///
/// 정규화는 순수 함수이며 어떤 입력에도 실패하지 않습니다.
/// 파싱 불가능한 부분은 `parse_error` 마커 발견 사항으로 강등됩니다.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// 추출된 발견 사항 (`parse_error` 마커 포함)
    pub findings: Vec<Finding>,
    /// 파싱 실패 마커 수
    pub parse_errors: usize,
    /// 도구별 통계와 정찰 신호
    pub stats: ToolStats,
}

/// 도구별 통계
///
/// `PortScan`의 신호는 종합 스캔의 조건부 단계 진행에 사용됩니다.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolStats {
    /// nmap: 호스트/포트/서비스 요약과 정찰 신호
    PortScan {
        /// 보고서의 호스트 엔트리 수 (up/down 무관)
        hosts: usize,
        /// 열린 포트 수
        open_ports: usize,
        /// 발견된 서비스명 (중복 제거, 발견 순서)
        services: Vec<String>,
        /// HTTP 계열 서비스 존재 여부
        http_present: bool,
    },
    /// nikto: 보고된 이슈 수
    Web { issues: usize },
    /// hydra: 성공/실패 시도 수
    BruteForce { successes: usize, failures: usize },
    /// sqlmap: 확인된 주입 지점 수
    Injection { injection_points: usize },
    /// gobuster: 발견 경로 수와 관심 경로 수
    ContentDiscovery { found: usize, interesting: usize },
}

impl ToolStats {
    /// 무차별 대입 성공률(%)을 반환합니다.
    ///
    /// 시도가 전혀 없으면 0, 항상 `[0, 100]` 범위입니다.
    /// 무차별 대입 통계가 아니면 `None`.
    pub fn success_rate(&self) -> Option<f64> {
        match self {
            Self::BruteForce {
                successes,
                failures,
            } => {
                let total = successes + failures;
                if total == 0 {
                    Some(0.0)
                } else {
                    Some(*successes as f64 / total as f64 * 100.0)
                }
            }
            _ => None,
        }
    }
}

/// 도구 실행 기록의 출력을 해당 정규화기로 라우팅합니다.
pub fn normalize_execution(execution: &ToolExecution) -> Normalized {
    match execution.tool {
        ToolKind::Nmap => nmap::normalize(&execution.scan_id, &execution.id, &execution.stdout),
        ToolKind::Nikto => nikto::normalize(&execution.scan_id, &execution.id, &execution.stdout),
        ToolKind::Hydra => hydra::normalize(
            &execution.scan_id,
            &execution.id,
            &execution.stdout,
            &execution.stderr,
        ),
        ToolKind::Sqlmap => sqlmap::normalize(&execution.scan_id, &execution.id, &execution.stdout),
        ToolKind::Gobuster => {
            gobuster::normalize(&execution.scan_id, &execution.id, &execution.stdout)
        }
    }
}
