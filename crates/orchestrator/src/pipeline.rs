//! 스캔 파이프라인 정의
//!
//! 스캔 종류를 선언적 단계 목록으로 변환합니다. 단계 실행 로직은
//! [`crate::orchestrator`]에 있고, 여기는 "무엇을 어떤 순서로" 만 담습니다.

use pentora_core::error::ValidationError;
use pentora_core::types::ToolKind;

/// 지원하는 스캔 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    Nmap,
    Nikto,
    Hydra,
    Sqlmap,
    Gobuster,
    /// nmap 정찰 후 결과에 따라 웹 단계를 조건부 실행
    Comprehensive,
}

impl ScanKind {
    /// 요청 문자열을 파싱합니다. 알 수 없는 값은 검증 에러입니다.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_lowercase().as_str() {
            "nmap" => Ok(Self::Nmap),
            "nikto" => Ok(Self::Nikto),
            "hydra" => Ok(Self::Hydra),
            "sqlmap" => Ok(Self::Sqlmap),
            "gobuster" => Ok(Self::Gobuster),
            "comprehensive" => Ok(Self::Comprehensive),
            other => Err(ValidationError::UnknownScanKind(other.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nmap => "nmap",
            Self::Nikto => "nikto",
            Self::Hydra => "hydra",
            Self::Sqlmap => "sqlmap",
            Self::Gobuster => "gobuster",
            Self::Comprehensive => "comprehensive",
        }
    }
}

/// 단계 실행 전제 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePrecondition {
    /// 항상 실행
    Always,
    /// 선행 정찰에서 HTTP 계열 서비스가 발견된 경우에만 실행
    HttpServiceDiscovered,
}

/// 파이프라인 단계 정의
#[derive(Debug, Clone, Copy)]
pub struct StageDef {
    pub tool: ToolKind,
    pub precondition: StagePrecondition,
    /// 실패 시 세션 전체를 실패 처리하는 단계
    pub critical: bool,
}

impl StageDef {
    const fn critical(tool: ToolKind) -> Self {
        Self {
            tool,
            precondition: StagePrecondition::Always,
            critical: true,
        }
    }

    const fn if_http(tool: ToolKind) -> Self {
        Self {
            tool,
            precondition: StagePrecondition::HttpServiceDiscovered,
            critical: false,
        }
    }
}

/// 스캔 종류에 해당하는 단계 목록을 반환합니다.
pub fn stages_for(kind: ScanKind) -> Vec<StageDef> {
    match kind {
        ScanKind::Nmap => vec![StageDef::critical(ToolKind::Nmap)],
        ScanKind::Nikto => vec![StageDef::critical(ToolKind::Nikto)],
        ScanKind::Hydra => vec![StageDef::critical(ToolKind::Hydra)],
        ScanKind::Sqlmap => vec![StageDef::critical(ToolKind::Sqlmap)],
        ScanKind::Gobuster => vec![StageDef::critical(ToolKind::Gobuster)],
        ScanKind::Comprehensive => vec![
            StageDef::critical(ToolKind::Nmap),
            StageDef::if_http(ToolKind::Nikto),
            StageDef::if_http(ToolKind::Gobuster),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_kinds() {
        assert_eq!(ScanKind::parse("nmap").unwrap(), ScanKind::Nmap);
        assert_eq!(
            ScanKind::parse(" Comprehensive ").unwrap(),
            ScanKind::Comprehensive
        );
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let err = ScanKind::parse("metasploit").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownScanKind(_)));
    }

    #[test]
    fn single_tool_kinds_have_one_critical_stage() {
        for kind in [
            ScanKind::Nmap,
            ScanKind::Nikto,
            ScanKind::Hydra,
            ScanKind::Sqlmap,
            ScanKind::Gobuster,
        ] {
            let stages = stages_for(kind);
            assert_eq!(stages.len(), 1);
            assert!(stages[0].critical);
            assert_eq!(stages[0].precondition, StagePrecondition::Always);
        }
    }

    #[test]
    fn comprehensive_pipeline_shape() {
        let stages = stages_for(ScanKind::Comprehensive);
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].tool, ToolKind::Nmap);
        assert!(stages[0].critical);
        assert_eq!(stages[1].tool, ToolKind::Nikto);
        assert_eq!(stages[1].precondition, StagePrecondition::HttpServiceDiscovered);
        assert!(!stages[1].critical);
        assert_eq!(stages[2].tool, ToolKind::Gobuster);
        assert_eq!(stages[2].precondition, StagePrecondition::HttpServiceDiscovered);
    }
}
