//! nikto 텍스트 출력 정규화기
//!
//! `+ `로 시작하는 보고 라인마다 발견 사항 하나를 생성합니다.
//! 심각도와 카테고리는 [`crate::taxonomy`]의 고정 키워드 테이블로
//! 판정하며, CVE ID가 포함된 라인은 `cve` 필드에 추출됩니다.

use pentora_core::types::{Finding, ToolKind};

use crate::taxonomy::{category_for, extract_cve, severity_for};
use crate::{Normalized, ToolStats};

/// 발견 사항이 아닌 보고 메타데이터 라인 접두어
const METADATA_PREFIXES: &[&str] = &[
    "Target IP",
    "Target Hostname",
    "Target Port",
    "Start Time",
    "End Time",
    "No web server found",
    "0 host(s) tested",
    "1 host(s) tested",
];

/// nikto 출력을 정규화합니다.
pub fn normalize(scan_id: &str, execution_id: &str, stdout: &str) -> Normalized {
    let mut findings = Vec::new();

    for line in stdout.lines() {
        let trimmed = line.trim();
        let Some(body) = trimmed.strip_prefix("+ ") else {
            continue;
        };
        let body = body.trim();
        if body.is_empty() || METADATA_PREFIXES.iter().any(|p| body.starts_with(p)) {
            continue;
        }

        let mut finding = Finding::new(
            scan_id,
            execution_id,
            ToolKind::Nikto,
            category_for(body),
            severity_for(body),
            body,
        )
        .with_evidence("line", trimmed);
        if let Some(cve) = extract_cve(body) {
            finding = finding.with_cve(cve);
        }
        findings.push(finding);
    }

    let issues = findings.len();
    Normalized {
        findings,
        parse_errors: 0,
        stats: ToolStats::Web { issues },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pentora_core::types::{FindingCategory, Severity};

    #[test]
    fn plus_lines_become_findings() {
        let output = "\
- Nikto v2.5.0
+ Target IP: 10.0.0.5
+ Server: Apache/2.4.52 (Ubuntu)
+ The anti-clickjacking X-Frame-Options header is not present.
+ /login.php: Admin login page found. Cookie without HttpOnly flag set.
+ End Time: 2024-01-01 00:10:00
";
        let result = normalize("scan-1", "exec-1", output);
        assert_eq!(result.findings.len(), 3);
        match result.stats {
            ToolStats::Web { issues } => assert_eq!(issues, 3),
            other => panic!("unexpected stats: {other:?}"),
        }
    }

    #[test]
    fn metadata_lines_are_skipped() {
        let output = "+ Target IP: 10.0.0.5\n+ Start Time: now\n+ End Time: later\n";
        let result = normalize("scan-1", "exec-1", output);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn interesting_admin_line_with_cve_is_normalized() {
        let output = "+ /admin/: This might be interesting. Potentially vulnerable (CVE-2020-1234)";
        let result = normalize("scan-1", "exec-1", output);
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.cve.as_deref(), Some("CVE-2020-1234"));
        assert_eq!(finding.tool, ToolKind::Nikto);
        assert!(!finding.parse_error);
        assert!(finding.description.contains("/admin/"));
    }

    #[test]
    fn severity_follows_keyword_tables() {
        let output = "\
+ /search.php: Possible SQL injection in parameter q.
+ /old/: Directory listing enabled.
+ Server banner reveals version information.
";
        let result = normalize("scan-1", "exec-1", output);
        assert_eq!(result.findings[0].severity, Severity::High);
        assert_eq!(result.findings[0].category, FindingCategory::Injection);
        assert_eq!(result.findings[1].severity, Severity::Medium);
        assert_eq!(result.findings[1].category, FindingCategory::PathTraversal);
        assert_eq!(result.findings[2].severity, Severity::Low);
        assert_eq!(
            result.findings[2].category,
            FindingCategory::InformationDisclosure
        );
    }

    #[test]
    fn garbage_input_yields_no_findings_and_no_panic() {
        let result = normalize("scan-1", "exec-1", "\u{0000}\u{FFFD} random bytes\nnot a report");
        assert!(result.findings.is_empty());
        assert_eq!(result.parse_errors, 0);
    }
}
