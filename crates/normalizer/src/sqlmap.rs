//! sqlmap 출력 정규화기
//!
//! `Parameter:` / `Type:` / `Title:` / `Payload:` 태그 섹션을 주입
//! 지점 단위로 묶어 발견 사항을 생성합니다. union 계열은 Critical,
//! 그 외 확인된 주입은 High입니다.

use pentora_core::types::{Finding, FindingCategory, Severity, ToolKind};

use crate::{Normalized, ToolStats};

#[derive(Debug, Default)]
struct InjectionPoint {
    parameter: String,
    technique: String,
    title: String,
    payload: String,
}

impl InjectionPoint {
    fn severity(&self) -> Severity {
        let text = format!("{} {}", self.technique, self.title).to_lowercase();
        if text.contains("union") {
            Severity::Critical
        } else {
            // blind/error/time 기반 등 확인된 주입은 모두 High
            Severity::High
        }
    }

    fn into_finding(self, scan_id: &str, execution_id: &str) -> Finding {
        let severity = self.severity();
        let mut finding = Finding::new(
            scan_id,
            execution_id,
            ToolKind::Sqlmap,
            FindingCategory::Injection,
            severity,
            format!(
                "SQL injection confirmed in parameter '{}' ({})",
                self.parameter,
                if self.technique.is_empty() {
                    "unknown technique"
                } else {
                    &self.technique
                }
            ),
        )
        .with_evidence("parameter", &self.parameter);
        if !self.technique.is_empty() {
            finding = finding.with_evidence("type", &self.technique);
        }
        if !self.title.is_empty() {
            finding = finding.with_evidence("title", &self.title);
        }
        if !self.payload.is_empty() {
            finding = finding.with_evidence("payload", &self.payload);
        }
        finding
    }
}

/// sqlmap 출력을 정규화합니다.
pub fn normalize(scan_id: &str, execution_id: &str, stdout: &str) -> Normalized {
    let mut findings = Vec::new();
    let mut current: Option<InjectionPoint> = None;

    for line in stdout.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("Parameter:") {
            if let Some(point) = current.take() {
                findings.push(point.into_finding(scan_id, execution_id));
            }
            current = Some(InjectionPoint {
                parameter: rest.trim().to_owned(),
                ..InjectionPoint::default()
            });
        } else if let Some(rest) = trimmed.strip_prefix("Type:") {
            if let Some(point) = current.as_mut() {
                point.technique = rest.trim().to_owned();
            }
        } else if let Some(rest) = trimmed.strip_prefix("Title:") {
            if let Some(point) = current.as_mut() {
                point.title = rest.trim().to_owned();
            }
        } else if let Some(rest) = trimmed.strip_prefix("Payload:") {
            if let Some(point) = current.as_mut() {
                point.payload = rest.trim().to_owned();
            }
        }
    }
    if let Some(point) = current.take() {
        findings.push(point.into_finding(scan_id, execution_id));
    }

    let injection_points = findings.len();
    Normalized {
        findings,
        parse_errors: 0,
        stats: ToolStats::Injection { injection_points },
    }
}
