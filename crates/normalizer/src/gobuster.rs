//! gobuster 출력 정규화기
//!
//! `path (Status: N) [Size: M]` 라인을 파싱합니다. 관심 경로 사전에
//! 매칭되는 경로만 발견 사항이 되고, 나머지는 통계로만 집계됩니다.

use std::sync::OnceLock;

use regex::Regex;

use pentora_core::types::{Finding, FindingCategory, ToolKind};

use crate::taxonomy::interesting_path_severity;
use crate::{Normalized, ToolStats};

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\S+)\s+\(Status:\s*(\d+)\)\s*\[Size:\s*(\d+)\]")
            .expect("valid gobuster entry regex")
    })
}

/// gobuster 출력을 정규화합니다.
pub fn normalize(scan_id: &str, execution_id: &str, stdout: &str) -> Normalized {
    let mut findings = Vec::new();
    let mut found = 0usize;

    for line in stdout.lines() {
        let Some(caps) = entry_re().captures(line.trim()) else {
            continue;
        };
        found += 1;
        let path = &caps[1];
        let status = &caps[2];
        let size = &caps[3];

        let Some(severity) = interesting_path_severity(path) else {
            continue;
        };
        findings.push(
            Finding::new(
                scan_id,
                execution_id,
                ToolKind::Gobuster,
                FindingCategory::InterestingPath,
                severity,
                format!("Interesting path discovered: {path} (status {status})"),
            )
            .with_evidence("path", path)
            .with_evidence("status", status)
            .with_evidence("size", size),
        );
    }

    let interesting = findings.len();
    Normalized {
        findings,
        parse_errors: 0,
        stats: ToolStats::ContentDiscovery { found, interesting },
    }
}
