//! hydra 출력 정규화기
//!
//! 성공 라인(`[port][service] host: H login: U password: P`)마다
//! Critical `WeakCredential` 발견 사항을 생성합니다. 시도 라인은
//! 발견 사항이 아니라 통계로만 집계됩니다.

use std::sync::OnceLock;

use regex::Regex;

use pentora_core::types::{Finding, FindingCategory, Severity, ToolKind};

use crate::{Normalized, ToolStats};

fn success_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[(\d+)\]\[([^\]]+)\]\s+host:\s+(\S+)\s+login:\s+(\S+)\s+password:\s+(.+)")
            .expect("valid hydra success regex")
    })
}

/// hydra 출력을 정규화합니다.
///
/// `-V` 모드의 `[ATTEMPT]` 라인을 시도 횟수로 집계하고, 성공 라인을
/// 발견 사항으로 변환합니다.
pub fn normalize(scan_id: &str, execution_id: &str, stdout: &str, stderr: &str) -> Normalized {
    let mut findings = Vec::new();
    let mut attempts = 0usize;

    for line in stdout.lines().chain(stderr.lines()) {
        if line.contains("[ATTEMPT]") {
            attempts += 1;
            continue;
        }
        let Some(caps) = success_re().captures(line) else {
            continue;
        };
        let port = &caps[1];
        let service = &caps[2];
        let host = &caps[3];
        let login = &caps[4];
        let password = caps[5].trim();

        findings.push(
            Finding::new(
                scan_id,
                execution_id,
                ToolKind::Hydra,
                FindingCategory::WeakCredential,
                Severity::Critical,
                format!("Valid credentials found for {service} on {host}:{port}"),
            )
            .with_evidence("host", host)
            .with_evidence("port", port)
            .with_evidence("service", service)
            .with_evidence("login", login)
            .with_evidence("password", password),
        );
    }

    let successes = findings.len();
    // 성공한 시도도 [ATTEMPT] 라인으로 먼저 출력되므로 실패 수는 차로 구한다
    let failures = attempts.saturating_sub(successes);

    Normalized {
        findings,
        parse_errors: 0,
        stats: ToolStats::BruteForce {
            successes,
            failures,
        },
    }
}
