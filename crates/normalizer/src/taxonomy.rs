//! 분류 테이블 — 키워드 기반 심각도/카테고리 판정
//!
//! 정규화기가 공유하는 고정 룩업 테이블입니다. 판정 규칙이 코드 여기저기
//! 흩어지지 않도록 테이블로 모아 두며, 테이블 순서가 곧 우선순위입니다.

use std::sync::OnceLock;

use regex::Regex;

use pentora_core::types::{FindingCategory, Severity};

/// 심각도 키워드 테이블 (먼저 매칭되는 행 우선)
///
/// 원격 실행/인젝션 계열은 High, 노출/배너 계열은 Low입니다.
pub const SEVERITY_RULES: &[(&[&str], Severity)] = &[
    (
        &[
            "remote code execution",
            "remote command execution",
            "command injection",
            "sql injection",
            "arbitrary code",
            "rce",
            "shell upload",
        ],
        Severity::High,
    ),
    (
        &[
            "xss",
            "cross site scripting",
            "cross-site scripting",
            "csrf",
            "traversal",
            "directory indexing",
            "directory listing",
            "default account",
            "default credentials",
        ],
        Severity::Medium,
    ),
    (
        &[
            "disclosure",
            "banner",
            "version",
            "outdated",
            "x-frame-options",
            "x-content-type-options",
            "httponly",
            "secure flag",
            "server leaks",
        ],
        Severity::Low,
    ),
];

/// 카테고리 키워드 테이블 (먼저 매칭되는 행 우선)
pub const CATEGORY_RULES: &[(&[&str], FindingCategory)] = &[
    (
        &["sql injection", "sqli", "injection"],
        FindingCategory::Injection,
    ),
    (
        &["xss", "cross site scripting", "cross-site scripting"],
        FindingCategory::CrossSiteScripting,
    ),
    (
        &["traversal", "directory indexing", "directory listing"],
        FindingCategory::PathTraversal,
    ),
    (
        &[
            "login",
            "password",
            "credentials",
            "authentication",
            "session",
            "cookie",
        ],
        FindingCategory::Authentication,
    ),
    (
        &["ssl", "tls", "certificate", "https"],
        FindingCategory::TransportSecurity,
    ),
    (
        &[
            "disclosure",
            "banner",
            "version",
            "header",
            "server leaks",
            "x-frame-options",
            "x-content-type-options",
        ],
        FindingCategory::InformationDisclosure,
    ),
];

/// 관심 경로 사전 (gobuster)
///
/// 경로에 키워드가 포함되면 해당 심각도의 `InterestingPath` 발견 사항이
/// 됩니다. 관리/백업/설정 계열은 Medium보다 높게 봅니다.
pub const INTERESTING_PATHS: &[(&str, Severity)] = &[
    ("admin", Severity::High),
    ("backup", Severity::High),
    ("config", Severity::High),
    (".git", Severity::High),
    (".env", Severity::High),
    ("phpmyadmin", Severity::High),
    ("login", Severity::Medium),
    ("dashboard", Severity::Medium),
    ("api", Severity::Medium),
    ("upload", Severity::Medium),
    ("dev", Severity::Medium),
    ("test", Severity::Medium),
    ("db", Severity::Medium),
];

/// HTTP 계열로 취급하는 서비스명
pub const HTTP_SERVICE_NAMES: &[&str] = &["http", "https", "http-proxy", "http-alt", "www"];

/// 텍스트에서 심각도를 판정합니다. 매칭이 없으면 `Info`.
pub fn severity_for(text: &str) -> Severity {
    let lower = text.to_lowercase();
    for (keywords, severity) in SEVERITY_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *severity;
        }
    }
    Severity::Info
}

/// 텍스트에서 카테고리를 판정합니다. 매칭이 없으면 `Other`.
pub fn category_for(text: &str) -> FindingCategory {
    let lower = text.to_lowercase();
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *category;
        }
    }
    FindingCategory::Other
}

/// 경로가 관심 경로 사전에 매칭되면 심각도를 반환합니다.
pub fn interesting_path_severity(path: &str) -> Option<Severity> {
    let lower = path.to_lowercase();
    INTERESTING_PATHS
        .iter()
        .find(|(kw, _)| lower.contains(kw))
        .map(|(_, sev)| *sev)
}

/// 서비스명이 HTTP 계열인지 판정합니다.
pub fn is_http_service(service: &str) -> bool {
    let lower = service.to_lowercase();
    HTTP_SERVICE_NAMES
        .iter()
        .any(|name| lower == *name || lower.starts_with("http"))
        || lower.contains("ssl/http")
}

/// 텍스트에서 첫 번째 CVE ID를 추출합니다.
pub fn extract_cve(text: &str) -> Option<String> {
    static CVE_RE: OnceLock<Regex> = OnceLock::new();
    let re = CVE_RE.get_or_init(|| Regex::new(r"CVE-\d{4}-\d{4,7}").expect("valid CVE regex"));
    re.find(text).map(|m| m.as_str().to_owned())
}
