//! 권고 템플릿 테이블
//!
//! 권고의 제목/종류/우선순위/조치는 전부 이 모듈의 고정 테이블에
//! 있습니다. 엔진은 테이블을 순회하며 매칭만 하고, 설명 문구의 수치만
//! 채웁니다. 테이블 순서가 곧 출력 순서입니다.

use pentora_core::types::{FindingCategory, Priority, RecommendationKind};

/// 권고 템플릿 (설명은 엔진이 수치를 채워 생성)
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub kind: RecommendationKind,
    pub title: &'static str,
    pub priority: Priority,
    pub action: &'static str,
}

/// 서비스 노출 룰 — nmap `ServiceExposure` 발견 사항의 서비스명 기준
pub const SERVICE_EXPOSURE_RULES: &[(&str, Template)] = &[
    (
        "ssh",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "SSH Service Detected",
            priority: Priority::Medium,
            action: "Test SSH for weak credentials and configuration issues",
        },
    ),
    (
        "ftp",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "FTP Service Detected",
            priority: Priority::High,
            action: "Test FTP for anonymous access and weak credentials",
        },
    ),
    (
        "http",
        Template {
            kind: RecommendationKind::NextStep,
            title: "Web Server Detected",
            priority: Priority::Medium,
            action: "Run web vulnerability scans (nikto, sqlmap, gobuster)",
        },
    ),
    (
        "mysql",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "MySQL Database Detected",
            priority: Priority::High,
            action: "Test MySQL for weak credentials and SQL injection",
        },
    ),
];

/// 취약 자격증명 집계 룰
pub const WEAK_CREDENTIALS: Template = Template {
    kind: RecommendationKind::Vulnerability,
    title: "Weak Credentials Found",
    priority: Priority::Critical,
    action: "Change all weak passwords immediately",
};

/// 서비스별 보안 강화 룰 — hydra `WeakCredential` 발견 사항의 서비스명 기준
pub const HARDENING_RULES: &[(&str, Template)] = &[
    (
        "ssh",
        Template {
            kind: RecommendationKind::Mitigation,
            title: "SSH Security Hardening",
            priority: Priority::High,
            action: "Implement SSH key-based authentication, disable password auth, use fail2ban",
        },
    ),
    (
        "ftp",
        Template {
            kind: RecommendationKind::Mitigation,
            title: "FTP Security Hardening",
            priority: Priority::High,
            action: "Disable anonymous FTP, use strong passwords, consider SFTP",
        },
    ),
    (
        "mysql",
        Template {
            kind: RecommendationKind::Mitigation,
            title: "MySQL Security Hardening",
            priority: Priority::High,
            action: "Enforce strong passwords, restrict remote access, apply least privilege",
        },
    ),
    (
        "http",
        Template {
            kind: RecommendationKind::Mitigation,
            title: "Web Login Hardening",
            priority: Priority::High,
            action: "Add rate limiting and account lockout to login forms, enforce strong passwords",
        },
    ),
];

/// 웹 취약점 심각도 집계 룰 (nikto)
pub const HIGH_WEB_FINDINGS: Template = Template {
    kind: RecommendationKind::Vulnerability,
    title: "High Severity Web Vulnerabilities",
    priority: Priority::Critical,
    action: "Address high severity vulnerabilities immediately",
};

pub const MEDIUM_WEB_FINDINGS: Template = Template {
    kind: RecommendationKind::Vulnerability,
    title: "Medium Severity Web Vulnerabilities",
    priority: Priority::High,
    action: "Address medium severity vulnerabilities promptly",
};

/// 웹 카테고리별 룰 (nikto 발견 사항)
pub const WEB_CATEGORY_RULES: &[(FindingCategory, Template)] = &[
    (
        FindingCategory::Injection,
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "SQL Injection Indications",
            priority: Priority::Critical,
            action: "Run sqlmap for detailed SQL injection testing",
        },
    ),
    (
        FindingCategory::CrossSiteScripting,
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "Cross-Site Scripting (XSS)",
            priority: Priority::High,
            action: "Implement output encoding and Content Security Policy",
        },
    ),
];

/// 주입 확인 집계 룰 (sqlmap)
pub const SQL_INJECTION_CONFIRMED: Template = Template {
    kind: RecommendationKind::Vulnerability,
    title: "SQL Injection Vulnerabilities Confirmed",
    priority: Priority::Critical,
    action: "Fix SQL injection vulnerabilities immediately using parameterized queries",
};

/// 주입 기법별 룰 — sqlmap 발견 사항의 `type` 증거 키워드 기준
pub const INJECTION_TECHNIQUE_RULES: &[(&str, Template)] = &[
    (
        "union",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "Union Query SQL Injection",
            priority: Priority::Critical,
            action: "Fix immediately - this allows direct database access",
        },
    ),
    (
        "blind",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "Blind SQL Injection",
            priority: Priority::High,
            action: "Fix SQL injection and implement proper input validation",
        },
    ),
];

/// 경로 열거 집계 룰 (gobuster)
pub const PATH_ENUMERATION: Template = Template {
    kind: RecommendationKind::Information,
    title: "Directory Enumeration Results",
    priority: Priority::Low,
    action: "Review found paths for sensitive information",
};

/// 경로 키워드별 룰 — gobuster `InterestingPath` 발견 사항의 경로 기준
pub const PATH_KEYWORD_RULES: &[(&str, Template)] = &[
    (
        "admin",
        Template {
            kind: RecommendationKind::NextStep,
            title: "Admin Panel Found",
            priority: Priority::Medium,
            action: "Test admin panels for authentication bypass and weak credentials",
        },
    ),
    (
        "backup",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "Backup Files Found",
            priority: Priority::High,
            action: "Check backup files for sensitive information and remove if not needed",
        },
    ),
    (
        "config",
        Template {
            kind: RecommendationKind::Vulnerability,
            title: "Configuration Files Found",
            priority: Priority::High,
            action: "Review configuration files for sensitive information",
        },
    ),
];

/// 교차 도구 상관 룰 — HTTP 서비스 노출 + 취약점 발견 사항 동시 존재
pub const DEEP_WEB_ASSESSMENT: Template = Template {
    kind: RecommendationKind::NextStep,
    title: "Web Application Security Assessment",
    priority: Priority::High,
    action: "Perform comprehensive web application security testing including manual testing",
};

/// 교차 도구 상관에서 취약점으로 취급하는 카테고리
pub const VULNERABILITY_CATEGORIES: &[FindingCategory] = &[
    FindingCategory::Injection,
    FindingCategory::CrossSiteScripting,
    FindingCategory::PathTraversal,
    FindingCategory::Authentication,
    FindingCategory::WeakCredential,
];

/// 웹 심각도 집계가 대상으로 하는 카테고리
pub const WEB_CATEGORIES: &[FindingCategory] = &[
    FindingCategory::Injection,
    FindingCategory::CrossSiteScripting,
    FindingCategory::PathTraversal,
    FindingCategory::Authentication,
    FindingCategory::TransportSecurity,
    FindingCategory::InformationDisclosure,
];
