//! 결정적 권고 도출 엔진
//!
//! 발견 사항 집합을 [`crate::rules`]의 템플릿 테이블과 매칭하여 권고를
//! 생성합니다. 동일한 발견 사항 집합은 입력 순서와 무관하게 동일한 권고
//! 집합을 만들고, 같은 제목의 권고는 한 번만 나옵니다. 외부 분석 보강은
//! 제한 시간 안에서만 시도되며 실패해도 결정적 권고에 영향이 없습니다.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use tracing::{debug, warn};

use pentora_core::ports::DynAdvisoryPort;
use pentora_core::types::{
    Finding, FindingCategory, Priority, Recommendation, RecommendationKind, ScanContext, Severity,
    ToolKind,
};

use crate::rules::{
    DEEP_WEB_ASSESSMENT, HARDENING_RULES, HIGH_WEB_FINDINGS, INJECTION_TECHNIQUE_RULES,
    MEDIUM_WEB_FINDINGS, PATH_ENUMERATION, PATH_KEYWORD_RULES, SERVICE_EXPOSURE_RULES,
    SQL_INJECTION_CONFIRMED, Template, VULNERABILITY_CATEGORIES, WEAK_CREDENTIALS,
    WEB_CATEGORIES, WEB_CATEGORY_RULES,
};

/// 발견 사항에서 결정적 권고 집합을 도출합니다.
///
/// 순수 함수이며 입력 순서에 영향을 받지 않습니다. `parse_error` 마커는
/// 룰 평가에서 제외됩니다.
pub fn derive(scan_id: &str, findings: &[Finding]) -> Vec<Recommendation> {
    // 입력 순서 무관성을 위해 안정적인 키로 정렬한 뷰에서 평가한다
    let mut sorted: Vec<&Finding> = findings.iter().filter(|f| !f.parse_error).collect();
    sorted.sort_by(|a, b| {
        (a.tool.as_str(), a.category.as_str(), &a.description, &a.id)
            .cmp(&(b.tool.as_str(), b.category.as_str(), &b.description, &b.id))
    });

    let mut out = Vec::new();
    let mut seen = BTreeSet::new();

    emit_service_exposure(scan_id, &sorted, &mut out, &mut seen);
    emit_weak_credentials(scan_id, &sorted, &mut out, &mut seen);
    emit_web_aggregates(scan_id, &sorted, &mut out, &mut seen);
    emit_injection_confirmed(scan_id, &sorted, &mut out, &mut seen);
    emit_path_discovery(scan_id, &sorted, &mut out, &mut seen);
    emit_cross_tool(scan_id, &sorted, &mut out, &mut seen);

    debug!(scan_id, count = out.len(), "derived recommendations");
    out
}

/// 결정적 권고에 외부 분석 결과를 보강합니다.
///
/// 포트가 없거나, 오류가 나거나, 제한 시간을 넘기면 결정적 권고만
/// 반환합니다. 보강 항목은 항상 결정적 집합 뒤에 붙습니다.
pub async fn derive_with_advisory(
    context: ScanContext,
    advisory: Option<&dyn DynAdvisoryPort>,
    timeout: Duration,
) -> Vec<Recommendation> {
    let mut recommendations = derive(&context.scan_id, &context.findings);

    let Some(port) = advisory else {
        return recommendations;
    };
    let scan_id = context.scan_id.clone();

    match tokio::time::timeout(timeout, port.analyze(context)).await {
        Ok(Ok(result)) => {
            let before = recommendations.len();
            append_advisory(&scan_id, &result, &mut recommendations);
            debug!(
                scan_id,
                appended = recommendations.len() - before,
                "advisory enrichment applied"
            );
        }
        Ok(Err(err)) => {
            warn!(scan_id, error = %err, "advisory analysis failed, continuing without enrichment");
        }
        Err(_) => {
            warn!(scan_id, ?timeout, "advisory analysis timed out, continuing without enrichment");
        }
    }
    recommendations
}

fn append_advisory(
    scan_id: &str,
    result: &pentora_core::types::AdvisoryResult,
    out: &mut Vec<Recommendation>,
) {
    let summary = result.risk_summary.trim();
    if !summary.is_empty() {
        out.push(Recommendation::new(
            scan_id,
            RecommendationKind::AiRecommendation,
            "AI Risk Assessment",
            summary,
            Priority::Medium,
            "Review the overall risk assessment",
        ));
    }
    for entry in &result.vulnerabilities {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        out.push(Recommendation::new(
            scan_id,
            RecommendationKind::Vulnerability,
            format!("AI Detected: {}", snippet(entry)),
            entry,
            Priority::High,
            "Validate and remediate the reported vulnerability",
        ));
    }
    for entry in &result.recommendations {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        out.push(Recommendation::new(
            scan_id,
            RecommendationKind::AiRecommendation,
            format!("AI Recommendation: {}", snippet(entry)),
            entry,
            Priority::Medium,
            "Apply the suggested measure where applicable",
        ));
    }
    for entry in &result.next_steps {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        out.push(Recommendation::new(
            scan_id,
            RecommendationKind::AiRecommendation,
            format!("AI Suggests: {}", snippet(entry)),
            entry,
            Priority::Medium,
            "Evaluate the suggested next step",
        ));
    }
}

/// 제목에 쓸 짧은 앞부분 (문자 경계 기준 60자)
fn snippet(text: &str) -> String {
    text.chars().take(60).collect()
}

fn evidence<'a>(finding: &'a Finding, key: &str) -> Option<&'a str> {
    finding
        .evidence
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn push(
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
    scan_id: &str,
    template: &Template,
    description: String,
    mut finding_ids: Vec<String>,
) {
    if !seen.insert(template.title) {
        return;
    }
    finding_ids.sort();
    finding_ids.dedup();
    let mut rec = Recommendation::new(
        scan_id,
        template.kind,
        template.title,
        description,
        template.priority,
        template.action,
    );
    rec.finding_ids = finding_ids;
    out.push(rec);
}

fn emit_service_exposure(
    scan_id: &str,
    findings: &[&Finding],
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
) {
    // 서비스 패밀리별 (포트 목록, 근거 ID)
    let mut exposed: BTreeMap<&'static str, (BTreeSet<String>, Vec<String>)> = BTreeMap::new();
    for finding in findings {
        if finding.category != FindingCategory::ServiceExposure {
            continue;
        }
        let Some(service) = evidence(finding, "service") else {
            continue;
        };
        let service = service.to_lowercase();
        for (key, _) in SERVICE_EXPOSURE_RULES {
            if service.starts_with(key) {
                let entry = exposed.entry(key).or_default();
                if let Some(port) = evidence(finding, "port") {
                    entry.0.insert(port.to_owned());
                }
                entry.1.push(finding.id.clone());
            }
        }
    }

    for (key, template) in SERVICE_EXPOSURE_RULES {
        let Some((ports, ids)) = exposed.remove(key) else {
            continue;
        };
        let ports: Vec<String> = ports.into_iter().collect();
        let description = if ports.is_empty() {
            format!("{key} service exposed on the target")
        } else {
            format!("{key} service exposed on port(s) {}", ports.join(", "))
        };
        push(out, seen, scan_id, template, description, ids);
    }
}

fn emit_weak_credentials(
    scan_id: &str,
    findings: &[&Finding],
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
) {
    let weak: Vec<&&Finding> = findings
        .iter()
        .filter(|f| f.category == FindingCategory::WeakCredential)
        .collect();
    if weak.is_empty() {
        return;
    }

    let all_ids: Vec<String> = weak.iter().map(|f| f.id.clone()).collect();
    push(
        out,
        seen,
        scan_id,
        &WEAK_CREDENTIALS,
        format!(
            "Found {} successful login(s) with weak credentials",
            weak.len()
        ),
        all_ids,
    );

    for (key, template) in HARDENING_RULES {
        let matched: Vec<String> = weak
            .iter()
            .filter(|f| {
                evidence(f, "service")
                    .map(|s| s.to_lowercase().starts_with(key))
                    .unwrap_or(false)
            })
            .map(|f| f.id.clone())
            .collect();
        if matched.is_empty() {
            continue;
        }
        push(
            out,
            seen,
            scan_id,
            template,
            format!("Brute force against {key} succeeded ({} credential(s))", matched.len()),
            matched,
        );
    }
}

fn emit_web_aggregates(
    scan_id: &str,
    findings: &[&Finding],
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
) {
    let web: Vec<&&Finding> = findings
        .iter()
        .filter(|f| WEB_CATEGORIES.contains(&f.category))
        .collect();

    let high: Vec<String> = web
        .iter()
        .filter(|f| f.severity >= Severity::High)
        .map(|f| f.id.clone())
        .collect();
    if !high.is_empty() {
        push(
            out,
            seen,
            scan_id,
            &HIGH_WEB_FINDINGS,
            format!("Found {} high severity web finding(s)", high.len()),
            high,
        );
    }

    let medium: Vec<String> = web
        .iter()
        .filter(|f| f.severity == Severity::Medium)
        .map(|f| f.id.clone())
        .collect();
    if !medium.is_empty() {
        push(
            out,
            seen,
            scan_id,
            &MEDIUM_WEB_FINDINGS,
            format!("Found {} medium severity web finding(s)", medium.len()),
            medium,
        );
    }

    for (category, template) in WEB_CATEGORY_RULES {
        let matched: Vec<String> = web
            .iter()
            .filter(|f| f.category == *category && f.tool == ToolKind::Nikto)
            .map(|f| f.id.clone())
            .collect();
        if matched.is_empty() {
            continue;
        }
        push(
            out,
            seen,
            scan_id,
            template,
            format!("Web scanner reported {} finding(s) in this class", matched.len()),
            matched,
        );
    }
}

fn emit_injection_confirmed(
    scan_id: &str,
    findings: &[&Finding],
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
) {
    let confirmed: Vec<&&Finding> = findings
        .iter()
        .filter(|f| f.category == FindingCategory::Injection && f.tool == ToolKind::Sqlmap)
        .collect();
    if confirmed.is_empty() {
        return;
    }

    let all_ids: Vec<String> = confirmed.iter().map(|f| f.id.clone()).collect();
    push(
        out,
        seen,
        scan_id,
        &SQL_INJECTION_CONFIRMED,
        format!("Confirmed {} SQL injection point(s)", confirmed.len()),
        all_ids,
    );

    for (keyword, template) in INJECTION_TECHNIQUE_RULES {
        let matched: Vec<String> = confirmed
            .iter()
            .filter(|f| {
                evidence(f, "type")
                    .map(|t| t.to_lowercase().contains(keyword))
                    .unwrap_or(false)
            })
            .map(|f| f.id.clone())
            .collect();
        if matched.is_empty() {
            continue;
        }
        push(
            out,
            seen,
            scan_id,
            template,
            format!("{} injection point(s) use this technique", matched.len()),
            matched,
        );
    }
}

fn emit_path_discovery(
    scan_id: &str,
    findings: &[&Finding],
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
) {
    let paths: Vec<&&Finding> = findings
        .iter()
        .filter(|f| f.category == FindingCategory::InterestingPath)
        .collect();
    if paths.is_empty() {
        return;
    }

    let all_ids: Vec<String> = paths.iter().map(|f| f.id.clone()).collect();
    push(
        out,
        seen,
        scan_id,
        &PATH_ENUMERATION,
        format!("Found {} interesting path(s) during content discovery", paths.len()),
        all_ids,
    );

    for (keyword, template) in PATH_KEYWORD_RULES {
        let matched: Vec<String> = paths
            .iter()
            .filter(|f| {
                evidence(f, "path")
                    .map(|p| p.to_lowercase().contains(keyword))
                    .unwrap_or(false)
            })
            .map(|f| f.id.clone())
            .collect();
        if matched.is_empty() {
            continue;
        }
        push(
            out,
            seen,
            scan_id,
            template,
            format!("Found {} {keyword}-related path(s)", matched.len()),
            matched,
        );
    }
}

fn emit_cross_tool(
    scan_id: &str,
    findings: &[&Finding],
    out: &mut Vec<Recommendation>,
    seen: &mut BTreeSet<&'static str>,
) {
    let http_exposure: Vec<String> = findings
        .iter()
        .filter(|f| {
            f.category == FindingCategory::ServiceExposure
                && evidence(f, "service")
                    .map(|s| {
                        let s = s.to_lowercase();
                        s.starts_with("http") || s == "www" || s.contains("ssl/http")
                    })
                    .unwrap_or(false)
        })
        .map(|f| f.id.clone())
        .collect();
    if http_exposure.is_empty() {
        return;
    }

    let vulnerabilities: Vec<String> = findings
        .iter()
        .filter(|f| VULNERABILITY_CATEGORIES.contains(&f.category))
        .map(|f| f.id.clone())
        .collect();
    if vulnerabilities.is_empty() {
        return;
    }

    let mut ids = http_exposure;
    ids.extend(vulnerabilities);
    push(
        out,
        seen,
        scan_id,
        &DEEP_WEB_ASSESSMENT,
        "Web server detected with vulnerabilities found".to_owned(),
        ids,
    );
}
