//! nmap XML 정규화기
//!
//! `nmap -oX -` 출력을 파싱하여 열린 포트마다 `ServiceExposure` 발견
//! 사항을 생성하고, 후속 단계의 전제 조건 판정에 쓰이는 정찰 신호를
//! 산출합니다. XML 전체가 파싱 불가능하면 `parse_error` 마커 하나를
//! 반환합니다.

use quick_xml::de::from_str;
use serde::Deserialize;

use pentora_core::types::{Finding, FindingCategory, Severity, ToolKind};

use crate::taxonomy::is_http_service;
use crate::{Normalized, ToolStats};

#[derive(Debug, Deserialize)]
struct NmapRun {
    #[serde(rename = "host", default)]
    hosts: Vec<NmapHost>,
}

#[derive(Debug, Deserialize)]
struct NmapHost {
    #[serde(default)]
    status: Option<NmapStatus>,
    #[serde(rename = "address", default)]
    addresses: Vec<NmapAddress>,
    #[serde(default)]
    ports: Option<NmapPorts>,
}

#[derive(Debug, Deserialize)]
struct NmapStatus {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct NmapAddress {
    #[serde(rename = "@addr")]
    addr: String,
}

#[derive(Debug, Deserialize)]
struct NmapPorts {
    #[serde(rename = "port", default)]
    ports: Vec<NmapPort>,
}

#[derive(Debug, Deserialize)]
struct NmapPort {
    #[serde(rename = "@portid")]
    portid: u16,
    #[serde(rename = "@protocol")]
    protocol: String,
    state: NmapState,
    #[serde(default)]
    service: Option<NmapService>,
}

#[derive(Debug, Deserialize)]
struct NmapState {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct NmapService {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@product", default)]
    product: Option<String>,
    #[serde(rename = "@version", default)]
    version: Option<String>,
}

/// nmap XML 출력을 정규화합니다.
pub fn normalize(scan_id: &str, execution_id: &str, stdout: &str) -> Normalized {
    let run: NmapRun = match from_str(stdout) {
        Ok(run) => run,
        Err(e) => {
            let marker = Finding::new(
                scan_id,
                execution_id,
                ToolKind::Nmap,
                FindingCategory::Other,
                Severity::Info,
                "nmap output could not be parsed as XML",
            )
            .with_evidence("error", e.to_string())
            .as_parse_error();
            return Normalized {
                findings: vec![marker],
                parse_errors: 1,
                stats: ToolStats::PortScan {
                    hosts: 0,
                    open_ports: 0,
                    services: Vec::new(),
                    http_present: false,
                },
            };
        }
    };

    let mut findings = Vec::new();
    let mut open_ports = 0usize;
    let mut services: Vec<String> = Vec::new();
    let mut http_present = false;
    // 호스트 엔트리 수는 up/down 여부와 무관하게 보존한다
    let hosts = run.hosts.len();

    for host in &run.hosts {
        if let Some(status) = &host.status {
            if status.state != "up" {
                continue;
            }
        }
        let addr = host
            .addresses
            .first()
            .map(|a| a.addr.as_str())
            .unwrap_or("unknown");

        let Some(ports) = &host.ports else { continue };
        for port in &ports.ports {
            if port.state.state != "open" {
                continue;
            }
            open_ports += 1;

            let service_name = port
                .service
                .as_ref()
                .map(|s| s.name.as_str())
                .unwrap_or("unknown");
            if !services.iter().any(|s| s == service_name) {
                services.push(service_name.to_owned());
            }
            if is_http_service(service_name) {
                http_present = true;
            }

            let mut finding = Finding::new(
                scan_id,
                execution_id,
                ToolKind::Nmap,
                FindingCategory::ServiceExposure,
                Severity::Info,
                format!(
                    "Open port {}/{} ({}) on {}",
                    port.portid, port.protocol, service_name, addr
                ),
            )
            .with_evidence("host", addr)
            .with_evidence("port", port.portid.to_string())
            .with_evidence("protocol", &port.protocol)
            .with_evidence("service", service_name);
            if let Some(service) = &port.service {
                if let Some(product) = &service.product {
                    finding = finding.with_evidence("product", product);
                }
                if let Some(version) = &service.version {
                    finding = finding.with_evidence("version", version);
                }
            }
            findings.push(finding);
        }
    }

    Normalized {
        findings,
        parse_errors: 0,
        stats: ToolStats::PortScan {
            hosts,
            open_ports,
            services,
            http_present,
        },
    }
}
