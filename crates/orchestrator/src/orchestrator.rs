//! 스캔 세션 상태 기계
//!
//! 세션마다 전용 태스크가 단계를 순차 실행하고, 세션들은 동시에
//! 실행됩니다. 블로킹 지점은 도구 서브프로세스 대기뿐이므로 `stop_scan`과
//! 이벤트 전달은 언제나 응답합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pentora_core::config::PentoraConfig;
use pentora_core::error::{PentoraError, StoreError, ValidationError};
use pentora_core::event::{RecommendationsEvent, ScanEvent, ScanUpdateEvent, ToolOutputEvent};
use pentora_core::hub::BroadcastHub;
use pentora_core::metrics as metric_names;
use pentora_core::ports::{DynAdvisoryPort, DynScanStore, DynToolRunner};
use pentora_core::types::{
    Finding, Recommendation, ScanContext, ScanSession, ScanStatus, ToolExecution,
};
use pentora_normalizer::{Normalized, ToolStats, normalize_execution};
use pentora_tool_runner::{build_command, validate_component, validate_target};

use crate::pipeline::{ScanKind, StagePrecondition, stages_for};

/// 스캔 시작 요청
#[derive(Debug, Clone)]
pub struct StartScanRequest {
    /// 사람이 읽을 수 있는 세션 이름
    pub name: String,
    /// 대상 호스트명, IP 또는 URL
    pub target: String,
    /// 스캔 종류 (`"nmap"` ... `"comprehensive"`)
    pub scan_kind: String,
    /// hydra 대상 서비스 (기본 `"ssh"`)
    pub service: Option<String>,
}

struct RunningScan {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct Inner {
    config: PentoraConfig,
    store: Arc<dyn DynScanStore>,
    runner: Arc<dyn DynToolRunner>,
    advisory: Option<Arc<dyn DynAdvisoryPort>>,
    hub: BroadcastHub,
    running: Mutex<HashMap<String, RunningScan>>,
}

/// 스캔 오케스트레이터
///
/// `Clone`은 같은 내부 상태를 공유합니다.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

impl ScanOrchestrator {
    pub fn new(
        config: PentoraConfig,
        store: Arc<dyn DynScanStore>,
        runner: Arc<dyn DynToolRunner>,
        hub: BroadcastHub,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                store,
                runner,
                advisory: None,
                hub,
                running: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// 외부 분석 포트를 연결합니다. 세션 시작 전에만 호출합니다.
    pub fn with_advisory(mut self, advisory: Arc<dyn DynAdvisoryPort>) -> Self {
        let inner = Arc::get_mut(&mut self.inner)
            .expect("with_advisory must be called before the orchestrator is shared");
        inner.advisory = Some(advisory);
        self
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.inner.hub
    }

    /// 스캔 세션을 생성하고 실행 태스크를 시작합니다.
    ///
    /// 검증 실패 시 세션은 생성되지 않습니다. 성공하면 세션 ID를
    /// 반환하며, 실행은 비동기로 진행됩니다.
    pub async fn start_scan(&self, request: StartScanRequest) -> Result<String, PentoraError> {
        let kind = ScanKind::parse(&request.scan_kind)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "name".to_owned(),
            }
            .into());
        }
        validate_target("target", &request.target)?;
        let service = request.service.unwrap_or_else(|| "ssh".to_owned());
        validate_component("service", &service)?;
        // 단계별 명령 구성을 미리 검증한다 (세션 생성 전 동기 검증)
        for stage in stages_for(kind) {
            build_command(stage.tool, &request.target, &service, &self.inner.config.tools)?;
        }

        let mut running = self.inner.running.lock().await;
        let limit = self.inner.config.scan.max_concurrent_scans;
        if running.len() >= limit {
            return Err(PentoraError::Busy { limit });
        }

        let session = ScanSession::new(name, &request.target, kind.as_str());
        let scan_id = session.id.clone();
        self.inner.store.create_session(session).await?;

        metrics::counter!(
            metric_names::SCANS_STARTED_TOTAL,
            metric_names::LABEL_SCAN_KIND => kind.as_str()
        )
        .increment(1);
        info!(
            scan_id,
            target = %request.target,
            scan_kind = kind.as_str(),
            "scan session created"
        );

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(
            self.inner.clone(),
            scan_id.clone(),
            request.target,
            service,
            kind,
            cancel.clone(),
        ));
        running.insert(scan_id.clone(), RunningScan { cancel, task });
        Ok(scan_id)
    }

    /// 실행 중인 스캔을 중지합니다.
    ///
    /// 실행 중이었으면 세션이 `Cancelled`로 전이된 뒤 `true`를
    /// 반환합니다. 이미 종료되었거나 없는 세션이면 `false`.
    pub async fn stop_scan(&self, scan_id: &str) -> bool {
        let removed = self.inner.running.lock().await.remove(scan_id);
        let Some(running) = removed else {
            return false;
        };
        info!(scan_id, "stop requested");
        running.cancel.cancel();
        if let Err(err) = running.task.await {
            error!(scan_id, error = %err, "scan task join failed");
        }
        true
    }

    /// 실행 중인 모든 스캔을 중지하고 태스크 종료를 기다립니다.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, RunningScan)> =
            self.inner.running.lock().await.drain().collect();
        for (scan_id, running) in drained {
            info!(scan_id, "cancelling scan for shutdown");
            running.cancel.cancel();
            if let Err(err) = running.task.await {
                error!(scan_id, error = %err, "scan task join failed");
            }
        }
    }

    pub async fn running_count(&self) -> usize {
        self.inner.running.lock().await.len()
    }

    pub async fn get_scan(&self, scan_id: &str) -> Result<ScanSession, PentoraError> {
        Ok(self.inner.store.get_session(scan_id).await?)
    }

    pub async fn list_scans(&self) -> Result<Vec<ScanSession>, PentoraError> {
        Ok(self.inner.store.list_sessions().await?)
    }

    pub async fn get_findings(&self, scan_id: &str) -> Result<Vec<Finding>, PentoraError> {
        self.inner.store.get_session(scan_id).await?;
        Ok(self.inner.store.findings_for_scan(scan_id).await?)
    }

    pub async fn get_recommendations(
        &self,
        scan_id: &str,
    ) -> Result<Vec<Recommendation>, PentoraError> {
        self.inner.store.get_session(scan_id).await?;
        Ok(self.inner.store.recommendations_for_scan(scan_id).await?)
    }

    pub async fn get_executions(
        &self,
        scan_id: &str,
    ) -> Result<Vec<ToolExecution>, PentoraError> {
        self.inner.store.get_session(scan_id).await?;
        Ok(self.inner.store.executions_for_scan(scan_id).await?)
    }

    /// 세션과 그 실행, 발견 사항, 권고를 삭제합니다.
    ///
    /// 실행 중인 세션은 삭제할 수 없습니다.
    pub async fn delete_scan(&self, scan_id: &str) -> Result<(), PentoraError> {
        if self.inner.running.lock().await.contains_key(scan_id) {
            return Err(StoreError::Conflict {
                entity: "scan_session",
                id: scan_id.to_owned(),
                reason: "scan is still running".to_owned(),
            }
            .into());
        }
        Ok(self.inner.store.delete_scan(scan_id).await?)
    }
}

/// 세션 실행 태스크 본문
async fn run_session(
    inner: Arc<Inner>,
    scan_id: String,
    target: String,
    service: String,
    kind: ScanKind,
    cancel: CancellationToken,
) {
    metrics::gauge!(metric_names::SCANS_RUNNING).increment(1.0);

    let final_status = match drive_stages(&inner, &scan_id, &target, &service, kind, &cancel).await
    {
        Ok(status) => status,
        Err(err) => {
            error!(scan_id, error = %err, "persistence failure during scan");
            ScanStatus::Failed
        }
    };

    finalize(&inner, &scan_id, &target, kind, final_status).await;

    metrics::gauge!(metric_names::SCANS_RUNNING).decrement(1.0);
    inner.running.lock().await.remove(&scan_id);
}

/// 단계들을 순차 실행하고 세션의 터미널 상태를 결정합니다.
async fn drive_stages(
    inner: &Inner,
    scan_id: &str,
    target: &str,
    service: &str,
    kind: ScanKind,
    cancel: &CancellationToken,
) -> Result<ScanStatus, StoreError> {
    let mut session = inner.store.get_session(scan_id).await?;
    session.status = ScanStatus::Running;
    session.started_at = Some(SystemTime::now());
    inner.store.update_session(session).await?;
    inner
        .hub
        .broadcast(ScanEvent::ScanUpdate(ScanUpdateEvent::new(
            scan_id,
            ScanStatus::Running,
        )));

    let mut http_present = false;
    let mut executed = 0usize;
    let mut failed = 0usize;
    let mut critical_failed = false;
    let mut cancelled = false;

    for stage in stages_for(kind) {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        if stage.precondition == StagePrecondition::HttpServiceDiscovered && !http_present {
            debug!(
                scan_id,
                tool = stage.tool.as_str(),
                "stage skipped, no http service discovered"
            );
            metrics::counter!(
                metric_names::STAGES_SKIPPED_TOTAL,
                metric_names::LABEL_TOOL => stage.tool.as_str()
            )
            .increment(1);
            continue;
        }

        let spec = match build_command(stage.tool, target, service, &inner.config.tools) {
            Ok(spec) => spec,
            Err(err) => {
                warn!(scan_id, tool = stage.tool.as_str(), error = %err, "command build failed");
                executed += 1;
                failed += 1;
                if stage.critical {
                    critical_failed = true;
                    break;
                }
                continue;
            }
        };

        let mut execution = ToolExecution::new(scan_id, stage.tool, spec.display_line());
        execution.status = ScanStatus::Running;
        inner.store.create_execution(execution.clone()).await?;
        executed += 1;

        info!(
            scan_id,
            tool = stage.tool.as_str(),
            command = %execution.command,
            "stage started"
        );

        let timeout = inner.config.tools.timeout(stage.tool);
        let stage_ok = match inner
            .runner
            .execute(spec, timeout, cancel.clone())
            .await
        {
            Ok(raw) => {
                if raw.timed_out {
                    warn!(scan_id, tool = stage.tool.as_str(), ?timeout, "stage timed out");
                }
                execution.status = if raw.cancelled {
                    ScanStatus::Cancelled
                } else if raw.is_success() {
                    ScanStatus::Completed
                } else {
                    ScanStatus::Failed
                };
                execution.stdout = raw.stdout;
                execution.stderr = raw.stderr;
                execution.completed_at = Some(SystemTime::now());
                inner.store.update_execution(execution.clone()).await?;

                // 중단된 실행의 부분 출력도 정규화한다
                let normalized = normalize_execution(&execution);
                record_findings(stage.tool.as_str(), &normalized);
                if let ToolStats::PortScan { http_present: http, .. } = &normalized.stats {
                    http_present |= *http;
                }
                if !normalized.findings.is_empty() {
                    inner.store.add_findings(normalized.findings).await?;
                }

                inner
                    .hub
                    .broadcast(ScanEvent::ToolOutput(ToolOutputEvent::new(
                        scan_id,
                        stage.tool,
                        execution.stdout.clone(),
                    )));

                if raw.cancelled {
                    cancelled = true;
                }
                execution.status == ScanStatus::Completed
            }
            Err(err) => {
                warn!(scan_id, tool = stage.tool.as_str(), error = %err, "stage launch failed");
                execution.status = ScanStatus::Failed;
                execution.stderr = err.to_string();
                execution.completed_at = Some(SystemTime::now());
                inner.store.update_execution(execution.clone()).await?;
                false
            }
        };

        let result_label = if cancelled {
            "cancelled"
        } else if stage_ok {
            "success"
        } else {
            "failure"
        };
        metrics::counter!(
            metric_names::STAGES_EXECUTED_TOTAL,
            metric_names::LABEL_TOOL => stage.tool.as_str(),
            metric_names::LABEL_RESULT => result_label
        )
        .increment(1);

        if cancelled {
            break;
        }
        if !stage_ok {
            failed += 1;
            if stage.critical {
                critical_failed = true;
                break;
            }
        }
    }

    let status = if cancelled {
        ScanStatus::Cancelled
    } else if critical_failed {
        ScanStatus::Failed
    } else if executed > 0 && failed == executed {
        ScanStatus::Failed
    } else {
        ScanStatus::Completed
    };
    Ok(status)
}

fn record_findings(tool: &'static str, normalized: &Normalized) {
    if normalized.parse_errors > 0 {
        metrics::counter!(
            metric_names::PARSE_ERRORS_TOTAL,
            metric_names::LABEL_TOOL => tool
        )
        .increment(normalized.parse_errors as u64);
    }
    for finding in &normalized.findings {
        metrics::counter!(
            metric_names::FINDINGS_TOTAL,
            metric_names::LABEL_TOOL => tool,
            metric_names::LABEL_SEVERITY => finding.severity.as_str()
        )
        .increment(1);
    }
}

/// 터미널 전이: 권고 도출 → 저장 → `recommendations` → 최종 `scan_update`
async fn finalize(
    inner: &Inner,
    scan_id: &str,
    target: &str,
    kind: ScanKind,
    status: ScanStatus,
) {
    let findings = match inner.store.findings_for_scan(scan_id).await {
        Ok(findings) => findings,
        Err(err) => {
            error!(scan_id, error = %err, "failed to load findings for recommendation derivation");
            Vec::new()
        }
    };
    let finding_count = findings.len();

    let advisory = if inner.config.advisory.enabled {
        inner.advisory.as_deref()
    } else {
        None
    };
    let recommendations = pentora_advisor::derive_with_advisory(
        ScanContext {
            scan_id: scan_id.to_owned(),
            target: target.to_owned(),
            scan_kind: kind.as_str().to_owned(),
            findings,
        },
        advisory,
        inner.config.advisory.timeout(),
    )
    .await;
    metrics::counter!(metric_names::RECOMMENDATIONS_TOTAL).increment(recommendations.len() as u64);

    if let Err(err) = inner
        .store
        .add_recommendations(recommendations.clone())
        .await
    {
        error!(scan_id, error = %err, "failed to persist recommendations");
    }
    let recommendation_count = recommendations.len();
    inner
        .hub
        .broadcast(ScanEvent::Recommendations(RecommendationsEvent::new(
            scan_id,
            recommendations,
        )));

    match inner.store.get_session(scan_id).await {
        Ok(mut session) => {
            if session.status.can_transition_to(status) {
                session.status = status;
            } else if session.status != status {
                warn!(
                    scan_id,
                    from = session.status.as_str(),
                    to = status.as_str(),
                    "refusing non-monotonic status transition"
                );
            }
            session.completed_at = Some(SystemTime::now());
            if let Err(err) = inner.store.update_session(session).await {
                error!(scan_id, error = %err, "failed to persist terminal session state");
            }
        }
        Err(err) => error!(scan_id, error = %err, "session disappeared before terminal update"),
    }

    inner
        .hub
        .broadcast(ScanEvent::ScanUpdate(
            ScanUpdateEvent::new(scan_id, status).with_data(serde_json::json!({
                "findings": finding_count,
                "recommendations": recommendation_count,
            })),
        ));

    let scan_metric = match status {
        ScanStatus::Completed => Some(metric_names::SCANS_COMPLETED_TOTAL),
        ScanStatus::Failed => Some(metric_names::SCANS_FAILED_TOTAL),
        ScanStatus::Cancelled => Some(metric_names::SCANS_CANCELLED_TOTAL),
        ScanStatus::Pending | ScanStatus::Running => None,
    };
    if let Some(name) = scan_metric {
        metrics::counter!(name, metric_names::LABEL_SCAN_KIND => kind.as_str()).increment(1);
    }

    info!(
        scan_id,
        status = status.as_str(),
        findings = finding_count,
        recommendations = recommendation_count,
        "scan finished"
    );
}
