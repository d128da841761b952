//! 오케스트레이터 통합 테스트
//!
//! 스크립트된 러너로 전체 세션 수명 주기(상태 전이, 조건부 단계,
//! 취소, 이벤트 발행, 권고 도출)를 검증합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use pentora_core::config::PentoraConfig;
use pentora_core::error::{ExecError, PentoraError};
use pentora_core::hub::BroadcastHub;
use pentora_core::ports::ToolRunner;
use pentora_core::types::{
    CommandSpec, FindingCategory, RawResult, ScanStatus, Severity, ToolKind,
};
use pentora_orchestrator::{MemoryScanStore, ScanOrchestrator, StartScanRequest};

const NMAP_XML_NO_HTTP: &str = r#"<?xml version="1.0"?>
<nmaprun scanner="nmap" version="7.94">
  <host>
    <status state="up"/>
    <address addr="10.0.0.5" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="22">
        <state state="open"/>
        <service name="ssh" product="OpenSSH"/>
      </port>
    </ports>
  </host>
</nmaprun>
"#;

const NMAP_XML_WITH_HTTP: &str = r#"<?xml version="1.0"?>
<nmaprun scanner="nmap" version="7.94">
  <host>
    <status state="up"/>
    <address addr="10.0.0.5" addrtype="ipv4"/>
    <ports>
      <port protocol="tcp" portid="22">
        <state state="open"/>
        <service name="ssh" product="OpenSSH"/>
      </port>
      <port protocol="tcp" portid="80">
        <state state="open"/>
        <service name="http" product="Apache httpd"/>
      </port>
    </ports>
  </host>
</nmaprun>
"#;

const NIKTO_OUTPUT: &str = "\
+ Server: Apache/2.4.52 (Ubuntu)
+ /search.php: Possible SQL injection in parameter q.
";

const GOBUSTER_OUTPUT: &str = "/admin (Status: 200) [Size: 1024]\n";

const HYDRA_OUTPUT: &str = "[22][ssh] host: 10.0.0.5   login: admin   password: letmein\n";

/// 도구별로 스크립트된 출력을 반환하는 러너
#[derive(Default)]
struct ScriptedRunner {
    outputs: HashMap<ToolKind, (String, i32)>,
}

impl ScriptedRunner {
    fn with(mut self, tool: ToolKind, stdout: &str, exit_code: i32) -> Self {
        self.outputs.insert(tool, (stdout.to_owned(), exit_code));
        self
    }
}

impl ToolRunner for ScriptedRunner {
    async fn execute(
        &self,
        spec: CommandSpec,
        _timeout: Duration,
        _cancel: CancellationToken,
    ) -> Result<RawResult, ExecError> {
        let (stdout, exit_code) = self
            .outputs
            .get(&spec.tool)
            .cloned()
            .unwrap_or_else(|| (String::new(), 0));
        Ok(RawResult {
            stdout,
            stderr: String::new(),
            exit_code: Some(exit_code),
            timed_out: false,
            cancelled: false,
            duration: Duration::from_millis(5),
        })
    }
}

/// 취소될 때까지 대기하는 러너 (stop_scan 테스트용)
struct BlockingRunner;

impl ToolRunner for BlockingRunner {
    async fn execute(
        &self,
        _spec: CommandSpec,
        _timeout: Duration,
        cancel: CancellationToken,
    ) -> Result<RawResult, ExecError> {
        cancel.cancelled().await;
        Ok(RawResult {
            stdout: "partial".to_owned(),
            stderr: String::new(),
            exit_code: None,
            timed_out: false,
            cancelled: true,
            duration: Duration::from_millis(1),
        })
    }
}

fn orchestrator(runner: impl ToolRunner + 'static) -> ScanOrchestrator {
    ScanOrchestrator::new(
        PentoraConfig::default(),
        Arc::new(MemoryScanStore::new()),
        Arc::new(runner),
        BroadcastHub::new(),
    )
}

fn request(scan_kind: &str) -> StartScanRequest {
    StartScanRequest {
        name: format!("{scan_kind} scan"),
        target: "10.0.0.5".to_owned(),
        scan_kind: scan_kind.to_owned(),
        service: None,
    }
}

async fn wait_terminal(orch: &ScanOrchestrator, scan_id: &str) -> ScanStatus {
    for _ in 0..500 {
        let session = orch.get_scan(scan_id).await.unwrap();
        if session.status.is_terminal() {
            return session.status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("scan {scan_id} did not reach a terminal state");
}

#[tokio::test]
async fn comprehensive_without_http_skips_web_stages() {
    let runner = ScriptedRunner::default().with(ToolKind::Nmap, NMAP_XML_NO_HTTP, 0);
    let orch = orchestrator(runner);

    let scan_id = orch.start_scan(request("comprehensive")).await.unwrap();
    let status = wait_terminal(&orch, &scan_id).await;
    assert_eq!(status, ScanStatus::Completed);

    // 건너뛴 단계는 실행 기록을 남기지 않는다
    let executions = orch.get_executions(&scan_id).await.unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].tool, ToolKind::Nmap);
    assert_eq!(executions[0].status, ScanStatus::Completed);

    let findings = orch.get_findings(&scan_id).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, FindingCategory::ServiceExposure);
}

#[tokio::test]
async fn comprehensive_with_http_runs_full_pipeline() {
    let runner = ScriptedRunner::default()
        .with(ToolKind::Nmap, NMAP_XML_WITH_HTTP, 0)
        .with(ToolKind::Nikto, NIKTO_OUTPUT, 0)
        .with(ToolKind::Gobuster, GOBUSTER_OUTPUT, 0);
    let orch = orchestrator(runner);

    let scan_id = orch.start_scan(request("comprehensive")).await.unwrap();
    let status = wait_terminal(&orch, &scan_id).await;
    assert_eq!(status, ScanStatus::Completed);

    let executions = orch.get_executions(&scan_id).await.unwrap();
    let tools: Vec<ToolKind> = executions.iter().map(|e| e.tool).collect();
    assert_eq!(tools, vec![ToolKind::Nmap, ToolKind::Nikto, ToolKind::Gobuster]);

    // HTTP 노출 + 취약점 → 교차 도구 권고가 정확히 한 번
    let recommendations = orch.get_recommendations(&scan_id).await.unwrap();
    let deep: Vec<_> = recommendations
        .iter()
        .filter(|r| r.title == "Web Application Security Assessment")
        .collect();
    assert_eq!(deep.len(), 1);
}

#[tokio::test]
async fn events_are_broadcast_in_lifecycle_order() {
    let runner = ScriptedRunner::default().with(ToolKind::Nmap, NMAP_XML_NO_HTTP, 0);
    let orch = orchestrator(runner);
    let (_id, mut rx) = orch.hub().subscribe();

    let scan_id = orch.start_scan(request("nmap")).await.unwrap();
    wait_terminal(&orch, &scan_id).await;

    let mut types = Vec::new();
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_secs(1), rx.recv()).await
    {
        assert_eq!(event.scan_id(), scan_id);
        types.push(event.event_type().to_owned());
        if types.len() == 4 {
            break;
        }
    }
    assert_eq!(
        types,
        vec!["scan_update", "tool_output", "recommendations", "scan_update"]
    );
}

#[tokio::test]
async fn validation_failure_creates_no_session() {
    let orch = orchestrator(ScriptedRunner::default());

    let mut bad_target = request("nmap");
    bad_target.target = "10.0.0.5; rm -rf /".to_owned();
    let err = orch.start_scan(bad_target).await.unwrap_err();
    assert!(matches!(err, PentoraError::Validation(_)));

    let err = orch.start_scan(request("unknown-kind")).await.unwrap_err();
    assert!(matches!(err, PentoraError::Validation(_)));

    assert!(orch.list_scans().await.unwrap().is_empty());
}

#[tokio::test]
async fn critical_stage_failure_fails_session() {
    let runner = ScriptedRunner::default().with(ToolKind::Nmap, "", 1);
    let orch = orchestrator(runner);

    let scan_id = orch.start_scan(request("comprehensive")).await.unwrap();
    let status = wait_terminal(&orch, &scan_id).await;
    assert_eq!(status, ScanStatus::Failed);

    let executions = orch.get_executions(&scan_id).await.unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].status, ScanStatus::Failed);
}

#[tokio::test]
async fn stop_scan_cancels_running_session() {
    let orch = orchestrator(BlockingRunner);

    let scan_id = orch.start_scan(request("nmap")).await.unwrap();
    // 세션 태스크가 단계에 진입할 때까지 잠시 대기
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(orch.stop_scan(&scan_id).await);
    let session = orch.get_scan(&scan_id).await.unwrap();
    assert_eq!(session.status, ScanStatus::Cancelled);

    // 이미 종료된 세션에 대한 중지는 false
    assert!(!orch.stop_scan(&scan_id).await);
    assert!(!orch.stop_scan("no-such-scan").await);
}

#[tokio::test]
async fn hydra_success_yields_weak_credential_pair() {
    let runner = ScriptedRunner::default().with(ToolKind::Hydra, HYDRA_OUTPUT, 0);
    let orch = orchestrator(runner);

    let scan_id = orch.start_scan(request("hydra")).await.unwrap();
    let status = wait_terminal(&orch, &scan_id).await;
    assert_eq!(status, ScanStatus::Completed);

    let findings = orch.get_findings(&scan_id).await.unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, FindingCategory::WeakCredential);
    assert_eq!(findings[0].severity, Severity::Critical);

    let recommendations = orch.get_recommendations(&scan_id).await.unwrap();
    let titles: Vec<&str> = recommendations.iter().map(|r| r.title.as_str()).collect();
    assert!(titles.contains(&"Weak Credentials Found"));
    assert!(titles.contains(&"SSH Security Hardening"));
}

#[tokio::test]
async fn delete_scan_is_refused_while_running() {
    let orch = orchestrator(BlockingRunner);

    let scan_id = orch.start_scan(request("nmap")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = orch.delete_scan(&scan_id).await.unwrap_err();
    assert!(matches!(err, PentoraError::Store(_)));

    orch.stop_scan(&scan_id).await;
    orch.delete_scan(&scan_id).await.unwrap();
    assert!(orch.get_scan(&scan_id).await.is_err());
}

#[tokio::test]
async fn concurrency_limit_is_enforced() {
    let mut config = PentoraConfig::default();
    config.scan.max_concurrent_scans = 1;
    let orch = ScanOrchestrator::new(
        config,
        Arc::new(MemoryScanStore::new()),
        Arc::new(BlockingRunner),
        BroadcastHub::new(),
    );

    let first = orch.start_scan(request("nmap")).await.unwrap();
    let err = orch.start_scan(request("nikto")).await.unwrap_err();
    assert!(matches!(err, PentoraError::Busy { limit: 1 }));

    orch.stop_scan(&first).await;
    // 자리가 나면 다시 받을 수 있다
    let second = orch.start_scan(request("nikto")).await.unwrap();
    orch.stop_scan(&second).await;
}

#[tokio::test]
async fn dropped_subscriber_does_not_affect_scan_completion() {
    let runner = ScriptedRunner::default().with(ToolKind::Nmap, NMAP_XML_NO_HTTP, 0);
    let orch = orchestrator(runner);

    let (_id, rx) = orch.hub().subscribe();
    drop(rx);
    let (_alive_id, mut alive_rx) = orch.hub().subscribe();

    let scan_id = orch.start_scan(request("nmap")).await.unwrap();
    let status = wait_terminal(&orch, &scan_id).await;
    assert_eq!(status, ScanStatus::Completed);

    // 죽은 구독자는 제거되고 살아있는 구독자는 계속 수신한다
    let event = tokio::time::timeout(Duration::from_secs(1), alive_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.scan_id(), scan_id);
    assert_eq!(orch.hub().subscriber_count(), 1);
}

#[tokio::test]
async fn cancelled_scan_keeps_partial_results() {
    let orch = orchestrator(BlockingRunner);

    let scan_id = orch.start_scan(request("nikto")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(orch.stop_scan(&scan_id).await);

    // 중단 시점까지의 실행 기록과 부분 출력이 남는다
    let executions = orch.get_executions(&scan_id).await.unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0].status, ScanStatus::Cancelled);
    assert_eq!(executions[0].stdout, "partial");
}
