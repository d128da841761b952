//! 포트 trait — 오케스트레이터와 외부 세계의 경계
//!
//! [`ScanStore`](영속성), [`ToolRunner`](프로세스 실행),
//! [`AdvisoryPort`](외부 분석)를 정의합니다. 각 trait은 RPITIT을 사용하므로
//! `dyn` 사용이 불가하며, `BoxFuture`를 반환하는 `Dyn*` 대응 trait이
//! 자동 구현되어 `Arc<dyn Dyn*>`으로 조합할 수 있습니다.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AdvisoryError, ExecError, StoreError};
use crate::types::{
    AdvisoryResult, CommandSpec, Finding, RawResult, Recommendation, ScanContext, ScanSession,
    ToolExecution,
};

/// dyn-compatible trait이 반환하는 박싱된 Future 타입
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// ─── ScanStore ───────────────────────────────────────────────────────

/// 스캔 데이터 영속성 포트
///
/// 세션, 실행 기록, 발견 사항, 권고의 저장과 조회를 담당합니다.
/// 인메모리 구현이 기본 제공되며 내구성 있는 백엔드는 이 포트 뒤에
/// 구현합니다.
pub trait ScanStore: Send + Sync {
    /// 새 스캔 세션을 저장합니다.
    fn create_session(
        &self,
        session: ScanSession,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 세션을 갱신합니다. 존재하지 않으면 `NotFound`.
    fn update_session(
        &self,
        session: ScanSession,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// ID로 세션을 조회합니다.
    fn get_session(
        &self,
        scan_id: &str,
    ) -> impl Future<Output = Result<ScanSession, StoreError>> + Send;

    /// 모든 세션을 생성 시각 순으로 반환합니다.
    fn list_sessions(&self) -> impl Future<Output = Result<Vec<ScanSession>, StoreError>> + Send;

    /// 도구 실행 기록을 저장합니다.
    fn create_execution(
        &self,
        execution: ToolExecution,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 도구 실행 기록을 갱신합니다. 존재하지 않으면 `NotFound`.
    fn update_execution(
        &self,
        execution: ToolExecution,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 세션의 실행 기록을 생성 순으로 반환합니다.
    fn executions_for_scan(
        &self,
        scan_id: &str,
    ) -> impl Future<Output = Result<Vec<ToolExecution>, StoreError>> + Send;

    /// 발견 사항을 일괄 추가합니다.
    fn add_findings(
        &self,
        findings: Vec<Finding>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 세션의 발견 사항을 반환합니다.
    fn findings_for_scan(
        &self,
        scan_id: &str,
    ) -> impl Future<Output = Result<Vec<Finding>, StoreError>> + Send;

    /// 권고를 일괄 추가합니다.
    fn add_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// 세션의 권고를 반환합니다.
    fn recommendations_for_scan(
        &self,
        scan_id: &str,
    ) -> impl Future<Output = Result<Vec<Recommendation>, StoreError>> + Send;

    /// 세션과 그에 속한 실행, 발견 사항, 권고를 모두 삭제합니다.
    fn delete_scan(&self, scan_id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// dyn-compatible 스캔 저장소 trait
///
/// `ScanStore`는 RPITIT을 사용하므로 `dyn ScanStore`가 불가합니다.
/// `DynScanStore`는 `BoxFuture`를 반환하여 `Arc<dyn DynScanStore>`로
/// 저장소를 주입할 수 있게 합니다.
pub trait DynScanStore: Send + Sync {
    fn create_session(&self, session: ScanSession) -> BoxFuture<'_, Result<(), StoreError>>;
    fn update_session(&self, session: ScanSession) -> BoxFuture<'_, Result<(), StoreError>>;
    fn get_session<'a>(&'a self, scan_id: &'a str)
    -> BoxFuture<'a, Result<ScanSession, StoreError>>;
    fn list_sessions(&self) -> BoxFuture<'_, Result<Vec<ScanSession>, StoreError>>;
    fn create_execution(&self, execution: ToolExecution) -> BoxFuture<'_, Result<(), StoreError>>;
    fn update_execution(&self, execution: ToolExecution) -> BoxFuture<'_, Result<(), StoreError>>;
    fn executions_for_scan<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ToolExecution>, StoreError>>;
    fn add_findings(&self, findings: Vec<Finding>) -> BoxFuture<'_, Result<(), StoreError>>;
    fn findings_for_scan<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Finding>, StoreError>>;
    fn add_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;
    fn recommendations_for_scan<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Recommendation>, StoreError>>;
    fn delete_scan<'a>(&'a self, scan_id: &'a str) -> BoxFuture<'a, Result<(), StoreError>>;
}

/// ScanStore를 구현한 타입은 자동으로 DynScanStore도 구현됩니다.
impl<T: ScanStore> DynScanStore for T {
    fn create_session(&self, session: ScanSession) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(ScanStore::create_session(self, session))
    }

    fn update_session(&self, session: ScanSession) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(ScanStore::update_session(self, session))
    }

    fn get_session<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<ScanSession, StoreError>> {
        Box::pin(ScanStore::get_session(self, scan_id))
    }

    fn list_sessions(&self) -> BoxFuture<'_, Result<Vec<ScanSession>, StoreError>> {
        Box::pin(ScanStore::list_sessions(self))
    }

    fn create_execution(&self, execution: ToolExecution) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(ScanStore::create_execution(self, execution))
    }

    fn update_execution(&self, execution: ToolExecution) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(ScanStore::update_execution(self, execution))
    }

    fn executions_for_scan<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ToolExecution>, StoreError>> {
        Box::pin(ScanStore::executions_for_scan(self, scan_id))
    }

    fn add_findings(&self, findings: Vec<Finding>) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(ScanStore::add_findings(self, findings))
    }

    fn findings_for_scan<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Finding>, StoreError>> {
        Box::pin(ScanStore::findings_for_scan(self, scan_id))
    }

    fn add_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(ScanStore::add_recommendations(self, recommendations))
    }

    fn recommendations_for_scan<'a>(
        &'a self,
        scan_id: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Recommendation>, StoreError>> {
        Box::pin(ScanStore::recommendations_for_scan(self, scan_id))
    }

    fn delete_scan<'a>(&'a self, scan_id: &'a str) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(ScanStore::delete_scan(self, scan_id))
    }
}

// ─── ToolRunner ──────────────────────────────────────────────────────

/// 도구 실행 포트
///
/// 명령 명세를 받아 서브프로세스를 실행하고 태그된 [`RawResult`]를
/// 반환합니다. 타임아웃과 취소는 실패가 아닌 결과 플래그로 전달되며,
/// `Err`는 프로세스를 시작조차 못한 경우에만 반환됩니다.
pub trait ToolRunner: Send + Sync {
    /// 명령을 실행합니다.
    ///
    /// `timeout`이 지나거나 `cancel`이 발동하면 프로세스 그룹 전체를
    /// 종료하고 그때까지의 부분 출력을 담아 반환합니다.
    fn execute(
        &self,
        spec: CommandSpec,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<RawResult, ExecError>> + Send;
}

/// dyn-compatible 도구 실행 trait
pub trait DynToolRunner: Send + Sync {
    fn execute(
        &self,
        spec: CommandSpec,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<RawResult, ExecError>>;
}

/// ToolRunner를 구현한 타입은 자동으로 DynToolRunner도 구현됩니다.
impl<T: ToolRunner> DynToolRunner for T {
    fn execute(
        &self,
        spec: CommandSpec,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> BoxFuture<'_, Result<RawResult, ExecError>> {
        Box::pin(ToolRunner::execute(self, spec, timeout, cancel))
    }
}

// ─── AdvisoryPort ────────────────────────────────────────────────────

/// 외부 분석 서비스 포트
///
/// 스캔 요약을 전달하고 보강 권고를 받습니다. 이 포트의 실패는
/// 결정적 권고 도출에 영향을 주지 않습니다.
pub trait AdvisoryPort: Send + Sync {
    /// 스캔 컨텍스트를 분석하여 보강 결과를 반환합니다.
    fn analyze(
        &self,
        context: ScanContext,
    ) -> impl Future<Output = Result<AdvisoryResult, AdvisoryError>> + Send;
}

/// dyn-compatible 외부 분석 trait
pub trait DynAdvisoryPort: Send + Sync {
    fn analyze(&self, context: ScanContext)
    -> BoxFuture<'_, Result<AdvisoryResult, AdvisoryError>>;
}

/// AdvisoryPort를 구현한 타입은 자동으로 DynAdvisoryPort도 구현됩니다.
impl<T: AdvisoryPort> DynAdvisoryPort for T {
    fn analyze(
        &self,
        context: ScanContext,
    ) -> BoxFuture<'_, Result<AdvisoryResult, AdvisoryError>> {
        Box::pin(AdvisoryPort::analyze(self, context))
    }
}
