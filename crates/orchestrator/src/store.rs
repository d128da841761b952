//! 인메모리 스캔 저장소
//!
//! [`pentora_core::ports::ScanStore`]의 기본 구현입니다. 데몬과 테스트가
//! 사용하며, 내구성 있는 백엔드는 같은 포트 뒤에 별도로 구현합니다.

use std::collections::HashMap;

use tokio::sync::RwLock;

use pentora_core::error::StoreError;
use pentora_core::ports::ScanStore;
use pentora_core::types::{Finding, Recommendation, ScanSession, ToolExecution};

#[derive(Debug, Default)]
struct StoreInner {
    sessions: HashMap<String, ScanSession>,
    /// 세션 생성 순서 (list_sessions 정렬용)
    session_order: Vec<String>,
    executions: HashMap<String, ToolExecution>,
    execution_order: Vec<String>,
    findings: Vec<Finding>,
    recommendations: Vec<Recommendation>,
}

/// RwLock으로 보호되는 인메모리 저장소
#[derive(Debug, Default)]
pub struct MemoryScanStore {
    inner: RwLock<StoreInner>,
}

impl MemoryScanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScanStore for MemoryScanStore {
    async fn create_session(&self, session: ScanSession) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.sessions.contains_key(&session.id) {
            return Err(StoreError::Conflict {
                entity: "scan_session",
                id: session.id,
                reason: "session already exists".to_owned(),
            });
        }
        inner.session_order.push(session.id.clone());
        inner.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn update_session(&self, session: ScanSession) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(&session.id) {
            return Err(StoreError::NotFound {
                entity: "scan_session",
                id: session.id,
            });
        }
        inner.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get_session(&self, scan_id: &str) -> Result<ScanSession, StoreError> {
        let inner = self.inner.read().await;
        inner
            .sessions
            .get(scan_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "scan_session",
                id: scan_id.to_owned(),
            })
    }

    async fn list_sessions(&self) -> Result<Vec<ScanSession>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .session_order
            .iter()
            .filter_map(|id| inner.sessions.get(id).cloned())
            .collect())
    }

    async fn create_execution(&self, execution: ToolExecution) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.sessions.contains_key(&execution.scan_id) {
            return Err(StoreError::NotFound {
                entity: "scan_session",
                id: execution.scan_id,
            });
        }
        inner.execution_order.push(execution.id.clone());
        inner.executions.insert(execution.id.clone(), execution);
        Ok(())
    }

    async fn update_execution(&self, execution: ToolExecution) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.executions.contains_key(&execution.id) {
            return Err(StoreError::NotFound {
                entity: "tool_execution",
                id: execution.id,
            });
        }
        inner.executions.insert(execution.id.clone(), execution);
        Ok(())
    }

    async fn executions_for_scan(&self, scan_id: &str) -> Result<Vec<ToolExecution>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .execution_order
            .iter()
            .filter_map(|id| inner.executions.get(id))
            .filter(|e| e.scan_id == scan_id)
            .cloned()
            .collect())
    }

    async fn add_findings(&self, findings: Vec<Finding>) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.findings.extend(findings);
        Ok(())
    }

    async fn findings_for_scan(&self, scan_id: &str) -> Result<Vec<Finding>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .findings
            .iter()
            .filter(|f| f.scan_id == scan_id)
            .cloned()
            .collect())
    }

    async fn add_recommendations(
        &self,
        recommendations: Vec<Recommendation>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.recommendations.extend(recommendations);
        Ok(())
    }

    async fn recommendations_for_scan(
        &self,
        scan_id: &str,
    ) -> Result<Vec<Recommendation>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .recommendations
            .iter()
            .filter(|r| r.scan_id == scan_id)
            .cloned()
            .collect())
    }

    async fn delete_scan(&self, scan_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        if inner.sessions.remove(scan_id).is_none() {
            return Err(StoreError::NotFound {
                entity: "scan_session",
                id: scan_id.to_owned(),
            });
        }
        inner.session_order.retain(|id| id != scan_id);
        inner.executions.retain(|_, e| e.scan_id != scan_id);
        let executions = &inner.executions;
        inner
            .execution_order
            .retain(|id| executions.contains_key(id));
        inner.findings.retain(|f| f.scan_id != scan_id);
        inner.recommendations.retain(|r| r.scan_id != scan_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pentora_core::types::{FindingCategory, Severity, ToolKind};

    fn session(name: &str) -> ScanSession {
        ScanSession::new(name, "10.0.0.5", "nmap")
    }

    #[tokio::test]
    async fn create_and_get_session() {
        let store = MemoryScanStore::new();
        let s = session("first");
        store.create_session(s.clone()).await.unwrap();
        let loaded = store.get_session(&s.id).await.unwrap();
        assert_eq!(loaded.name, "first");
    }

    #[tokio::test]
    async fn duplicate_create_is_conflict() {
        let store = MemoryScanStore::new();
        let s = session("dup");
        store.create_session(s.clone()).await.unwrap();
        let err = store.create_session(s).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_missing_session_is_not_found() {
        let store = MemoryScanStore::new();
        let err = store.update_session(session("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_sessions_preserves_creation_order() {
        let store = MemoryScanStore::new();
        let a = session("a");
        let b = session("b");
        store.create_session(a.clone()).await.unwrap();
        store.create_session(b.clone()).await.unwrap();
        let listed = store.list_sessions().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);
    }

    #[tokio::test]
    async fn execution_requires_existing_session() {
        let store = MemoryScanStore::new();
        let exec = ToolExecution::new("no-such-scan", ToolKind::Nmap, "nmap");
        let err = store.create_execution(exec).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn findings_are_scoped_to_scan() {
        let store = MemoryScanStore::new();
        let a = session("a");
        let b = session("b");
        store.create_session(a.clone()).await.unwrap();
        store.create_session(b.clone()).await.unwrap();

        store
            .add_findings(vec![
                Finding::new(
                    &a.id,
                    "exec-1",
                    ToolKind::Nmap,
                    FindingCategory::ServiceExposure,
                    Severity::Info,
                    "port open",
                ),
                Finding::new(
                    &b.id,
                    "exec-2",
                    ToolKind::Nikto,
                    FindingCategory::Other,
                    Severity::Low,
                    "note",
                ),
            ])
            .await
            .unwrap();

        assert_eq!(store.findings_for_scan(&a.id).await.unwrap().len(), 1);
        assert_eq!(store.findings_for_scan(&b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_scan_cascades() {
        let store = MemoryScanStore::new();
        let s = session("doomed");
        store.create_session(s.clone()).await.unwrap();
        let exec = ToolExecution::new(&s.id, ToolKind::Nmap, "nmap");
        store.create_execution(exec.clone()).await.unwrap();
        store
            .add_findings(vec![Finding::new(
                &s.id,
                &exec.id,
                ToolKind::Nmap,
                FindingCategory::ServiceExposure,
                Severity::Info,
                "port open",
            )])
            .await
            .unwrap();

        store.delete_scan(&s.id).await.unwrap();
        assert!(matches!(
            store.get_session(&s.id).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
        assert!(store.executions_for_scan(&s.id).await.unwrap().is_empty());
        assert!(store.findings_for_scan(&s.id).await.unwrap().is_empty());
    }
}
