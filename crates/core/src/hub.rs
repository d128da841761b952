//! 브로드캐스트 허브 — 스캔 이벤트의 구독자 fan-out
//!
//! 오케스트레이터가 발행한 [`ScanEvent`]를 등록된 모든 구독자에게
//! 전달합니다. 전달은 at-most-once이며 과거 이벤트 재전송은 없습니다.
//! 한 구독자의 수신 실패(종료 또는 버퍼 가득 참)는 해당 구독자 제거로
//! 이어질 뿐 다른 구독자 전달을 막지 않습니다.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::event::ScanEvent;
use crate::metrics as metric_names;

/// 구독자 식별자
pub type SubscriberId = u64;

/// 기본 구독자 채널 용량
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

#[derive(Debug)]
struct HubInner {
    subscribers: HashMap<SubscriberId, mpsc::Sender<ScanEvent>>,
    next_id: SubscriberId,
}

/// 스캔 이벤트 브로드캐스트 허브
///
/// clone으로 공유 가능하며 내부 구독자 목록은 뮤텍스로 보호됩니다.
/// 락은 전송 중에는 잡지 않습니다: 발송 전에 sender들을 복제해 두고
/// 락을 놓은 뒤 전달합니다.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    inner: Arc<Mutex<HubInner>>,
    capacity: usize,
}

impl BroadcastHub {
    /// 기본 채널 용량으로 허브를 생성합니다.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SUBSCRIBER_CAPACITY)
    }

    /// 구독자 채널 용량을 지정하여 허브를 생성합니다.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                subscribers: HashMap::new(),
                next_id: 0,
            })),
            capacity: capacity.max(1),
        }
    }

    /// 새 구독자를 등록하고 수신 채널을 반환합니다.
    ///
    /// 구독 시점 이후의 이벤트만 수신합니다.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<ScanEvent>) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.insert(id, tx);
        tracing::debug!(subscriber_id = id, "subscriber registered");
        (id, rx)
    }

    /// 구독자를 제거합니다. 이미 제거된 ID면 false를 반환합니다.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let removed = inner.subscribers.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber_id = id, "subscriber removed");
        }
        removed
    }

    /// 현재 구독자 수를 반환합니다.
    pub fn subscriber_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.subscribers.len()
    }

    /// 이벤트를 모든 구독자에게 전달합니다.
    ///
    /// 구독자가 없으면 아무 일도 하지 않습니다. 버퍼가 가득 찼거나
    /// 수신측이 닫힌 구독자는 제거됩니다. 전달에 성공한 구독자 수를
    /// 반환합니다.
    pub fn broadcast(&self, event: ScanEvent) -> usize {
        let targets: Vec<(SubscriberId, mpsc::Sender<ScanEvent>)> = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner
                .subscribers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        if targets.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        let mut evicted = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(
                        subscriber_id = id,
                        event_type = event.event_type(),
                        "subscriber channel full, evicting"
                    );
                    evicted.push(id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(subscriber_id = id, "subscriber channel closed, evicting");
                    evicted.push(id);
                }
            }
        }

        if !evicted.is_empty() {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            for id in &evicted {
                inner.subscribers.remove(id);
            }
        }

        metrics::counter!(metric_names::EVENTS_BROADCAST_TOTAL).increment(delivered as u64);
        metrics::counter!(metric_names::SUBSCRIBERS_EVICTED_TOTAL).increment(evicted.len() as u64);
        delivered
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
