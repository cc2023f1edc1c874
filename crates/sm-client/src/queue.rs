//! Session-update delivery queue.
//!
//! Study screens hand finished sessions to [`SessionUpdateQueue::enqueue`]
//! and move on; saving must never block the UI. The queue delivers updates
//! to the backend strictly in submission order, one in flight at a time:
//!
//! - delivered → head removed, next attempted;
//! - rejected by the server (non-success status) → logged and dropped,
//!   next attempted (at-most-once, best-effort);
//! - transport failure or timeout → delivery halts with the head retained;
//!   it resumes on the next enqueue or an explicit [`retry_pending`] call.
//!
//! Known limitation, kept deliberately: a transient failure at the head
//! blocks everything queued behind it until delivery is re-armed, and the
//! pending list is unbounded and memory-only — updates not yet flushed when
//! the process exits are lost.
//!
//! [`retry_pending`]: SessionUpdateQueue::retry_pending

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sm_api_types::PerformanceUpdate;
use tokio::sync::Notify;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected at enqueue time: the update has no user identifier.
///
/// This is the only error a caller ever sees from the queue; all
/// delivery-time failures are absorbed internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid update: userId is required")]
pub struct InvalidUpdate;

/// Outcome classification for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Network-level failure (unreachable, reset, timeout). The update is
    /// retained at the head of the queue for a later retry.
    #[error("transient delivery failure: {0}")]
    Transient(String),

    /// The endpoint was reachable but refused the payload. Terminal for
    /// this update; it is logged and dropped.
    #[error("rejected by server (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// One delivery attempt to the persistence endpoint.
///
/// Production code uses [`crate::TutorClient`]; tests substitute
/// [`MockTransport`].
#[async_trait::async_trait]
pub trait UpdateTransport: Send + Sync {
    async fn deliver(&self, update: &PerformanceUpdate) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Upper bound on a single delivery attempt; expiry counts as a
    /// transient failure. There is no overall deadline across retries.
    pub delivery_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Pending list and in-flight flag, guarded together: the check-and-set on
/// `in_flight` must be indivisible with respect to concurrent enqueues.
#[derive(Debug)]
struct Inner {
    pending: VecDeque<PerformanceUpdate>,
    in_flight: bool,
}

/// FIFO delivery queue for study-session performance updates.
///
/// Construct one instance at application start and share it by reference;
/// `enqueue` is synchronous and never suspends, so it can be called from
/// any context inside a tokio runtime.
pub struct SessionUpdateQueue {
    config: QueueConfig,
    transport: Arc<dyn UpdateTransport>,
    inner: Arc<Mutex<Inner>>,
    /// Signalled whenever the delivery task exits (drained or halted).
    settled: Arc<Notify>,
}

impl SessionUpdateQueue {
    pub fn new(transport: Arc<dyn UpdateTransport>, config: QueueConfig) -> Self {
        Self {
            config,
            transport,
            inner: Arc::new(Mutex::new(Inner {
                pending: VecDeque::new(),
                in_flight: false,
            })),
            settled: Arc::new(Notify::new()),
        }
    }

    /// Submit an update for delivery. Fire-and-forget: the eventual
    /// delivery outcome is not reported back.
    ///
    /// Fails synchronously with [`InvalidUpdate`] when `user_id` is
    /// missing; nothing is queued in that case.
    pub fn enqueue(&self, update: PerformanceUpdate) -> Result<(), InvalidUpdate> {
        if !update.has_user_id() {
            return Err(InvalidUpdate);
        }

        let start_delivery = {
            let mut guard = self.inner.lock().expect("queue mutex poisoned");
            guard.pending.push_back(update);
            if guard.in_flight {
                false
            } else {
                guard.in_flight = true;
                true
            }
        };

        if start_delivery {
            self.spawn_drain();
        }
        Ok(())
    }

    /// Resume delivery at the current head if the queue is idle and
    /// non-empty. No-op while a delivery is already in progress or when
    /// there is nothing pending.
    pub fn retry_pending(&self) {
        let start_delivery = {
            let mut guard = self.inner.lock().expect("queue mutex poisoned");
            if guard.in_flight || guard.pending.is_empty() {
                false
            } else {
                guard.in_flight = true;
                true
            }
        };

        if start_delivery {
            debug!("retrying pending session updates");
            self.spawn_drain();
        }
    }

    /// Number of updates awaiting delivery (including any in flight).
    pub fn pending_len(&self) -> usize {
        self.inner.lock().expect("queue mutex poisoned").pending.len()
    }

    /// True when no delivery task is running.
    pub fn is_idle(&self) -> bool {
        !self.inner.lock().expect("queue mutex poisoned").in_flight
    }

    /// Wait until the delivery task has stopped — either because the queue
    /// drained or because it halted on a transient failure. Pending items
    /// may remain afterwards (halted case).
    pub async fn wait_idle(&self) {
        loop {
            let settled = self.settled.notified();
            if self.is_idle() {
                return;
            }
            settled.await;
        }
    }

    fn spawn_drain(&self) {
        let inner = Arc::clone(&self.inner);
        let transport = Arc::clone(&self.transport);
        let settled = Arc::clone(&self.settled);
        let timeout = self.config.delivery_timeout;
        tokio::spawn(async move {
            drain(inner, transport, timeout).await;
            settled.notify_waiters();
        });
    }
}

/// Delivery loop: runs until the queue drains or a transient failure halts
/// it. Exactly one instance runs at a time, enforced by `Inner::in_flight`.
async fn drain(
    inner: Arc<Mutex<Inner>>,
    transport: Arc<dyn UpdateTransport>,
    timeout: Duration,
) {
    loop {
        // Peek without removing: the head only leaves the queue on a
        // terminal outcome for it.
        let head = {
            let mut guard = inner.lock().expect("queue mutex poisoned");
            match guard.pending.front() {
                Some(update) => update.clone(),
                None => {
                    guard.in_flight = false;
                    return;
                }
            }
        };

        let attempt = tokio::time::timeout(timeout, transport.deliver(&head)).await;

        match attempt {
            Ok(Ok(())) => {
                debug!(user = %head.user_id, "session update delivered");
                inner.lock().expect("queue mutex poisoned").pending.pop_front();
            }
            Ok(Err(DeliveryError::Rejected { status, message })) => {
                // At-most-once: a rejected update is abandoned so it cannot
                // wedge the queue behind a payload the server will never take.
                warn!(
                    user = %head.user_id,
                    status,
                    message = %message,
                    "session update rejected by server — dropping"
                );
                inner.lock().expect("queue mutex poisoned").pending.pop_front();
            }
            Ok(Err(DeliveryError::Transient(reason))) => {
                let mut guard = inner.lock().expect("queue mutex poisoned");
                guard.in_flight = false;
                warn!(
                    user = %head.user_id,
                    pending = guard.pending.len(),
                    reason = %reason,
                    "delivery halted; updates held until next enqueue or retry"
                );
                return;
            }
            Err(_elapsed) => {
                let mut guard = inner.lock().expect("queue mutex poisoned");
                guard.in_flight = false;
                warn!(
                    user = %head.user_id,
                    pending = guard.pending.len(),
                    timeout_secs = timeout.as_secs(),
                    "delivery attempt timed out; updates held until next enqueue or retry"
                );
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// Scripted transport for tests.
///
/// Each delivery attempt pops the next scripted outcome; an empty script
/// means success. Delivered updates are recorded for assertions.
pub struct MockTransport {
    outcomes: Mutex<VecDeque<MockOutcome>>,
    delivered: Mutex<Vec<PerformanceUpdate>>,
    attempts: Mutex<u64>,
}

enum MockOutcome {
    Ready(Result<(), DeliveryError>),
    /// Never resolves within any reasonable test timeout.
    Hang,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            delivered: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
        }
    }

    /// Script a successful delivery.
    pub fn then_ok(self) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Ready(Ok(())));
        self
    }

    /// Script a transient (retryable) failure.
    pub fn then_transient(self, reason: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Ready(Err(DeliveryError::Transient(
                reason.to_string(),
            ))));
        self
    }

    /// Script a server-side rejection.
    pub fn then_rejected(self, status: u16) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Ready(Err(DeliveryError::Rejected {
                status,
                message: "rejected".to_string(),
            })));
        self
    }

    /// Script an attempt that never completes (forces the queue timeout).
    pub fn then_hang(self) -> Self {
        self.outcomes.lock().unwrap().push_back(MockOutcome::Hang);
        self
    }

    /// Updates the backend acknowledged, in delivery order.
    pub fn delivered(&self) -> Vec<PerformanceUpdate> {
        self.delivered.lock().unwrap().clone()
    }

    /// Total delivery attempts observed (including failed ones).
    pub fn attempts(&self) -> u64 {
        *self.attempts.lock().unwrap()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UpdateTransport for MockTransport {
    async fn deliver(&self, update: &PerformanceUpdate) -> Result<(), DeliveryError> {
        *self.attempts.lock().unwrap() += 1;
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockOutcome::Ready(Ok(())));
        match outcome {
            MockOutcome::Ready(Ok(())) => {
                self.delivered.lock().unwrap().push(update.clone());
                Ok(())
            }
            MockOutcome::Ready(err) => err,
            MockOutcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(DeliveryError::Transient("unreachable".to_string()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn update(user: &str, topic: &str) -> PerformanceUpdate {
        PerformanceUpdate {
            user_id: user.to_string(),
            topic: Some(topic.to_string()),
            ..Default::default()
        }
    }

    fn queue_with(transport: Arc<MockTransport>) -> SessionUpdateQueue {
        SessionUpdateQueue::new(
            transport,
            QueueConfig {
                delivery_timeout: Duration::from_millis(200),
            },
        )
    }

    #[tokio::test]
    async fn missing_user_id_is_rejected_synchronously() {
        let transport = Arc::new(MockTransport::new());
        let queue = queue_with(Arc::clone(&transport));

        assert_eq!(queue.enqueue(PerformanceUpdate::default()), Err(InvalidUpdate));
        assert_eq!(queue.pending_len(), 0);
        queue.wait_idle().await;
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test]
    async fn delivers_in_submission_order() {
        let transport = Arc::new(MockTransport::new());
        let queue = queue_with(Arc::clone(&transport));

        for i in 0..5 {
            queue.enqueue(update("u1", &format!("t{i}"))).unwrap();
        }
        queue.wait_idle().await;

        assert_eq!(queue.pending_len(), 0);
        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 5);
        for (i, u) in delivered.iter().enumerate() {
            assert_eq!(u.topic.as_deref(), Some(format!("t{i}").as_str()));
        }
    }

    #[tokio::test]
    async fn transient_failure_halts_and_retains_in_order() {
        let transport = Arc::new(MockTransport::new().then_transient("connection reset"));
        let queue = queue_with(Arc::clone(&transport));

        queue.enqueue(update("u1", "first")).unwrap();
        queue.wait_idle().await;

        // Head retained, nothing delivered, no further attempts on its own.
        assert_eq!(queue.pending_len(), 1);
        assert_eq!(transport.attempts(), 1);
        assert!(transport.delivered().is_empty());

        // Manual retry resumes at the head and drains.
        queue.retry_pending();
        queue.wait_idle().await;
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(transport.delivered()[0].topic.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn rejection_drops_head_and_continues() {
        let transport = Arc::new(MockTransport::new().then_rejected(422));
        let queue = queue_with(Arc::clone(&transport));

        queue.enqueue(update("u1", "bad")).unwrap();
        queue.enqueue(update("u1", "good")).unwrap();
        queue.wait_idle().await;

        assert_eq!(queue.pending_len(), 0);
        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].topic.as_deref(), Some("good"));
        // The rejected update was attempted exactly once.
        assert_eq!(transport.attempts(), 2);
    }

    #[tokio::test]
    async fn timeout_counts_as_transient() {
        let transport = Arc::new(MockTransport::new().then_hang());
        let queue = queue_with(Arc::clone(&transport));

        queue.enqueue(update("u1", "slow")).unwrap();
        queue.wait_idle().await;

        assert_eq!(queue.pending_len(), 1);
        assert!(transport.delivered().is_empty());

        queue.retry_pending();
        queue.wait_idle().await;
        assert_eq!(queue.pending_len(), 0);
    }

    #[tokio::test]
    async fn halted_head_blocks_later_updates_until_retry() {
        let transport = Arc::new(MockTransport::new().then_transient("offline"));
        let queue = queue_with(Arc::clone(&transport));

        queue.enqueue(update("u1", "k")).unwrap();
        queue.wait_idle().await;

        // Enqueued while halted: waits behind the blocked head, and the
        // fresh enqueue re-arms delivery.
        queue.enqueue(update("u1", "k+1")).unwrap();
        queue.wait_idle().await;

        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].topic.as_deref(), Some("k"));
        assert_eq!(delivered[1].topic.as_deref(), Some("k+1"));
    }

    #[tokio::test]
    async fn retry_is_noop_when_empty_or_busy() {
        let transport = Arc::new(MockTransport::new());
        let queue = queue_with(Arc::clone(&transport));

        // Empty queue: nothing happens.
        queue.retry_pending();
        queue.wait_idle().await;
        assert_eq!(transport.attempts(), 0);

        // Busy queue: retry while a delivery is hung must not start a
        // second delivery process.
        let transport = Arc::new(MockTransport::new().then_hang());
        let queue = queue_with(Arc::clone(&transport));
        queue.enqueue(update("u1", "t")).unwrap();
        queue.retry_pending();
        queue.retry_pending();
        queue.wait_idle().await;
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn concurrent_enqueues_keep_single_delivery_in_flight() {
        let transport = Arc::new(MockTransport::new());
        let queue = Arc::new(queue_with(Arc::clone(&transport)));

        let mut handles = Vec::new();
        for i in 0..20 {
            let q = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                q.enqueue(update("u1", &format!("t{i}"))).unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        queue.wait_idle().await;

        // Every update delivered exactly once; MockTransport would have
        // interleaved records if two drains ever ran concurrently.
        assert_eq!(queue.pending_len(), 0);
        assert_eq!(transport.delivered().len(), 20);
        assert_eq!(transport.attempts(), 20);
    }

    #[tokio::test]
    async fn timeout_then_manual_retry_preserves_order() {
        // First attempt times out, everything succeeds after retry.
        let transport = Arc::new(MockTransport::new().then_hang());
        let queue = queue_with(Arc::clone(&transport));

        let first = PerformanceUpdate::from_json(serde_json::json!({
            "userId": "u1",
            "sessionData": {"cardsStudied": 5, "correctAnswers": 3, "timeSpent": "42"},
        }))
        .unwrap();
        // timeSpent arrived as a string but is transmitted as a number.
        assert!((first.session_data.time_spent - 42.0).abs() < f64::EPSILON);

        queue.enqueue(first).unwrap();
        queue.enqueue(update("u1", "second")).unwrap();
        queue.wait_idle().await;

        // First update still heads the queue until a manual retry.
        assert_eq!(queue.pending_len(), 2);
        assert!(transport.delivered().is_empty());

        queue.retry_pending();
        queue.wait_idle().await;

        let delivered = transport.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].session_data.cards_studied, 5);
        assert_eq!(delivered[1].topic.as_deref(), Some("second"));
    }
}
