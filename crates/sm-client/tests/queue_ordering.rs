//! Ordering and failure-semantics tests for the session-update queue,
//! driven through the public API with a scripted transport.

use std::sync::Arc;
use std::time::Duration;

use sm_api_types::PerformanceUpdate;
use sm_client::{InvalidUpdate, MockTransport, QueueConfig, SessionUpdateQueue};

fn update(topic: &str) -> PerformanceUpdate {
    PerformanceUpdate {
        user_id: "u1".into(),
        topic: Some(topic.into()),
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

fn delivered_topics(transport: &MockTransport) -> Vec<String> {
    transport
        .delivered()
        .into_iter()
        .map(|u| u.topic.unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn mid_sequence_rejection_skips_only_that_update() {
    // Third of five is rejected; the rest deliver in order.
    let transport = Arc::new(
        MockTransport::new()
            .then_ok()
            .then_ok()
            .then_rejected(400)
            .then_ok()
            .then_ok(),
    );
    let queue = queue_with(Arc::clone(&transport));

    for t in ["a", "b", "c", "d", "e"] {
        queue.enqueue(update(t)).unwrap();
    }
    queue.wait_idle().await;

    assert_eq!(queue.pending_len(), 0);
    assert_eq!(delivered_topics(&transport), ["a", "b", "d", "e"]);
    // The rejected update got exactly one attempt and was never retried.
    assert_eq!(transport.attempts(), 5);
}

#[tokio::test]
async fn transient_failure_mid_sequence_blocks_the_tail() {
    let transport = Arc::new(MockTransport::new().then_ok().then_transient("offline"));
    let queue = queue_with(Arc::clone(&transport));

    for t in ["a", "b", "c", "d"] {
        queue.enqueue(update(t)).unwrap();
    }
    queue.wait_idle().await;

    // "a" delivered; "b" failed transiently and heads the retained tail.
    assert_eq!(delivered_topics(&transport), ["a"]);
    assert_eq!(queue.pending_len(), 3);
    assert_eq!(transport.attempts(), 2);

    // Retry resumes at "b" and drains the rest in original order.
    queue.retry_pending();
    queue.wait_idle().await;
    assert_eq!(queue.pending_len(), 0);
    assert_eq!(delivered_topics(&transport), ["a", "b", "c", "d"]);
}

#[tokio::test]
async fn invalid_update_leaves_pending_work_untouched() {
    let transport = Arc::new(MockTransport::new().then_transient("offline"));
    let queue = queue_with(Arc::clone(&transport));

    queue.enqueue(update("held")).unwrap();
    queue.wait_idle().await;
    assert_eq!(queue.pending_len(), 1);

    // A rejected submission neither queues nor re-arms delivery.
    assert_eq!(queue.enqueue(PerformanceUpdate::default()), Err(InvalidUpdate));
    assert_eq!(queue.pending_len(), 1);
    assert!(queue.is_idle());
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test]
async fn repeated_transient_failures_keep_the_same_head() {
    let transport = Arc::new(
        MockTransport::new()
            .then_transient("try 1")
            .then_transient("try 2")
            .then_ok(),
    );
    let queue = queue_with(Arc::clone(&transport));

    queue.enqueue(update("stubborn")).unwrap();
    queue.wait_idle().await;
    assert_eq!(queue.pending_len(), 1);

    queue.retry_pending();
    queue.wait_idle().await;
    assert_eq!(queue.pending_len(), 1);

    queue.retry_pending();
    queue.wait_idle().await;
    assert_eq!(queue.pending_len(), 0);
    assert_eq!(delivered_topics(&transport), ["stubborn"]);
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test]
async fn large_burst_preserves_submission_order() {
    let transport = Arc::new(MockTransport::new());
    let queue = queue_with(Arc::clone(&transport));

    let topics: Vec<String> = (0..100).map(|i| format!("t{i:03}")).collect();
    for t in &topics {
        queue.enqueue(update(t)).unwrap();
    }
    queue.wait_idle().await;

    assert_eq!(delivered_topics(&transport), topics);
}
