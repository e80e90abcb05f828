// Tests for admission control, the waiting queue and lazy garbage collection
//
// Clock-driven behavior runs on a paused tokio clock and is moved forward
// with `tokio::time::advance`.

use captions_notes::{Admission, AdmissionController, AdmissionError, SessionConfig};
use std::time::Duration;
use tokio::time::advance;

fn controller(capacity: usize) -> AdmissionController {
    AdmissionController::new(SessionConfig {
        max_concurrent: capacity,
        ..SessionConfig::default()
    })
}

#[tokio::test]
async fn test_single_slot_scenario() {
    let sessions = controller(1);

    assert_eq!(sessions.reserve("A").await, Admission::Active);
    assert_eq!(
        sessions.reserve("B").await,
        Admission::Queued { position: 1, size: 1 }
    );

    sessions.remove("A").await;

    assert_eq!(sessions.reserve("B").await, Admission::Active);
    assert!(sessions.get("A").await.is_none());
    assert!(sessions.get("B").await.is_some());
}

#[tokio::test]
async fn test_reserve_is_idempotent() {
    let sessions = controller(1);

    assert_eq!(sessions.reserve("A").await, Admission::Active);
    assert_eq!(sessions.reserve("A").await, Admission::Active);

    let queued = sessions.reserve("B").await;
    assert_eq!(sessions.reserve("B").await, queued);

    let stats = sessions.stats().await;
    assert_eq!(stats.active, 1);
    assert_eq!(stats.queued, 1);
}

#[tokio::test]
async fn test_active_never_exceeds_capacity() {
    let sessions = controller(3);

    for i in 0..20 {
        sessions.reserve(&format!("client-{}", i)).await;
        // Re-reserving some clients must not change occupancy
        sessions.reserve(&format!("client-{}", i / 2)).await;

        let stats = sessions.stats().await;
        assert!(stats.active <= 3, "active {} exceeds capacity", stats.active);
    }

    let stats = sessions.stats().await;
    assert_eq!(stats.active, 3);
    assert_eq!(stats.queued, 17);
}

#[tokio::test]
async fn test_queue_positions_move_toward_front() {
    let sessions = controller(1);
    sessions.reserve("A").await;
    for id in ["B", "C", "D"] {
        sessions.reserve(id).await;
    }

    assert_eq!(sessions.reserve("D").await, Admission::Queued { position: 3, size: 3 });

    sessions.remove("A").await;
    assert_eq!(sessions.reserve("D").await, Admission::Queued { position: 2, size: 2 });

    sessions.remove("B").await;
    assert_eq!(sessions.reserve("D").await, Admission::Queued { position: 1, size: 1 });

    sessions.remove("C").await;
    assert_eq!(sessions.reserve("D").await, Admission::Active);
}

#[tokio::test]
async fn test_remove_promotes_exactly_one() {
    let sessions = controller(2);
    for id in ["A", "B", "C", "D", "E"] {
        sessions.reserve(id).await;
    }
    assert_eq!(sessions.stats().await.queued, 3);

    sessions.remove("A").await;

    let stats = sessions.stats().await;
    assert_eq!(stats.active, 2);
    assert_eq!(stats.queued, 2);
    assert_eq!(sessions.reserve("C").await, Admission::Active);
    assert_eq!(sessions.reserve("D").await, Admission::Queued { position: 1, size: 2 });
}

#[tokio::test]
async fn test_remove_unknown_client_is_harmless() {
    let sessions = controller(1);
    sessions.reserve("A").await;

    sessions.remove("nobody").await;

    assert_eq!(sessions.stats().await.active, 1);
}

#[tokio::test]
async fn test_queued_client_can_leave_the_line() {
    let sessions = controller(1);
    sessions.reserve("A").await;
    sessions.reserve("B").await;
    sessions.reserve("C").await;

    sessions.remove("B").await;

    assert_eq!(sessions.reserve("C").await, Admission::Queued { position: 1, size: 1 });
    assert_eq!(sessions.stats().await.active, 1);
}

#[tokio::test]
async fn test_get_or_create_never_enqueues() {
    let sessions = controller(1);

    let record = sessions.get_or_create("A").await.unwrap();
    assert_eq!(record.id(), "A");

    let denied = sessions.get_or_create("B").await.unwrap_err();
    assert_eq!(denied, AdmissionError::CapacityExceeded { capacity: 1 });
    assert_eq!(sessions.stats().await.queued, 0);

    // Existing sessions are always returned
    assert!(sessions.get_or_create("A").await.is_ok());
}

#[tokio::test]
async fn test_queued_client_is_denied_on_ingest() {
    let sessions = controller(1);
    sessions.reserve("A").await;
    sessions.reserve("B").await;

    assert!(sessions.get_or_create("B").await.is_err());
    assert_eq!(sessions.reserve("B").await, Admission::Queued { position: 1, size: 1 });
}

#[tokio::test]
async fn test_append_and_touch_reach_the_record() {
    let sessions = controller(1);
    sessions.reserve("A").await;

    assert!(sessions.append("A", "photosynthesis").await);
    assert!(!sessions.append("B", "ignored").await);

    let record = sessions.get("A").await.unwrap();
    assert_eq!(record.latest_text(), "photosynthesis");
    assert_eq!(record.transcript_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_disappears_before_ttl() {
    let sessions = controller(1);
    sessions.reserve("A").await;

    advance(Duration::from_secs(91)).await;

    assert!(sessions.get("A").await.is_none());
    assert_eq!(sessions.stats().await.active, 0);
}

#[tokio::test(start_paused = true)]
async fn test_touch_keeps_session_alive_until_ttl() {
    let sessions = controller(1);
    sessions.reserve("A").await;

    // 40 minute TTL, touched every minute
    for _ in 0..40 {
        advance(Duration::from_secs(60)).await;
        sessions.touch("A").await;
    }
    assert!(sessions.get("A").await.is_some());

    advance(Duration::from_secs(1)).await;
    assert!(sessions.get("A").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_promotes_queue_head() {
    let sessions = controller(1);
    sessions.reserve("A").await;
    sessions.reserve("B").await;

    // Keep B's queue entry fresh enough, let A go idle
    advance(Duration::from_secs(91)).await;

    assert_eq!(sessions.reserve("B").await, Admission::Active);
    assert!(sessions.get("A").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stale_queue_entries_are_dropped() {
    let sessions = AdmissionController::new(SessionConfig {
        max_concurrent: 1,
        queue_timeout_secs: 30,
        ..SessionConfig::default()
    });
    sessions.reserve("A").await;
    sessions.reserve("B").await;

    advance(Duration::from_secs(20)).await;
    sessions.touch("A").await;
    sessions.reserve("C").await;

    advance(Duration::from_secs(15)).await;
    sessions.touch("A").await;

    // B waited 35s and is gone, C (15s) moved up
    assert_eq!(sessions.reserve("C").await, Admission::Queued { position: 1, size: 1 });

    // A stale entry is never promoted
    sessions.remove("A").await;
    assert!(sessions.get("B").await.is_none());
    assert!(sessions.get("C").await.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_expired_queue_head_skipped_on_expiry_promotion() {
    let sessions = AdmissionController::new(SessionConfig {
        max_concurrent: 1,
        inactive_secs: 90,
        queue_timeout_secs: 100,
        ..SessionConfig::default()
    });
    sessions.reserve("A").await;
    sessions.reserve("B").await;
    advance(Duration::from_secs(50)).await;
    sessions.touch("A").await;
    sessions.reserve("C").await;

    // At t=145 A has idled out, B's entry expired at t=100 and C's is still valid
    advance(Duration::from_secs(95)).await;

    assert!(sessions.get("B").await.is_none());
    assert_eq!(sessions.reserve("C").await, Admission::Active);
}

#[tokio::test(start_paused = true)]
async fn test_polling_clients_keep_their_place_past_queue_timeout() {
    let sessions = controller(1);
    sessions.reserve("A").await;
    sessions.reserve("B").await;
    advance(Duration::from_secs(10)).await;
    sessions.reserve("C").await;

    // Well past the 600s queue timeout, with everyone polling every 30s
    let mut last_c = usize::MAX;
    for _ in 0..30 {
        advance(Duration::from_secs(30)).await;
        sessions.touch("A").await;

        assert_eq!(sessions.reserve("B").await, Admission::Queued { position: 1, size: 2 });
        match sessions.reserve("C").await {
            Admission::Queued { position, .. } => {
                assert!(position <= last_c, "C moved back to {}", position);
                last_c = position;
            }
            Admission::Active => panic!("C promoted while A is active"),
        }
    }

    sessions.remove("A").await;
    assert_eq!(sessions.reserve("B").await, Admission::Active);
    assert_eq!(sessions.reserve("C").await, Admission::Queued { position: 1, size: 1 });
}

#[tokio::test(start_paused = true)]
async fn test_session_stats_snapshot() {
    let sessions = controller(1);
    sessions.reserve("A").await;
    sessions.append("A", "hello").await;
    advance(Duration::from_secs(5)).await;

    let stats = sessions.session_stats("A").await.unwrap();
    assert_eq!(stats.session_id, "A");
    assert_eq!(stats.transcript_entries, 1);
    assert_eq!(stats.idle_secs, 5.0);

    assert!(sessions.session_stats("B").await.is_none());
}
