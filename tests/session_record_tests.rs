// Tests for the per-session rolling transcript
//
// These tests pin the ring-buffer eviction order, the time-window query
// used by the notes feed, and the timestamp invariants.

use captions_notes::SessionRecord;
use std::time::Duration;
use tokio::time::Instant;

fn texts(record: &SessionRecord) -> Vec<String> {
    record.transcript().map(|entry| entry.text.clone()).collect()
}

#[test]
fn test_transcript_keeps_most_recent_entries_in_order() {
    let t0 = Instant::now();
    let mut record = SessionRecord::new_at("s1", 3, t0);

    for (i, word) in ["one", "two", "three", "four", "five"].iter().enumerate() {
        assert!(record.append_at(word, t0 + Duration::from_secs(i as u64)));
        assert!(record.transcript_len() <= 3);
    }

    assert_eq!(texts(&record), vec!["three", "four", "five"]);
    assert_eq!(record.latest_text(), "five");
}

#[test]
fn test_default_capacity_of_twenty() {
    let mut record = SessionRecord::new("s1", 20);
    for i in 0..25 {
        record.append(&format!("fragment {}", i));
    }

    assert_eq!(record.transcript_len(), 20);
    assert_eq!(texts(&record).first().map(String::as_str), Some("fragment 5"));
}

#[test]
fn test_window_text_filters_by_timestamp() {
    let t0 = Instant::now();
    let mut record = SessionRecord::new_at("s1", 20, t0);

    record.append_at("a", t0);
    record.append_at("b", t0 + Duration::from_secs(5));
    record.append_at("c", t0 + Duration::from_secs(12));

    let window = record.text_within_at(Duration::from_secs(10), t0 + Duration::from_secs(12));
    assert_eq!(window, "b c");
}

#[test]
fn test_window_text_is_empty_when_everything_is_old() {
    let t0 = Instant::now();
    let mut record = SessionRecord::new_at("s1", 20, t0);
    record.append_at("old", t0);

    assert_eq!(record.text_within_at(Duration::from_secs(10), t0 + Duration::from_secs(30)), "");
}

#[test]
fn test_blank_fragments_are_not_appended() {
    let mut record = SessionRecord::new("s1", 20);
    record.append("hello");

    assert!(!record.append("   "));
    assert!(!record.append(""));
    assert_eq!(record.transcript_len(), 1);
    assert_eq!(record.latest_text(), "hello");
}

#[test]
fn test_recent_text_joins_last_entries() {
    let mut record = SessionRecord::new("s1", 20);
    for word in ["the", "cell", "membrane"] {
        record.append(word);
    }

    assert_eq!(record.recent_text(2), "cell membrane");
    assert_eq!(record.recent_text(10), "the cell membrane");
}

#[test]
fn test_last_seen_never_precedes_creation() {
    let t0 = Instant::now();
    let mut record = SessionRecord::new_at("s1", 20, t0 + Duration::from_secs(5));

    record.touch_at(t0);
    assert_eq!(record.last_seen_at(), record.created_at());

    record.touch_at(t0 + Duration::from_secs(9));
    assert!(record.last_seen_at() > record.created_at());
}

#[test]
fn test_append_counts_as_activity() {
    let t0 = Instant::now();
    let mut record = SessionRecord::new_at("s1", 20, t0);
    let later = t0 + Duration::from_secs(60);

    record.append_at("still here", later);

    assert_eq!(record.last_seen_at(), later);
    assert_eq!(record.last_ingest_at(), Some(later));
    assert!(!record.is_inactive_at(Duration::from_secs(90), later + Duration::from_secs(30)));
}

#[test]
fn test_expiry_clocks_are_independent() {
    let t0 = Instant::now();
    let mut record = SessionRecord::new_at("s1", 20, t0);
    let ttl = Duration::from_secs(40 * 60);
    let idle = Duration::from_secs(90);

    let now = t0 + Duration::from_secs(100);
    assert!(record.is_inactive_at(idle, now));
    assert!(!record.is_expired_at(ttl, now));

    let much_later = t0 + ttl + Duration::from_secs(1);
    record.touch_at(much_later);
    assert!(record.is_expired_at(ttl, much_later));
    assert!(!record.is_inactive_at(idle, much_later));
}

#[test]
fn test_stats_snapshot() {
    let mut record = SessionRecord::new("s1", 20);
    record.append("hello");
    record.append("world");

    let stats = record.stats();

    assert_eq!(stats.session_id, "s1");
    assert_eq!(stats.transcript_entries, 2);
    assert!(stats.idle_secs <= stats.age_secs);
}
