use super::stats::SessionStats;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// A single transcribed fragment and the moment it was appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub text: String,
    pub produced_at: Instant,
}

/// Per-session state: rolling transcript, timestamps and activity markers
///
/// Records are owned by the [`AdmissionController`](super::AdmissionController);
/// everything handed out of the controller is a clone.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Client-supplied identifier, stable across reconnects
    id: String,

    /// Drives the absolute TTL
    created_at: Instant,

    /// Wall-clock admission time, for reporting only
    started_at: DateTime<Utc>,

    /// Drives inactivity expiry; never earlier than `created_at`
    last_seen_at: Instant,

    /// When text was last appended
    last_ingest_at: Option<Instant>,

    /// Bounded ring of the most recent fragments, in arrival order
    transcript: VecDeque<TranscriptEntry>,

    /// Cache of the newest fragment for cheap caption diffing
    latest_text: String,

    /// Maximum number of fragments kept in `transcript`
    capacity: usize,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>, capacity: usize) -> Self {
        Self::new_at(id, capacity, Instant::now())
    }

    pub fn new_at(id: impl Into<String>, capacity: usize, now: Instant) -> Self {
        let capacity = capacity.max(1);
        Self {
            id: id.into(),
            created_at: now,
            started_at: Utc::now(),
            last_seen_at: now,
            last_ingest_at: None,
            transcript: VecDeque::with_capacity(capacity),
            latest_text: String::new(),
            capacity,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn last_seen_at(&self) -> Instant {
        self.last_seen_at
    }

    pub fn last_ingest_at(&self) -> Option<Instant> {
        self.last_ingest_at
    }

    pub fn latest_text(&self) -> &str {
        &self.latest_text
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn transcript(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.transcript.iter()
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript.len()
    }

    /// Mark the session as seen
    pub fn touch(&mut self) {
        self.touch_at(Instant::now());
    }

    pub fn touch_at(&mut self, now: Instant) {
        if now > self.last_seen_at {
            self.last_seen_at = now;
        }
    }

    /// Append a fragment, evicting the oldest one once the ring is full.
    ///
    /// Blank fragments are ignored; returns whether anything was stored.
    pub fn append(&mut self, text: &str) -> bool {
        self.append_at(text, Instant::now())
    }

    pub fn append_at(&mut self, text: &str, now: Instant) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        while self.transcript.len() >= self.capacity {
            self.transcript.pop_front();
        }

        self.transcript.push_back(TranscriptEntry {
            text: text.to_string(),
            produced_at: now,
        });
        self.latest_text = text.to_string();
        self.last_ingest_at = Some(now);
        self.touch_at(now);

        true
    }

    /// Text of every fragment produced within the trailing `window`, joined by spaces
    pub fn text_within(&self, window: Duration) -> String {
        self.text_within_at(window, Instant::now())
    }

    pub fn text_within_at(&self, window: Duration, now: Instant) -> String {
        let fragments: Vec<&str> = self
            .transcript
            .iter()
            .filter(|entry| now.saturating_duration_since(entry.produced_at) <= window)
            .map(|entry| entry.text.as_str())
            .collect();

        fragments.join(" ")
    }

    /// The last `count` fragments joined by spaces
    pub fn recent_text(&self, count: usize) -> String {
        let skip = self.transcript.len().saturating_sub(count);
        let fragments: Vec<&str> = self
            .transcript
            .iter()
            .skip(skip)
            .map(|entry| entry.text.as_str())
            .collect();

        fragments.join(" ")
    }

    pub fn is_expired_at(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }

    pub fn is_inactive_at(&self, window: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_seen_at) > window
    }

    pub fn stats(&self) -> SessionStats {
        let now = Instant::now();
        SessionStats {
            session_id: self.id.clone(),
            started_at: self.started_at,
            age_secs: now.saturating_duration_since(self.created_at).as_secs_f64(),
            idle_secs: now.saturating_duration_since(self.last_seen_at).as_secs_f64(),
            transcript_entries: self.transcript.len(),
        }
    }
}
