use super::config::SessionConfig;
use super::session::SessionRecord;
use super::stats::{ControllerStats, SessionStats};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Outcome of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Admission {
    /// The client holds a slot
    Active,

    /// The client is waiting; `position` is 1-indexed from the front
    Queued { position: usize, size: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("at capacity ({capacity} sessions), try later")]
    CapacityExceeded { capacity: usize },
}

/// A client waiting for a free slot
#[derive(Debug, Clone)]
struct QueueEntry {
    client_id: String,
    last_polled_at: Instant,
}

/// Session table and waiting line.
///
/// Promotion moves a client from one to the other, so both live behind the
/// same lock.
#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<String, SessionRecord>,
    queue: VecDeque<QueueEntry>,
}

impl Tables {
    fn has_free_slot(&self, config: &SessionConfig) -> bool {
        self.sessions.len() < config.max_concurrent
    }

    fn queue_position(&self, client_id: &str) -> Option<usize> {
        self.queue
            .iter()
            .position(|entry| entry.client_id == client_id)
            .map(|index| index + 1)
    }

    fn admit(&mut self, client_id: &str, config: &SessionConfig, now: Instant) -> &SessionRecord {
        self.queue.retain(|entry| entry.client_id != client_id);
        self.sessions
            .entry(client_id.to_string())
            .or_insert_with(|| SessionRecord::new_at(client_id, config.transcript_capacity, now))
    }

    /// Pop the queue head into a new session if a slot is free
    fn promote_next(&mut self, config: &SessionConfig, now: Instant) -> Option<String> {
        if !self.has_free_slot(config) {
            return None;
        }

        while let Some(entry) = self.queue.pop_front() {
            if self.sessions.contains_key(&entry.client_id) {
                continue;
            }

            let record = SessionRecord::new_at(entry.client_id.clone(), config.transcript_capacity, now);
            self.sessions.insert(entry.client_id.clone(), record);
            return Some(entry.client_id);
        }

        None
    }

    /// Lazy garbage collection, run at the top of every table access.
    ///
    /// Stale queue entries go first so that freed slots are never handed to a
    /// client that already left the line. Every expired session frees one
    /// promotion.
    fn sweep(&mut self, config: &SessionConfig, now: Instant) {
        let queue_timeout = config.queue_timeout();
        let queued_before = self.queue.len();
        self.queue
            .retain(|entry| now.saturating_duration_since(entry.last_polled_at) <= queue_timeout);
        let dropped = queued_before - self.queue.len();
        if dropped > 0 {
            debug!("Dropped {} stale queue entries", dropped);
        }

        let ttl = config.ttl();
        let idle = config.inactivity_window();
        let expired: Vec<String> = self
            .sessions
            .values()
            .filter(|record| record.is_expired_at(ttl, now) || record.is_inactive_at(idle, now))
            .map(|record| record.id().to_string())
            .collect();

        for session_id in &expired {
            self.sessions.remove(session_id);
            info!("Session {} expired", session_id);
        }

        for _ in 0..expired.len() {
            match self.promote_next(config, now) {
                Some(promoted) => info!("Promoted {} from the queue", promoted),
                None => break,
            }
        }
    }
}

/// Owns the bounded set of live sessions plus the FIFO waiting line
#[derive(Debug)]
pub struct AdmissionController {
    config: SessionConfig,
    tables: Mutex<Tables>,
}

impl AdmissionController {
    pub fn new(config: SessionConfig) -> Self {
        info!(
            "Admission controller: {} slots, ttl {}m, idle {}s, queue timeout {}s",
            config.max_concurrent, config.session_minutes, config.inactive_secs, config.queue_timeout_secs
        );

        Self {
            config,
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Claim a slot or a place in line. Repeated calls report the current
    /// state without changing membership or order; a queued client's call
    /// also renews its queue timeout.
    pub async fn reserve(&self, client_id: &str) -> Admission {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        if tables.sessions.contains_key(client_id) {
            return Admission::Active;
        }

        if let Some(position) = tables.queue_position(client_id) {
            // Polling counts as still waiting
            tables.queue[position - 1].last_polled_at = now;
            return Admission::Queued {
                position,
                size: tables.queue.len(),
            };
        }

        if tables.has_free_slot(&self.config) {
            tables.admit(client_id, &self.config, now);
            info!("Session {} admitted", client_id);
            return Admission::Active;
        }

        tables.queue.push_back(QueueEntry {
            client_id: client_id.to_string(),
            last_polled_at: now,
        });
        let size = tables.queue.len();
        info!("Session {} queued at position {}", client_id, size);

        Admission::Queued {
            position: size,
            size,
        }
    }

    /// Existing session or a fresh one if a slot is free. Never enqueues.
    pub async fn get_or_create(&self, client_id: &str) -> Result<SessionRecord, AdmissionError> {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        if let Some(record) = tables.sessions.get(client_id) {
            return Ok(record.clone());
        }

        if !tables.has_free_slot(&self.config) {
            debug!("Session {} denied, at capacity", client_id);
            return Err(AdmissionError::CapacityExceeded {
                capacity: self.config.max_concurrent,
            });
        }

        info!("Session {} admitted on ingest", client_id);
        Ok(tables.admit(client_id, &self.config, now).clone())
    }

    pub async fn get(&self, client_id: &str) -> Option<SessionRecord> {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        tables.sessions.get(client_id).cloned()
    }

    pub async fn touch(&self, client_id: &str) {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        if let Some(record) = tables.sessions.get_mut(client_id) {
            record.touch_at(now);
        }
    }

    /// Append a transcribed fragment; false if the session is gone
    pub async fn append(&self, client_id: &str, text: &str) -> bool {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        match tables.sessions.get_mut(client_id) {
            Some(record) => {
                record.append_at(text, now);
                true
            }
            None => false,
        }
    }

    /// End a session and hand its slot to the head of the queue
    pub async fn remove(&self, client_id: &str) {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        if tables.sessions.remove(client_id).is_some() {
            info!("Session {} ended", client_id);
            if let Some(promoted) = tables.promote_next(&self.config, now) {
                info!("Promoted {} from the queue", promoted);
            }
        } else if tables.queue_position(client_id).is_some() {
            tables.queue.retain(|entry| entry.client_id != client_id);
            info!("Session {} left the queue", client_id);
        }
    }

    /// Snapshot of one active session
    pub async fn session_stats(&self, client_id: &str) -> Option<SessionStats> {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        tables.sessions.get(client_id).map(SessionRecord::stats)
    }

    pub async fn stats(&self) -> ControllerStats {
        let now = Instant::now();
        let mut tables = self.tables.lock().await;
        tables.sweep(&self.config, now);

        ControllerStats {
            active: tables.sessions.len(),
            capacity: self.config.max_concurrent,
            queued: tables.queue.len(),
        }
    }
}
