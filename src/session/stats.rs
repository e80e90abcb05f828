use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a single session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Client-supplied session identifier
    pub session_id: String,

    /// When the session was admitted
    pub started_at: DateTime<Utc>,

    /// Seconds since admission
    pub age_secs: f64,

    /// Seconds since the last touch (ingest, poll or keepalive)
    pub idle_secs: f64,

    /// Number of transcript fragments currently held
    pub transcript_entries: usize,
}

/// Occupancy of the admission controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerStats {
    /// Sessions currently holding a slot
    pub active: usize,

    /// Configured ceiling
    pub capacity: usize,

    /// Clients waiting for a slot
    pub queued: usize,
}
