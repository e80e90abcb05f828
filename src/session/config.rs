use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits that govern admission and session lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hard ceiling on simultaneously active sessions
    pub max_concurrent: usize,

    /// Absolute session lifetime in minutes, measured from creation
    pub session_minutes: u64,

    /// Idle timeout in seconds, measured from the last touch
    pub inactive_secs: u64,

    /// How long a waiting client may go without polling `reserve` before it is dropped
    pub queue_timeout_secs: u64,

    /// Number of transcript fragments kept per session
    pub transcript_capacity: usize,
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.session_minutes * 60)
    }

    pub fn inactivity_window(&self) -> Duration {
        Duration::from_secs(self.inactive_secs)
    }

    pub fn queue_timeout(&self) -> Duration {
        Duration::from_secs(self.queue_timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            session_minutes: 40,
            inactive_secs: 90,
            queue_timeout_secs: 600,
            transcript_capacity: 20,
        }
    }
}
