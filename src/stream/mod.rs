//! Real-time caption and notes feeds
//!
//! Each connected client gets its own lazy event stream per feed. A stream
//! polls the session on a fixed cadence, emits only what changed, sends a
//! keepalive when it has been quiet for too long and finishes with
//! [`StreamEvent::End`] once the session is gone. Dropping the stream cancels
//! it; the session table is never touched by cancellation.

mod captions;
mod notes;

pub use captions::caption_stream;
pub use notes::notes_stream;

use crate::notes::{NotesParams, Summarizer};
use crate::session::AdmissionController;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// One frame of a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// New caption text or new notes
    Delta(String),

    /// Nothing new; keeps idle connections open
    Keepalive,

    /// The session ended or expired; the stream is finished
    End,
}

/// Feed cadence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Caption poll interval in milliseconds
    pub caption_poll_ms: u64,

    /// Notes window length in seconds, also the notes poll interval
    pub notes_window_secs: u64,

    /// Quiet period after which a keepalive is sent
    pub keepalive_secs: u64,
}

impl StreamConfig {
    pub fn caption_poll(&self) -> Duration {
        Duration::from_millis(self.caption_poll_ms)
    }

    pub fn notes_window(&self) -> Duration {
        Duration::from_secs(self.notes_window_secs)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            caption_poll_ms: 400,
            notes_window_secs: 10,
            keepalive_secs: 10,
        }
    }
}

/// Opens caption and notes feeds against the shared session table
#[derive(Clone)]
pub struct Broadcaster {
    sessions: Arc<AdmissionController>,
    summarizer: Arc<dyn Summarizer>,
    config: StreamConfig,
}

impl Broadcaster {
    pub fn new(
        sessions: Arc<AdmissionController>,
        summarizer: Arc<dyn Summarizer>,
        config: StreamConfig,
    ) -> Self {
        Self {
            sessions,
            summarizer,
            config,
        }
    }

    pub fn captions(&self, session_id: String) -> impl Stream<Item = StreamEvent> + Send + 'static {
        caption_stream(
            Arc::clone(&self.sessions),
            session_id,
            self.config.caption_poll(),
            self.config.keepalive(),
        )
    }

    pub fn notes(
        &self,
        session_id: String,
        params: NotesParams,
    ) -> impl Stream<Item = StreamEvent> + Send + 'static {
        notes_stream(
            Arc::clone(&self.sessions),
            Arc::clone(&self.summarizer),
            session_id,
            params,
            self.config.notes_window(),
            self.config.keepalive(),
        )
    }
}
