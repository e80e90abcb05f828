use super::StreamEvent;
use crate::session::AdmissionController;
use futures::stream::{self, Stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

struct CaptionLoop {
    sessions: Arc<AdmissionController>,
    session_id: String,
    poll_interval: Duration,
    keepalive: Duration,
    last_sent: String,
    last_frame_at: Instant,
    started: bool,
    finished: bool,
}

impl CaptionLoop {
    /// One poll; `None` when there is nothing to send this time
    async fn poll_once(&mut self) -> Option<StreamEvent> {
        let Some(record) = self.sessions.get(&self.session_id).await else {
            debug!("Caption stream for {} ended", self.session_id);
            self.finished = true;
            return Some(StreamEvent::End);
        };
        self.sessions.touch(&self.session_id).await;

        let latest = record.latest_text();
        let now = Instant::now();
        if !latest.is_empty() && latest != self.last_sent {
            self.last_sent = latest.to_string();
            self.last_frame_at = now;
            return Some(StreamEvent::Delta(latest.to_string()));
        }

        if now.saturating_duration_since(self.last_frame_at) >= self.keepalive {
            self.last_frame_at = now;
            return Some(StreamEvent::Keepalive);
        }

        None
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }

        loop {
            if self.started {
                sleep(self.poll_interval).await;
            }
            self.started = true;

            if let Some(event) = self.poll_once().await {
                return Some(event);
            }
        }
    }
}

/// Caption feed: emits `latest_text` whenever it changes
pub fn caption_stream(
    sessions: Arc<AdmissionController>,
    session_id: String,
    poll_interval: Duration,
    keepalive: Duration,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    let state = CaptionLoop {
        sessions,
        session_id,
        poll_interval,
        keepalive,
        last_sent: String::new(),
        last_frame_at: Instant::now(),
        started: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        let event = state.next_event().await?;
        Some((event, state))
    })
}
