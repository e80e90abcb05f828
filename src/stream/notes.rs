use super::StreamEvent;
use crate::notes::{NotesParams, Summarizer};
use crate::session::AdmissionController;
use futures::stream::{self, Stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

struct NotesLoop {
    sessions: Arc<AdmissionController>,
    summarizer: Arc<dyn Summarizer>,
    session_id: String,
    params: NotesParams,
    window: Duration,
    keepalive: Duration,
    last_sent: String,
    /// Window text last handed to the summarizer (or skipped because empty)
    last_window: Option<String>,
    last_frame_at: Instant,
    started: bool,
    finished: bool,
}

impl NotesLoop {
    async fn poll_once(&mut self) -> Option<StreamEvent> {
        let Some(record) = self.sessions.get(&self.session_id).await else {
            debug!("Notes stream for {} ended", self.session_id);
            self.finished = true;
            return Some(StreamEvent::End);
        };
        self.sessions.touch(&self.session_id).await;

        let window_text = record.text_within(self.window);
        if self.last_window.as_deref() != Some(window_text.as_str()) {
            let notes = if window_text.is_empty() {
                None
            } else {
                self.summarizer.summarize(&window_text, &self.params).await
            };
            self.last_window = Some(window_text);

            if let Some(notes) = notes {
                let notes = notes.trim();
                if !notes.is_empty() && notes != self.last_sent {
                    self.last_sent = notes.to_string();
                    self.last_frame_at = Instant::now();
                    return Some(StreamEvent::Delta(notes.to_string()));
                }
            }
        } else {
            debug!("Notes window for {} unchanged", self.session_id);
        }

        let now = Instant::now();
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
                sleep(self.window).await;
            }
            self.started = true;

            if let Some(event) = self.poll_once().await {
                return Some(event);
            }
        }
    }
}

/// Notes feed: summarizes the trailing window whenever its text changes
pub fn notes_stream(
    sessions: Arc<AdmissionController>,
    summarizer: Arc<dyn Summarizer>,
    session_id: String,
    params: NotesParams,
    window: Duration,
    keepalive: Duration,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    let state = NotesLoop {
        sessions,
        summarizer,
        session_id,
        params,
        window,
        keepalive,
        last_sent: String::new(),
        last_window: None,
        last_frame_at: Instant::now(),
        started: false,
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        let event = state.next_event().await?;
        Some((event, state))
    })
}
