use crate::audio::{Decoder, FfmpegDecoder};
use crate::config::Config;
use crate::ingest::Ingestor;
use crate::notes::{OllamaSummarizer, Summarizer};
use crate::ratelimit::RateLimiter;
use crate::session::AdmissionController;
use crate::stream::Broadcaster;
use crate::transcribe::{HttpTranscriber, Transcriber};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session table and waiting queue
    pub sessions: Arc<AdmissionController>,

    /// Audio chunk → transcript pipeline
    pub ingestor: Arc<Ingestor>,

    /// Caption and notes feeds
    pub broadcaster: Broadcaster,

    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the core to the given collaborators
    pub fn new(
        config: Config,
        decoder: Arc<dyn Decoder>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        let sessions = Arc::new(AdmissionController::new(config.sessions.clone()));
        let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        info!(
            "Collaborators: decoder={}, transcriber={}, summarizer={}",
            decoder.name(),
            transcriber.name(),
            summarizer.name()
        );

        let ingestor = Arc::new(Ingestor::new(
            Arc::clone(&sessions),
            limiter,
            decoder,
            transcriber,
        ));
        let broadcaster = Broadcaster::new(Arc::clone(&sessions), summarizer, config.streams.clone());

        Self {
            sessions,
            ingestor,
            broadcaster,
            config: Arc::new(config),
        }
    }

    /// Production wiring: ffmpeg, Whisper-compatible HTTP server, Ollama
    pub fn from_config(config: Config) -> Result<Self> {
        let decoder = Arc::new(FfmpegDecoder::new(config.audio.ffmpeg_bin.clone()));
        let transcriber = Arc::new(HttpTranscriber::new(config.transcriber.clone())?);
        let summarizer = Arc::new(OllamaSummarizer::new(config.notes.clone())?);

        Ok(Self::new(config, decoder, transcriber, summarizer))
    }
}
