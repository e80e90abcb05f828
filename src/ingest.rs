//! Audio ingestion: rate limit, admission, decode, VAD, transcribe, append
//!
//! Collaborator calls work on local buffers only; the single write to shared
//! state is the final `AdmissionController::append`.

use crate::audio::{energy_gate, samples_from_le_bytes, DecodeError, Decoder, VadLevel};
use crate::ratelimit::RateLimiter;
use crate::session::{AdmissionController, AdmissionError};
use crate::transcribe::{LanguageHint, Transcriber};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Uploaded audio, as received
#[derive(Debug, Clone)]
pub enum AudioPayload {
    /// Any container ffmpeg understands (webm/opus from browsers)
    Container(Vec<u8>),

    /// Raw s16le, 16 kHz, mono
    RawPcm(Vec<u8>),
}

impl AudioPayload {
    fn is_empty(&self) -> bool {
        match self {
            Self::Container(bytes) | Self::RawPcm(bytes) => bytes.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub session_id: String,
    pub payload: AudioPayload,
    pub language: LanguageHint,
    pub vad: VadLevel,
}

/// Why a chunk produced no text even though ingestion succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degraded {
    DecoderUnavailable,
    DecodeFailed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestOutcome {
    /// Text recognized in this chunk; empty when there was no speech
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degraded>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("rate limit exceeded for session {0}")]
    RateLimited(String),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error("no audio data")]
    EmptyPayload,
}

/// Runs uploaded chunks through the collaborators and into the session
pub struct Ingestor {
    sessions: Arc<AdmissionController>,
    limiter: Arc<RateLimiter>,
    decoder: Arc<dyn Decoder>,
    transcriber: Arc<dyn Transcriber>,
}

impl Ingestor {
    pub fn new(
        sessions: Arc<AdmissionController>,
        limiter: Arc<RateLimiter>,
        decoder: Arc<dyn Decoder>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        Self {
            sessions,
            limiter,
            decoder,
            transcriber,
        }
    }

    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome, IngestError> {
        let session_id = request.session_id;

        if !self.limiter.allow(&session_id, 1.0).await {
            return Err(IngestError::RateLimited(session_id));
        }

        self.sessions.get_or_create(&session_id).await?;

        if request.payload.is_empty() {
            return Err(IngestError::EmptyPayload);
        }

        let pcm = match request.payload {
            AudioPayload::RawPcm(bytes) => samples_from_le_bytes(&bytes),
            AudioPayload::Container(bytes) => match self.decoder.decode(&bytes).await {
                Ok(samples) => samples,
                Err(e) => {
                    warn!("Decode error for session {} ({}): {}", session_id, self.decoder.name(), e);
                    let degraded = match e {
                        DecodeError::Unavailable(_) => Degraded::DecoderUnavailable,
                        DecodeError::Failed(_) => Degraded::DecodeFailed,
                    };
                    return Ok(IngestOutcome {
                        text: String::new(),
                        degraded: Some(degraded),
                    });
                }
            },
        };

        let voiced = energy_gate(&pcm, request.vad);
        if voiced.is_empty() {
            debug!("No voiced audio in chunk for session {}", session_id);
            return Ok(IngestOutcome::default());
        }

        let text = self.transcriber.transcribe(&voiced, &request.language).await;
        let text = text.trim().to_string();
        if text.is_empty() {
            debug!("{} returned no text for session {}", self.transcriber.name(), session_id);
            return Ok(IngestOutcome::default());
        }

        if !self.sessions.append(&session_id, &text).await {
            debug!("Session {} ended before its text arrived", session_id);
        }

        Ok(IngestOutcome {
            text,
            degraded: None,
        })
    }
}
