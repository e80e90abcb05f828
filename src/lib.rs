pub mod audio;
pub mod config;
pub mod http;
pub mod ingest;
pub mod notes;
pub mod ratelimit;
pub mod session;
pub mod stream;
pub mod transcribe;

pub use audio::{AudioConfig, DecodeError, Decoder, FfmpegDecoder, VadLevel};
pub use config::Config;
pub use http::{create_router, AppState};
pub use ingest::{AudioPayload, IngestError, IngestOutcome, IngestRequest, Ingestor};
pub use notes::{GradeLevel, NotesParams, OllamaSummarizer, SubjectMode, Summarizer};
pub use ratelimit::{RateLimitConfig, RateLimiter, TokenBucket};
pub use session::{
    Admission, AdmissionController, AdmissionError, ControllerStats, SessionConfig, SessionRecord,
    SessionStats, TranscriptEntry,
};
pub use stream::{Broadcaster, StreamConfig, StreamEvent};
pub use transcribe::{HttpTranscriber, LanguageHint, Transcriber};
