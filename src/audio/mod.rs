pub mod decoder;
pub mod pcm;
pub mod vad;

pub use decoder::{DecodeError, Decoder, FfmpegDecoder};
pub use pcm::{encode_wav, samples_from_le_bytes, samples_to_le_bytes, SAMPLE_RATE};
pub use vad::{energy_gate, VadLevel};

use serde::{Deserialize, Serialize};

/// Audio ingest settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// ffmpeg executable used to decode uploaded containers
    pub ffmpeg_bin: String,

    /// Accept raw s16le PCM on `/ingest-raw` (clients without a working encoder)
    pub allow_raw_ingest: bool,

    /// Largest accepted ingest body in bytes
    pub max_ingest_bytes: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            allow_raw_ingest: true,
            max_ingest_bytes: 10 * 1024 * 1024,
        }
    }
}
