use super::pcm::{samples_from_le_bytes, SAMPLE_RATE};
use std::io::ErrorKind;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The decoding backend cannot run at all (e.g. missing binary)
    #[error("decoder unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but rejected the input
    #[error("decode failed: {0}")]
    Failed(String),
}

/// Converts an audio container into raw 16 kHz mono s16 samples
#[async_trait::async_trait]
pub trait Decoder: Send + Sync {
    async fn decode(&self, container: &[u8]) -> Result<Vec<i16>, DecodeError>;

    /// Get decoder name for logging
    fn name(&self) -> &str;
}

/// Decoder that pipes the container through an `ffmpeg` child process
pub struct FfmpegDecoder {
    binary: String,
}

impl FfmpegDecoder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait::async_trait]
impl Decoder for FfmpegDecoder {
    async fn decode(&self, container: &[u8]) -> Result<Vec<i16>, DecodeError> {
        if container.is_empty() {
            return Ok(Vec::new());
        }

        let sample_rate = SAMPLE_RATE.to_string();
        let mut child = Command::new(&self.binary)
            .args(["-hide_banner", "-loglevel", "error", "-i", "pipe:0"])
            .args(["-ar", sample_rate.as_str(), "-ac", "1", "-f", "s16le", "pipe:1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DecodeError::Unavailable(format!("{} not found", self.binary)),
                _ => DecodeError::Unavailable(e.to_string()),
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| DecodeError::Failed("ffmpeg stdin was not captured".to_string()))?;
        let input = container.to_vec();

        // Feed stdin while stdout is drained, otherwise large inputs deadlock
        let writer = tokio::spawn(async move { stdin.write_all(&input).await });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| DecodeError::Failed(e.to_string()))?;

        if let Ok(Err(e)) = writer.await {
            debug!("ffmpeg closed stdin early: {}", e);
        }

        if !output.status.success() {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DecodeError::Failed(detail));
        }

        Ok(samples_from_le_bytes(&output.stdout))
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}
