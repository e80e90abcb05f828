use super::{LanguageHint, Transcriber, TranscriberConfig};
use crate::audio::{encode_wav, pcm};
use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Transcriber backed by a Whisper-compatible HTTP server
pub struct HttpTranscriber {
    client: reqwest::Client,
    config: TranscriberConfig,
}

impl HttpTranscriber {
    pub fn new(config: TranscriberConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build transcriber HTTP client")?;

        Ok(Self { client, config })
    }

    async fn request(&self, samples: &[i16], language: &LanguageHint) -> Result<String> {
        let wav = encode_wav(samples)?;
        let file = Part::bytes(wav)
            .file_name("chunk.wav")
            .mime_str("audio/wav")
            .context("Invalid mime type")?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("response_format", "json");
        if let Some(code) = language.code() {
            form = form.text("language", code.to_string());
        }

        let response = self
            .client
            .post(&self.config.url)
            .multipart(form)
            .send()
            .await
            .context("Transcription request failed")?
            .error_for_status()
            .context("Transcription service returned an error")?;

        let body: TranscriptionResponse = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        Ok(body.text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, samples: &[i16], language: &LanguageHint) -> String {
        if samples.is_empty() {
            return String::new();
        }

        match self.request(samples, language).await {
            Ok(text) => {
                debug!(
                    "Transcribed {:.2}s of audio into {} chars",
                    pcm::duration_secs(samples),
                    text.len()
                );
                text
            }
            Err(e) => {
                warn!("Transcription error: {:#}", e);
                String::new()
            }
        }
    }

    fn name(&self) -> &str {
        "http-whisper"
    }
}
