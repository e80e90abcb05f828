use super::prompts::build_prompt;
use super::{NotesConfig, NotesParams, Summarizer};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Cached summaries beyond this count are trimmed
const CACHE_LIMIT: usize = 100;

/// Summaries kept after a trim
const CACHE_KEEP: usize = 50;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Recently produced notes, keyed by mode, grade and window text
#[derive(Debug, Default)]
struct NotesCache {
    entries: HashMap<(NotesParams, String), String>,
    order: VecDeque<(NotesParams, String)>,
}

impl NotesCache {
    fn get(&self, key: &(NotesParams, String)) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: (NotesParams, String), notes: String) {
        if self.entries.insert(key.clone(), notes).is_none() {
            self.order.push_back(key);
        }

        if self.order.len() > CACHE_LIMIT {
            while self.order.len() > CACHE_KEEP {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
        }
    }
}

/// Summarizer backed by a local Ollama server
pub struct OllamaSummarizer {
    client: reqwest::Client,
    config: NotesConfig,
    cache: Mutex<NotesCache>,
}

impl OllamaSummarizer {
    pub fn new(config: NotesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build notes HTTP client")?;

        Ok(Self {
            client,
            config,
            cache: Mutex::new(NotesCache::default()),
        })
    }

    async fn generate(&self, text: &str, params: &NotesParams) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: build_prompt(text, params),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                top_p: 0.9,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .context("Notes request failed")?
            .error_for_status()
            .context("Notes service returned an error")?;

        let body: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse notes response")?;

        Ok(body.response.trim().to_string())
    }
}

#[async_trait::async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, text: &str, params: &NotesParams) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let key = (*params, text.to_string());
        if let Some(notes) = self.cache.lock().await.get(&key) {
            debug!("Notes cache hit ({} mode)", params.mode);
            return Some(notes);
        }

        match self.generate(text, params).await {
            Ok(notes) if !notes.is_empty() => {
                self.cache.lock().await.insert(key, notes.clone());
                Some(notes)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Notes generation error: {:#}", e);
                None
            }
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
