use crate::audio::AudioConfig;
use crate::notes::NotesConfig;
use crate::ratelimit::RateLimitConfig;
use crate::session::SessionConfig;
use crate::stream::StreamConfig;
use crate::transcribe::TranscriberConfig;
use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable prefix, e.g. `CAPTIONS_SESSIONS__MAX_CONCURRENT=3`
pub const ENV_PREFIX: &str = "CAPTIONS";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub sessions: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub streams: StreamConfig,
    pub audio: AudioConfig,
    pub transcriber: TranscriberConfig,
    pub notes: NotesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Directory with the built web client, served for unknown paths
    pub static_dir: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "CaptionsNotes".to_string(),
            http: HttpConfig::default(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Load `path` (any extension the config crate understands, optional)
    /// overlaid with `CAPTIONS_*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}
