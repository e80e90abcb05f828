//! Speech-to-text collaborator
//!
//! The core only needs `Transcriber::transcribe`: PCM in, text out. An empty
//! string means "no speech", which is also what a failing backend reports.

mod http;

pub use http::HttpTranscriber;

use serde::{Deserialize, Serialize};

/// Transcriber endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Whisper-compatible `/v1/audio/transcriptions` endpoint
    pub url: String,

    /// Model name sent with every request
    pub model: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9000/v1/audio/transcriptions".to_string(),
            model: "large-v3".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Language the speaker is expected to use; `None` lets the backend detect it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageHint(Option<String>);

impl LanguageHint {
    pub fn auto() -> Self {
        Self(None)
    }

    /// Map a client `lang` parameter (ISO code or class name) to a hint
    pub fn from_param(param: &str) -> Self {
        let code = match param.trim() {
            "Mandarin" | "zh" => Some("zh"),
            "Spanish" | "es" => Some("es"),
            "English" | "Biology" | "Global History" | "en" => Some("en"),
            _ => None,
        };
        Self(code.map(str::to_string))
    }

    pub fn code(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Turns 16 kHz mono PCM into text
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a chunk; returns empty text when nothing was recognized or the backend failed
    async fn transcribe(&self, samples: &[i16], language: &LanguageHint) -> String;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_map_to_languages() {
        assert_eq!(LanguageHint::from_param("Mandarin").code(), Some("zh"));
        assert_eq!(LanguageHint::from_param("Global History").code(), Some("en"));
        assert_eq!(LanguageHint::from_param("es").code(), Some("es"));
    }

    #[test]
    fn test_auto_and_unknown_detect() {
        assert_eq!(LanguageHint::from_param("auto"), LanguageHint::auto());
        assert_eq!(LanguageHint::from_param("Klingon").code(), None);
    }
}
