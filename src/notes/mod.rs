//! Note summarization collaborator
//!
//! `Summarizer::summarize` turns a window of transcript into a few bullet
//! points, or nothing. Failures are reported as nothing.

mod ollama;
mod prompts;

pub use ollama::OllamaSummarizer;
pub use prompts::build_prompt;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Summarizer endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotesConfig {
    /// Ollama `/api/generate` endpoint
    pub url: String,

    pub model: String,

    pub timeout_secs: u64,

    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:11434/api/generate".to_string(),
            model: "phi3:mini".to_string(),
            timeout_secs: 30,
            temperature: 0.3,
            max_tokens: 200,
        }
    }
}

/// Class the lecture belongs to; selects the prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectMode {
    Biology,
    Mandarin,
    Spanish,
    English,
    GlobalHistory,
    #[default]
    General,
}

impl SubjectMode {
    /// Parse the `mode` query parameter; anything unknown is `General`
    pub fn from_param(param: &str) -> Self {
        match param.trim() {
            "Biology" => Self::Biology,
            "Mandarin" => Self::Mandarin,
            "Spanish" => Self::Spanish,
            "English" => Self::English,
            "Global History" => Self::GlobalHistory,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biology => "Biology",
            Self::Mandarin => "Mandarin",
            Self::Spanish => "Spanish",
            Self::English => "English",
            Self::GlobalHistory => "Global History",
            Self::General => "default",
        }
    }
}

impl fmt::Display for SubjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target reading level, grades 1 through 12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradeLevel(u8);

impl GradeLevel {
    pub fn new(grade: u8) -> Self {
        Self(grade.clamp(1, 12))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for GradeLevel {
    fn default() -> Self {
        Self(9)
    }
}

/// Per-stream summarization parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NotesParams {
    pub mode: SubjectMode,
    pub grade: GradeLevel,
}

/// Produces short notes from accumulated transcript text
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    /// Returns `None` when there is nothing worth noting or the backend failed
    async fn summarize(&self, text: &str, params: &NotesParams) -> Option<String>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_mode_is_general() {
        assert_eq!(SubjectMode::from_param("Astrology"), SubjectMode::General);
        assert_eq!(SubjectMode::from_param("Global History"), SubjectMode::GlobalHistory);
    }

    #[test]
    fn test_grade_is_clamped() {
        assert_eq!(GradeLevel::new(0).value(), 1);
        assert_eq!(GradeLevel::new(20).value(), 12);
        assert_eq!(GradeLevel::default().value(), 9);
    }
}
