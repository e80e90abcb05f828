use super::{NotesParams, SubjectMode};

fn focus(mode: SubjectMode) -> &'static str {
    match mode {
        SubjectMode::Biology => {
            "Based on this biology lecture transcript, create concise bullet points covering key concepts, processes, and terminology. Focus on:
- Main biological processes or systems discussed
- Key terminology and definitions
- Important relationships or mechanisms
- Any examples or case studies mentioned"
        }
        SubjectMode::Mandarin => {
            "Based on this Mandarin language lesson transcript, create concise bullet points covering:
- New vocabulary words and their meanings
- Grammar patterns or structures introduced
- Cultural context or usage notes
- Pronunciation or tone information if mentioned"
        }
        SubjectMode::Spanish => {
            "Based on this Spanish language lesson transcript, create concise bullet points covering:
- New vocabulary and phrases
- Grammar rules or conjugations discussed
- Cultural context or regional variations
- Practice exercises or examples mentioned"
        }
        SubjectMode::English => {
            "Based on this English class transcript, create concise bullet points covering:
- Literary devices, themes, or analysis discussed
- Writing techniques or grammar concepts
- Key readings or texts mentioned
- Important assignments or deadlines"
        }
        SubjectMode::GlobalHistory => {
            "Based on this global history lecture transcript, create concise bullet points covering:
- Historical events, dates, and key figures
- Cause and effect relationships
- Geographic regions or civilizations discussed
- Important themes or patterns in history"
        }
        SubjectMode::General => {
            "Based on this lecture transcript, create concise bullet points covering the main topics, key concepts, and important information discussed."
        }
    }
}

/// Full prompt for a transcript window
pub fn build_prompt(text: &str, params: &NotesParams) -> String {
    format!(
        "{}\n\nWrite for a grade {} student.\n\nTranscript: {}\n\nGenerate 2-4 concise bullet points:",
        focus(params.mode),
        params.grade.value(),
        text
    )
}
