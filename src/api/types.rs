use serde::{Deserialize, Serialize};

use furi_core::pipeline::{AnnotateError, AnnotatedSentence, AnnotationStatus, SentenceInput};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("IO error: {msg}")]
    Io { msg: String },
    #[error("invalid data: {msg}")]
    InvalidData { msg: String },
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A sentence as callers hand it over: Japanese to annotate, and an optional
/// translation that is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub japanese: SentenceInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
}

impl Sentence {
    pub fn new(japanese: impl Into<SentenceInput>) -> Self {
        Self {
            japanese: japanese.into(),
            english: None,
        }
    }

    pub fn with_english(mut self, english: impl Into<String>) -> Self {
        self.english = Some(english.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedPair {
    pub japanese: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    #[serde(flatten)]
    pub status: AnnotationStatus,
}

impl AnnotatedPair {
    pub(crate) fn new(annotated: AnnotatedSentence, english: Option<String>) -> Self {
        Self {
            japanese: annotated.html,
            english,
            status: annotated.status,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, AnnotationStatus::Degraded(_))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SentenceJson {
    Full(Sentence),
    Bare(SentenceInput),
}

/// Parse one sentence from JSON. Accepts `{"japanese": …, "english": …}`, a
/// bare string, or a bare `{raw, cleaned, readings}` object.
pub fn parse_sentence_json(json: &str) -> Result<Sentence, AnnotateError> {
    let parsed: SentenceJson = serde_json::from_str(json).map_err(|e| {
        AnnotateError::InvalidInput(format!("expected a sentence string or object: {e}"))
    })?;
    Ok(match parsed {
        SentenceJson::Full(sentence) => sentence,
        SentenceJson::Bare(japanese) => Sentence::new(japanese),
    })
}
