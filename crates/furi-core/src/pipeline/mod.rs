//! Per-sentence furigana pipeline.
//!
//! ```text
//! input ─▶ protect existing <ruby> ─▶ compound spans ─▶ tokenize plain text
//!       ─▶ segment (skipping protected chars) ─▶ render ─▶ restore
//! ```
//!
//! Structured input that already carries explicit readings skips the
//! tokenizer and segmenter entirely. Every stage writes into the same
//! [`ProtectedText`], so anything annotated once is never looked at again and
//! re-running the pipeline on its own output changes nothing.

mod bracket;

pub use bracket::parse_bracketed;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, warn};

use crate::compound::CompoundDictionary;
use crate::markup::{protect, ProtectedText};
use crate::ruby::render_with;
use crate::segment::{segment_with, ReadingSplit, SegmentError, SegmentOptions};
use crate::settings::{settings, PipelineSettings, RubySettings, Settings};
use crate::tokenizer::{panic_message, Tokenizer, TokenizerError};
use crate::unicode::katakana_to_hiragana;

/// A reading supplied by an upstream cleaning step. `position` is the char
/// offset of `kanji` in the sentence's `cleaned` text, after any `<ruby>`
/// markup in it has been reduced to its base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitReading {
    pub reading: String,
    pub kanji: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSentence {
    pub raw: String,
    pub cleaned: String,
    #[serde(default)]
    pub readings: Vec<ExplicitReading>,
}

/// Either a plain string or a pre-cleaned sentence with explicit readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SentenceInput {
    Plain(String),
    Structured(StructuredSentence),
}

impl SentenceInput {
    /// The text shown when annotation fails.
    pub fn fallback_text(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Structured(s) if s.cleaned.is_empty() => &s.raw,
            Self::Structured(s) => &s.cleaned,
        }
    }

    /// Only structured input with a non-empty `cleaned` text can be annotated
    /// without a tokenizer.
    pub fn needs_tokenizer(&self) -> bool {
        match self {
            Self::Plain(_) => true,
            Self::Structured(s) => s.cleaned.is_empty(),
        }
    }
}

impl From<&str> for SentenceInput {
    fn from(text: &str) -> Self {
        Self::Plain(text.to_string())
    }
}

impl From<String> for SentenceInput {
    fn from(text: String) -> Self {
        Self::Plain(text)
    }
}

impl From<StructuredSentence> for SentenceInput {
    fn from(s: StructuredSentence) -> Self {
        Self::Structured(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnnotateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("tokenizer unavailable: {0}")]
    TokenizerUnavailable(String),
    #[error("conversion failed: {0}")]
    ConversionFailure(String),
}

impl From<TokenizerError> for AnnotateError {
    fn from(e: TokenizerError) -> Self {
        match e {
            TokenizerError::Unavailable(msg) => Self::TokenizerUnavailable(msg),
            TokenizerError::Failed(msg) => Self::ConversionFailure(msg),
        }
    }
}

impl From<SegmentError> for AnnotateError {
    fn from(e: SegmentError) -> Self {
        Self::ConversionFailure(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum AnnotationStatus {
    Annotated,
    /// The sentence came back unannotated.
    Degraded(AnnotateError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedSentence {
    pub html: String,
    #[serde(flatten)]
    pub status: AnnotationStatus,
}

impl AnnotatedSentence {
    /// The input's own text, unannotated, tagged with the reason.
    pub fn degraded(input: &SentenceInput, err: AnnotateError) -> Self {
        warn!(error = %err, "annotation degraded");
        Self {
            html: input.fallback_text().to_string(),
            status: AnnotationStatus::Degraded(err),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, AnnotationStatus::Degraded(_))
    }
}

/// One configured pipeline. Cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Annotator {
    style: RubySettings,
    pipeline: PipelineSettings,
    compounds: Arc<CompoundDictionary>,
}

impl Default for Annotator {
    /// Global settings and the global compound dictionary.
    fn default() -> Self {
        Self::new(settings())
    }
}

impl Annotator {
    pub fn new(settings: &Settings) -> Self {
        Self {
            style: settings.ruby.clone(),
            pipeline: settings.pipeline.clone(),
            compounds: Arc::new(CompoundDictionary::global().clone()),
        }
    }

    pub fn with_compounds(mut self, compounds: CompoundDictionary) -> Self {
        self.compounds = Arc::new(compounds);
        self
    }

    pub fn with_split(mut self, split: ReadingSplit) -> Self {
        self.pipeline.reading_split = split;
        self
    }

    pub fn with_compounds_enabled(mut self, enabled: bool) -> Self {
        self.pipeline.use_compounds = enabled;
        self
    }

    pub fn compounds(&self) -> &CompoundDictionary {
        &self.compounds
    }

    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions {
            split: self.pipeline.reading_split,
            merge_adjacent: self.pipeline.merge_adjacent,
        }
    }

    /// Annotate one sentence. Never fails: on error, or if the tokenizer
    /// panics, the sentence's own text comes back unannotated and the status
    /// says why.
    pub fn annotate(
        &self,
        input: &SentenceInput,
        tokenizer: Option<&dyn Tokenizer>,
    ) -> AnnotatedSentence {
        match guarded(|| self.try_annotate(input, tokenizer)) {
            Ok(html) => AnnotatedSentence {
                html,
                status: AnnotationStatus::Annotated,
            },
            Err(err) => AnnotatedSentence::degraded(input, err),
        }
    }

    pub fn try_annotate(
        &self,
        input: &SentenceInput,
        tokenizer: Option<&dyn Tokenizer>,
    ) -> Result<String, AnnotateError> {
        match input {
            SentenceInput::Plain(text) => self.annotate_text(text, tokenizer),
            SentenceInput::Structured(s) if s.cleaned.is_empty() => {
                self.annotate_text(&s.raw, tokenizer)
            }
            SentenceInput::Structured(s) => self.annotate_structured(s),
        }
    }

    /// Full path: compounds, tokenizer, segmenter.
    pub fn annotate_text(
        &self,
        text: &str,
        tokenizer: Option<&dyn Tokenizer>,
    ) -> Result<String, AnnotateError> {
        let _span = debug_span!("annotate", len = text.len()).entered();

        let tokenizer = tokenizer
            .ok_or_else(|| AnnotateError::TokenizerUnavailable("no tokenizer".to_string()))?;

        let mut protected = protect(text);
        self.protect_compounds(&mut protected);

        let tokens = tokenizer.tokenize(protected.plain())?;
        let spans = segment_with(protected.plain(), &tokens, self.segment_options(), |pos| {
            protected.is_protected(pos)
        })?;

        let mut rendered = 0;
        for span in spans {
            let fragment = render_with(&span.kanji_run, &span.reading, &self.style);
            if protected.protect_range(span.position, span.end(), fragment) {
                rendered += 1;
            }
        }
        debug!(rendered, fragments = protected.spans().len());
        Ok(protected.restore())
    }

    /// Short path: the readings are already known.
    fn annotate_structured(&self, sentence: &StructuredSentence) -> Result<String, AnnotateError> {
        let _span = debug_span!("annotate", len = sentence.cleaned.len(), explicit = true)
            .entered();

        let mut protected = protect(&sentence.cleaned);
        let chars: Vec<char> = protected.plain().chars().collect();

        for r in &sentence.readings {
            if r.kanji.is_empty() || r.reading.is_empty() {
                return Err(AnnotateError::InvalidInput(format!(
                    "empty reading entry at {}",
                    r.position
                )));
            }
            let end = r.position + r.kanji.chars().count();
            let matches = chars
                .get(r.position..end)
                .is_some_and(|run| run.iter().copied().eq(r.kanji.chars()));
            if !matches {
                return Err(AnnotateError::ConversionFailure(format!(
                    "{:?} is not at offset {}",
                    r.kanji, r.position
                )));
            }
            let fragment = render_with(&r.kanji, &r.reading, &self.style);
            if !protected.protect_range(r.position, end, fragment) {
                debug!(position = r.position, "reading overlaps an annotated span");
            }
        }

        self.protect_compounds(&mut protected);
        debug!(fragments = protected.spans().len());
        Ok(protected.restore())
    }

    fn protect_compounds(&self, protected: &mut ProtectedText) {
        if !self.pipeline.use_compounds {
            return;
        }
        let matches = self
            .compounds
            .lookup_compounds_where(protected.plain(), |start, end| {
                !protected.overlaps(start, end)
            });
        for m in matches {
            let fragment = render_with(&m.compound, &m.reading, &self.style);
            protected.protect_range(m.start, m.end, fragment);
        }
    }

    /// Rewrite `text` in hiragana: compounds first, then token readings.
    /// Returns `text` unchanged on failure.
    pub fn to_hiragana(&self, text: &str, tokenizer: Option<&dyn Tokenizer>) -> String {
        match guarded(|| self.try_to_hiragana(text, tokenizer)) {
            Ok(kana) => kana,
            Err(err) => {
                warn!(error = %err, "hiragana conversion degraded");
                text.to_string()
            }
        }
    }

    pub fn try_to_hiragana(
        &self,
        text: &str,
        tokenizer: Option<&dyn Tokenizer>,
    ) -> Result<String, AnnotateError> {
        let tokenizer = tokenizer
            .ok_or_else(|| AnnotateError::TokenizerUnavailable("no tokenizer".to_string()))?;

        let text = if self.pipeline.use_compounds {
            self.compounds.substitute_readings(text)
        } else {
            text.to_string()
        };
        let tokens = tokenizer.tokenize(&text)?;

        let covered: usize = tokens.iter().map(|t| t.surface_form.len()).sum();
        if covered != text.len() {
            return Err(AnnotateError::ConversionFailure(format!(
                "tokens cover {covered} of {} bytes",
                text.len()
            )));
        }

        let mut out = String::with_capacity(text.len());
        for token in &tokens {
            match token.reading.as_deref() {
                Some(reading) if !reading.is_empty() => {
                    out.push_str(&katakana_to_hiragana(reading))
                }
                _ => out.push_str(&token.surface_form),
            }
        }
        Ok(out)
    }
}

/// Run one sentence's work with any panic turned into a conversion failure.
fn guarded<T>(work: impl FnOnce() -> Result<T, AnnotateError>) -> Result<T, AnnotateError> {
    panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        Err(AnnotateError::ConversionFailure(format!(
            "panicked: {}",
            panic_message(&*payload)
        )))
    })
}
