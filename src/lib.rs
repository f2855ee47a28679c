//! Furigana annotation engine.
//!
//! Takes Japanese sentences (plain text, or pre-cleaned text with explicit
//! readings) and returns them with `<ruby>` reading annotations over the
//! kanji. The text transformations live in [`furi_core`]; this crate owns the
//! caller-facing context: a lazily loaded tokenizer, batch annotation, and
//! config loading.

pub mod api;
pub mod trace_init;

pub use api::{
    parse_sentence_json, AnnotatedPair, EngineError, FuriganaEngine, Sentence, TokenizerHandle,
};
pub use furi_core::pipeline::{
    parse_bracketed, AnnotateError, AnnotatedSentence, AnnotationStatus, Annotator,
    ExplicitReading, SentenceInput, StructuredSentence,
};
pub use furi_core::romaji::{romaji_to_hiragana, to_romaji};
pub use furi_core::tokenizer::{LexiconTokenizer, Token, Tokenizer, TokenizerError};
pub use furi_core::{compound, markup, pipeline, romaji, ruby, segment, settings, tokenizer, unicode};
