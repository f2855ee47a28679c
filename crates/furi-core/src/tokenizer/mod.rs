//! Tokenizer capability consumed by the segmenter.
//!
//! A tokenizer splits text into contiguous tokens that together cover the
//! whole input, each with an optional katakana reading. Morphological analysis
//! proper is out of scope; [`LexiconTokenizer`] is a longest-match stand-in
//! driven by a user-supplied word list.

mod lexicon;

pub use lexicon::{LexiconError, LexiconTokenizer};

use std::any::Any;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub surface_form: String,
    /// Katakana reading; `None` for particles, punctuation and bare kana.
    #[serde(default)]
    pub reading: Option<String>,
}

impl Token {
    pub fn new(surface_form: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            surface_form: surface_form.into(),
            reading: Some(reading.into()),
        }
    }

    /// A token with no reading.
    pub fn bare(surface_form: impl Into<String>) -> Self {
        Self {
            surface_form: surface_form.into(),
            reading: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    /// The tokenizer could not be loaded at all.
    #[error("tokenizer unavailable: {0}")]
    Unavailable(String),
    /// The tokenizer is loaded but failed on this input.
    #[error("tokenization failed: {0}")]
    Failed(String),
}

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Result<Vec<Token>, TokenizerError> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        self(text)
    }
}

/// The message carried by a caught panic, if it has one.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with no message".to_string()
    }
}
