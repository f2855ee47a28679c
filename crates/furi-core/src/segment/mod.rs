//! Reading segmentation: align tokenizer readings to the kanji in a text.
//!
//! Tokens must be contiguous and cover the text exactly. Each kanji (CJK
//! Unified Ideograph) inside a token that carries a reading gets a slice of
//! that reading; everything else passes through unannotated.
//!
//! [`ReadingSplit::PerCharacter`] divides a multi-char token's reading evenly
//! over its surface (`ceil(reading_len / surface_len)` per char). This is a
//! known-imprecise heuristic: `好き/すき` comes out right, `今日/きょう` does
//! not. [`ReadingSplit::Token`] matches the token's kana against its reading
//! instead and annotates whole kanji runs.

mod okurigana;
#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span};

use crate::tokenizer::Token;
use crate::unicode::{is_cjk_ideograph, katakana_to_hiragana};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingSplit {
    #[default]
    PerCharacter,
    Token,
}

impl FromStr for ReadingSplit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-character" => Ok(Self::PerCharacter),
            "token" => Ok(Self::Token),
            other => Err(format!(
                "unknown reading split {other:?} (expected per-character or token)"
            )),
        }
    }
}

impl fmt::Display for ReadingSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PerCharacter => "per-character",
            Self::Token => "token",
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentOptions {
    pub split: ReadingSplit,
    /// Merge contiguous spans that come from the same token.
    pub merge_adjacent: bool,
}

/// A kanji run and its hiragana reading, at a char offset of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingSpan {
    pub kanji_run: String,
    pub reading: String,
    pub position: usize,
}

impl ReadingSpan {
    pub fn end(&self) -> usize {
        self.position + self.kanji_run.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    #[error("token {index} ({surface:?}) does not match the text at offset {offset}")]
    TokenMismatch {
        index: usize,
        offset: usize,
        surface: String,
    },
    #[error("tokens cover {covered} of {len} chars")]
    IncompleteCoverage { covered: usize, len: usize },
}

/// A token and the char range it covers.
struct TokenPosition<'a> {
    token: &'a Token,
    start: usize,
    end: usize,
}

fn index_tokens<'a>(
    chars: &[char],
    tokens: &'a [Token],
) -> Result<Vec<TokenPosition<'a>>, SegmentError> {
    let mut positions = Vec::with_capacity(tokens.len());
    let mut pos = 0;
    for (index, token) in tokens.iter().enumerate() {
        let start = pos;
        for c in token.surface_form.chars() {
            if chars.get(pos) != Some(&c) {
                return Err(SegmentError::TokenMismatch {
                    index,
                    offset: start,
                    surface: token.surface_form.clone(),
                });
            }
            pos += 1;
        }
        positions.push(TokenPosition {
            token,
            start,
            end: pos,
        });
    }
    if pos != chars.len() {
        return Err(SegmentError::IncompleteCoverage {
            covered: pos,
            len: chars.len(),
        });
    }
    Ok(positions)
}

pub fn segment(
    text: &str,
    tokens: &[Token],
    options: SegmentOptions,
) -> Result<Vec<ReadingSpan>, SegmentError> {
    segment_with(text, tokens, options, |_| false)
}

/// Segment `text`, leaving every char offset for which `skip` returns true
/// unannotated. Spans come out sorted by position and never overlap.
pub fn segment_with<F>(
    text: &str,
    tokens: &[Token],
    options: SegmentOptions,
    skip: F,
) -> Result<Vec<ReadingSpan>, SegmentError>
where
    F: Fn(usize) -> bool,
{
    let _span = debug_span!("segment", tokens = tokens.len(), split = %options.split).entered();

    let chars: Vec<char> = text.chars().collect();
    let index = index_tokens(&chars, tokens)?;

    let mut spans = Vec::new();
    for tp in &index {
        let Some(reading) = tp.token.reading.as_deref() else {
            continue;
        };
        let surface = &chars[tp.start..tp.end];
        if !surface.iter().any(|&c| is_cjk_ideograph(c)) {
            continue;
        }
        let reading: Vec<char> = katakana_to_hiragana(reading).chars().collect();
        if reading.is_empty() {
            continue;
        }

        let touches_skipped = (tp.start..tp.end).any(&skip);
        let mut token_spans = match options.split {
            ReadingSplit::Token if !touches_skipped => {
                okurigana::align(surface, &reading, tp.start)
            }
            _ => per_character(surface, &reading, tp.start, &skip),
        };
        if options.merge_adjacent {
            merge_contiguous(&mut token_spans);
        }
        spans.extend(token_spans);
    }

    debug!(spans = spans.len());
    Ok(spans)
}

fn per_character<F>(surface: &[char], reading: &[char], offset: usize, skip: &F) -> Vec<ReadingSpan>
where
    F: Fn(usize) -> bool,
{
    let per_char = reading.len().div_ceil(surface.len());
    let mut spans = Vec::new();
    for (i, &c) in surface.iter().enumerate() {
        let position = offset + i;
        if skip(position) || !is_cjk_ideograph(c) {
            continue;
        }
        let from = i * per_char;
        if from >= reading.len() {
            continue;
        }
        let to = (from + per_char).min(reading.len());
        spans.push(ReadingSpan {
            kanji_run: c.to_string(),
            reading: reading[from..to].iter().collect(),
            position,
        });
    }
    spans
}

fn merge_contiguous(spans: &mut Vec<ReadingSpan>) {
    let mut merged: Vec<ReadingSpan> = Vec::with_capacity(spans.len());
    for span in spans.drain(..) {
        match merged.last_mut() {
            Some(prev) if prev.end() == span.position => {
                prev.kanji_run.push_str(&span.kanji_run);
                prev.reading.push_str(&span.reading);
            }
            _ => merged.push(span),
        }
    }
    *spans = merged;
}
