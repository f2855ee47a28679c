//! Markup-aware text rewriting.
//!
//! Already-annotated spans are lifted out of the text before segmentation and
//! put back afterwards. Instead of embedding sentinel strings in the text, the
//! protected spans are tracked as `{start, end, payload}` ranges over a plain
//! rendition of the text in which each `<ruby>` element is reduced to its base.
//! The tokenizer therefore sees natural text, and nothing in the input can
//! collide with a placeholder.
//!
//! All offsets are char offsets into [`ProtectedText::plain`].

mod parse;

pub use parse::{find_ruby, RubyElement};

use std::iter;

use tracing::{debug, debug_span};

use crate::ruby::AnnotatedFragment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSpan {
    pub start: usize,
    pub end: usize,
    pub payload: AnnotatedFragment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedText {
    plain: String,
    char_len: usize,
    /// Non-overlapping, sorted by `(start, end)`.
    spans: Vec<ProtectedSpan>,
}

/// Lift every complete `<ruby>` element out of `text`.
pub fn protect(text: &str) -> ProtectedText {
    let _span = debug_span!("protect", len = text.len()).entered();

    let mut plain = String::with_capacity(text.len());
    let mut spans = Vec::new();
    let mut cursor = 0;
    let mut char_pos = 0;

    for el in find_ruby(text) {
        let between = &text[cursor..el.start];
        plain.push_str(between);
        char_pos += between.chars().count();

        let base_len = el.base.chars().count();
        plain.push_str(el.base);
        spans.push(ProtectedSpan {
            start: char_pos,
            end: char_pos + base_len,
            payload: AnnotatedFragment::from_markup(el.markup),
        });
        char_pos += base_len;
        cursor = el.end;
    }
    let tail = &text[cursor..];
    plain.push_str(tail);
    char_pos += tail.chars().count();

    debug!(fragments = spans.len());
    ProtectedText {
        plain,
        char_len: char_pos,
        spans,
    }
}

/// Replace each span's range in `plain` with its payload.
pub fn restore(plain: &str, spans: &[ProtectedSpan]) -> String {
    let offsets: Vec<usize> = plain
        .char_indices()
        .map(|(b, _)| b)
        .chain(iter::once(plain.len()))
        .collect();

    let mut order: Vec<&ProtectedSpan> = spans.iter().collect();
    order.sort_by_key(|s| (s.start, s.end));

    // Descending, so earlier byte offsets stay valid while splicing.
    let mut out = plain.to_string();
    for span in order.into_iter().rev() {
        let (Some(&from), Some(&to)) = (offsets.get(span.start), offsets.get(span.end)) else {
            continue;
        };
        out.replace_range(from..to, span.payload.as_str());
    }
    out
}

impl ProtectedText {
    pub fn plain(&self) -> &str {
        &self.plain
    }

    pub fn spans(&self) -> &[ProtectedSpan] {
        &self.spans
    }

    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn into_parts(self) -> (String, Vec<ProtectedSpan>) {
        (self.plain, self.spans)
    }

    pub fn is_protected(&self, pos: usize) -> bool {
        let idx = self.spans.partition_point(|s| s.start <= pos);
        idx > 0 && pos < self.spans[idx - 1].end
    }

    /// True if `start..end` shares at least one char with an existing span.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|s| start < s.end && s.start < end)
    }

    /// Protect `start..end` with `payload`. Returns `false` and leaves the
    /// text untouched if the range is out of bounds, empty, or overlaps an
    /// existing span.
    pub fn protect_range(&mut self, start: usize, end: usize, payload: AnnotatedFragment) -> bool {
        if start >= end || end > self.char_len || self.overlaps(start, end) {
            return false;
        }
        let idx = self.spans.partition_point(|s| (s.start, s.end) <= (start, end));
        self.spans.insert(
            idx,
            ProtectedSpan {
                start,
                end,
                payload,
            },
        );
        true
    }

    pub fn restore(&self) -> String {
        restore(&self.plain, &self.spans)
    }
}
