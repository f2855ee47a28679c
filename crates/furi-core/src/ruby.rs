//! Ruby markup rendering.
//!
//! Turns a (kanji run, reading) pair into `<ruby>` markup. The `<rt>` class is
//! a layout hint derived from how much wider the reading is than its base:
//! `ratio = reading_len / (kanji_len * width_factor)`.

use std::fmt;

use crate::settings::{settings, RubySettings};

/// Rendering hint for a reading, from its length ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRatioClass {
    /// Fits over its base; no class.
    None,
    /// Noticeably longer than its base; the stylesheet scales it down.
    Scaled,
    /// Far longer than its base; kept in the markup but visually hidden.
    Hidden,
}

/// A finished piece of ruby markup. Never re-scanned by later passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedFragment {
    html: String,
}

impl AnnotatedFragment {
    /// Wrap markup that is already known to be well-formed, e.g. a `<ruby>`
    /// span lifted verbatim out of the input.
    pub fn from_markup(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }
}

impl fmt::Display for AnnotatedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

pub fn length_ratio(kanji_run: &str, reading: &str, width_factor: f64) -> f64 {
    let kanji_len = kanji_run.chars().count();
    if kanji_len == 0 {
        return 0.0;
    }
    reading.chars().count() as f64 / (kanji_len as f64 * width_factor)
}

/// Classify a reading. Both thresholds are exclusive: a ratio exactly at
/// `hidden_threshold` is `Scaled`, exactly at `long_threshold` is `None`.
pub fn classify(kanji_run: &str, reading: &str, style: &RubySettings) -> LengthRatioClass {
    let ratio = length_ratio(kanji_run, reading, style.width_factor);
    if ratio > style.hidden_threshold {
        LengthRatioClass::Hidden
    } else if ratio > style.long_threshold {
        LengthRatioClass::Scaled
    } else {
        LengthRatioClass::None
    }
}

/// Render with the global settings.
pub fn render(kanji_run: &str, reading: &str) -> AnnotatedFragment {
    render_with(kanji_run, reading, &settings().ruby)
}

pub fn render_with(kanji_run: &str, reading: &str, style: &RubySettings) -> AnnotatedFragment {
    let class = match classify(kanji_run, reading, style) {
        LengthRatioClass::None => "",
        LengthRatioClass::Scaled => style.long_class.as_str(),
        LengthRatioClass::Hidden => style.hidden_class.as_str(),
    };
    let kanji = escape_text(kanji_run);
    let reading = escape_text(reading);
    AnnotatedFragment {
        html: format!("<ruby>{kanji}<rt class=\"{class}\">{reading}</rt></ruby>"),
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
