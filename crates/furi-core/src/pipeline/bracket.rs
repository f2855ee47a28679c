//! Inline bracketed readings: `猫(ねこ)`, `魚[さかな]`, `好（す）き`.

use super::{ExplicitReading, StructuredSentence};
use crate::markup::find_ruby;
use crate::unicode::{is_kana, is_kanji, katakana_to_hiragana};

fn closing(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '（' => Some('）'),
        _ => None,
    }
}

fn is_base_char(c: char) -> bool {
    is_kanji(c) || c == '々'
}

/// Split inline readings out of `text`.
///
/// A bracket is a reading only when it directly follows a kanji run and holds
/// nothing but kana. Anything else, including an unbalanced bracket, stays in
/// `cleaned` as written. Existing `<ruby>` elements are copied to `cleaned`
/// untouched and count as their base text when computing positions.
pub fn parse_bracketed(text: &str) -> StructuredSentence {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let elements = find_ruby(text);
    let mut elements = elements.iter().peekable();

    let mut cleaned = String::with_capacity(text.len());
    // `cleaned` with each ruby element reduced to its base.
    let mut plain: Vec<char> = Vec::with_capacity(chars.len());
    let mut readings = Vec::new();
    // A run may only be annotated once, and never reaches into a ruby base.
    let mut claimed = 0;
    let mut i = 0;

    while i < chars.len() {
        let (byte, c) = chars[i];
        if let Some(el) = elements.next_if(|el| el.start == byte) {
            cleaned.push_str(el.markup);
            plain.extend(el.base.chars());
            claimed = plain.len();
            i += chars[i..].partition_point(|&(b, _)| b < el.end);
            continue;
        }

        let Some(close) = closing(c) else {
            cleaned.push(c);
            plain.push(c);
            i += 1;
            continue;
        };

        let content_end = chars[i + 1..]
            .iter()
            .position(|&(_, ch)| ch == close)
            .map(|off| i + 1 + off);
        let run_start = plain
            .iter()
            .rposition(|&ch| !is_base_char(ch))
            .map_or(0, |p| p + 1)
            .max(claimed);

        match content_end {
            Some(end)
                if run_start < plain.len()
                    && end > i + 1
                    && chars[i + 1..end].iter().all(|&(_, ch)| is_kana(ch)) =>
            {
                let reading: String = chars[i + 1..end].iter().map(|&(_, ch)| ch).collect();
                readings.push(ExplicitReading {
                    reading: katakana_to_hiragana(&reading),
                    kanji: plain[run_start..].iter().collect(),
                    position: run_start,
                });
                claimed = plain.len();
                i = end + 1;
            }
            _ => {
                cleaned.push(c);
                plain.push(c);
                i += 1;
            }
        }
    }

    StructuredSentence {
        raw: text.to_string(),
        cleaned,
        readings,
    }
}
