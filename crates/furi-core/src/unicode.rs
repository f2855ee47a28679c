//! Character-level Unicode classification and kana conversion for Japanese text.

/// Distance between a hiragana codepoint and its katakana counterpart.
const KANA_OFFSET: u32 = 0x60;

/// Check the full Hiragana block (U+3040..U+309F). A few unassigned codepoints
/// are included, but they never appear in tokenizer readings.
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Check the full Katakana block (U+30A0..U+30FF), prolonged sound mark included.
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

/// Broad kanji check: CJK Unified Ideographs plus Extension A and B.
pub fn is_kanji(c: char) -> bool {
    is_cjk_ideograph(c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

/// CJK Unified Ideographs only (U+4E00..U+9FFF).
///
/// This is the set of characters the segmenter annotates. Extension blocks
/// and the iteration mark 々 are outside it.
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

pub fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic()
}

pub fn contains_kanji(s: &str) -> bool {
    s.chars().any(is_cjk_ideograph)
}

/// Convert a katakana string to hiragana.
///
/// Only ァ..ヶ (U+30A1..U+30F6) have hiragana counterparts; ー, ヷ and the
/// rest of the block are passed through unchanged.
pub fn katakana_to_hiragana(s: &str) -> String {
    s.chars().map(katakana_to_hiragana_char).collect()
}

pub fn katakana_to_hiragana_char(c: char) -> char {
    if ('\u{30A1}'..='\u{30F6}').contains(&c) {
        char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

/// Convert a hiragana string to katakana.
/// Non-hiragana characters (ー, ASCII, etc.) are passed through unchanged.
pub fn hiragana_to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if ('\u{3041}'..='\u{3096}').contains(&c) {
                char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Check if a string is a valid hiragana reading.
///
/// Accepts hiragana characters (U+3040..U+309F) and the prolonged sound mark
/// ー (U+30FC, technically katakana) which commonly appears in readings like
/// "らーめん".
pub fn is_hiragana_reading(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| is_hiragana(c) || c == 'ー')
}
