use furi_engine::romaji::{is_latin_query, romaji_to_hiragana, to_romaji};
use furi_engine::unicode::katakana_to_hiragana;

/// Latin input is read as romaji and comes back as hiragana; anything else is
/// transliterated to romaji.
pub fn convert(text: &str) -> String {
    if is_latin_query(text) {
        romaji_to_hiragana(text)
    } else {
        to_romaji(&katakana_to_hiragana(text))
    }
}

pub fn romaji_cmd(text: &str) {
    println!("{}", convert(text));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_directions() {
        assert_eq!(convert("gakkou"), "がっこう");
        assert_eq!(convert("がっこう"), "gakkou");
        assert_eq!(convert("トウキョウ"), "toukyou");
    }
}
