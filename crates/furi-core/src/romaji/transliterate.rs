use super::config::RomajiTable;

const SMALL_TSU: char = 'っ';

/// Transliterate hiragana to romaji using the global table.
///
/// Two-kana combinations are tried before single kana. っ doubles the first
/// letter of the following syllable's romaji (nothing at the end of the text
/// or before an unmapped char). Unmapped chars are copied through unchanged.
pub fn to_romaji(hiragana: &str) -> String {
    to_romaji_with(RomajiTable::global(), hiragana)
}

pub fn to_romaji_with(table: &RomajiTable, hiragana: &str) -> String {
    let chars: Vec<char> = hiragana.chars().collect();
    let mut out = String::with_capacity(hiragana.len());
    let mut buf = [0u8; 4];
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == SMALL_TSU {
            let next = chars
                .get(i + 1)
                .and_then(|n| table.romaji(n.encode_utf8(&mut buf)))
                .and_then(|r| r.chars().next());
            if let Some(consonant) = next {
                out.push(consonant);
            }
            i += 1;
            continue;
        }

        if let Some(&n) = chars.get(i + 1) {
            let pair: String = [c, n].iter().collect();
            if let Some(romaji) = table.romaji(&pair) {
                out.push_str(romaji);
                i += 2;
                continue;
            }
        }

        match table.romaji(c.encode_utf8(&mut buf)) {
            Some(romaji) => out.push_str(romaji),
            None => out.push(c),
        }
        i += 1;
    }
    out
}
