use super::trie::{RomajiTrie, TrieLookupResult};

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'i' | 'u' | 'e' | 'o')
}

/// True when `query` looks like romaji: ASCII letters, spaces and `-` only,
/// with at least one letter.
pub fn is_latin_query(query: &str) -> bool {
    query.chars().any(|c| c.is_ascii_alphabetic())
        && query
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_ascii_whitespace() || c == '-' || c == '\'')
}

/// Convert romaji to hiragana using the global table.
///
/// Input is case-insensitive. Sequences with no mapping are copied through
/// unchanged, so the conversion never fails.
pub fn romaji_to_hiragana(input: &str) -> String {
    romaji_to_hiragana_with(RomajiTrie::global(), input)
}

pub fn romaji_to_hiragana_with(trie: &RomajiTrie, input: &str) -> String {
    let mut composed = String::with_capacity(input.len() * 3);
    let mut pending = input.to_ascii_lowercase();

    while !pending.is_empty() {
        match trie.lookup(&pending) {
            TrieLookupResult::Exact(kana) | TrieLookupResult::ExactAndPrefix(kana) => {
                composed.push_str(&kana);
                pending.clear();
            }
            TrieLookupResult::Prefix | TrieLookupResult::None => {
                drain_front(trie, &mut composed, &mut pending);
            }
        }
    }
    composed
}

/// `pending` has no full match: consume its longest matching prefix, or a
/// sokuon/hatsuon, or else its first char as-is. Always consumes something.
fn drain_front(trie: &RomajiTrie, composed: &mut String, pending: &mut String) {
    // "nni" is ん + に, not nn + i
    let bytes = pending.as_bytes();
    if bytes.len() > 2
        && bytes[0] == b'n'
        && bytes[1] == b'n'
        && (is_vowel(bytes[2] as char) || bytes[2] == b'y')
    {
        composed.push('ん');
        pending.remove(0);
        return;
    }

    for len in (1..pending.len()).rev() {
        if !pending.is_char_boundary(len) {
            continue;
        }
        match trie.lookup(&pending[..len]) {
            TrieLookupResult::Exact(kana) | TrieLookupResult::ExactAndPrefix(kana) => {
                composed.push_str(&kana);
                pending.drain(..len);
                return;
            }
            _ => {}
        }
    }

    let mut chars = pending.chars();
    let first = chars.next();
    let second = chars.next();
    match (first, second) {
        (Some(first), Some(second))
            if first.is_ascii_alphabetic()
                && first != 'n'
                && !is_vowel(first)
                && (first == second || (first == 't' && second == 'c')) =>
        {
            // Sokuon (っ): doubled consonant, or Hepburn "tch"
            composed.push('っ');
            pending.remove(0);
        }
        (Some('n'), Some(second)) if !is_vowel(second) && second != 'n' && second != 'y' => {
            // Hatsuon (ん): n before non-vowel, non-n, non-y
            composed.push('ん');
            pending.remove(0);
        }
        (Some(_), _) => {
            composed.push(pending.remove(0));
        }
        (None, _) => {}
    }
}
