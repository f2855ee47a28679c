//! Hiragana ↔ romaji transliteration.
//!
//! One TOML table drives both directions: [`to_romaji`] reads it kana-first,
//! [`romaji_to_hiragana`] walks a trie built from its inverse plus input
//! aliases (`si`, `tu`, `nn`, …), handling sokuon (っ) and hatsuon (ん).

mod config;
mod convert;
mod table;
mod transliterate;
mod trie;

pub use config::{parse_romaji_toml, RomajiConfigError, RomajiTable};
pub use convert::{is_latin_query, romaji_to_hiragana, romaji_to_hiragana_with};
pub use table::default_toml;
pub use transliterate::{to_romaji, to_romaji_with};
pub use trie::{RomajiTrie, TrieLookupResult};
