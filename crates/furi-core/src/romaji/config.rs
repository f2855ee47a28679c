use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::unicode::is_hiragana;

#[derive(Deserialize)]
struct RomajiConfig {
    kana: BTreeMap<String, String>,
    #[serde(default)]
    input_aliases: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RomajiConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[kana] table is empty")]
    Empty,
    #[error("kana key must be one or two hiragana (not っ): {0}")]
    InvalidKanaKey(String),
    #[error("romaji for {0} must be non-empty lowercase ASCII")]
    InvalidRomaji(String),
    #[error("input alias {0} must be non-empty ASCII mapping to kana")]
    InvalidAlias(String),
    #[error("romaji table already initialized")]
    AlreadyInitialized,
}

/// Both directions of the transliteration table.
#[derive(Debug, Clone)]
pub struct RomajiTable {
    kana_to_romaji: HashMap<String, String>,
    /// Sorted so trie construction is deterministic.
    romaji_to_kana: BTreeMap<String, String>,
}

impl RomajiTable {
    pub fn romaji(&self, kana: &str) -> Option<&str> {
        self.kana_to_romaji.get(kana).map(String::as_str)
    }

    pub fn kana(&self, romaji: &str) -> Option<&str> {
        self.romaji_to_kana.get(romaji).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kana_to_romaji.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kana_to_romaji.is_empty()
    }

    pub(super) fn inputs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.romaji_to_kana
            .iter()
            .map(|(r, k)| (r.as_str(), k.as_str()))
    }
}

fn valid_kana_key(key: &str) -> bool {
    let n = key.chars().count();
    (1..=2).contains(&n) && key.chars().all(|c| is_hiragana(c) && c != 'っ')
}

fn valid_romaji(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_lowercase())
}

/// Parse and validate TOML text into a [`RomajiTable`].
///
/// The reverse map takes the first kana (in key order) for each romaji, so
/// `ji` reads back as じ rather than ぢ. Input aliases are applied on top.
pub fn parse_romaji_toml(toml_str: &str) -> Result<RomajiTable, RomajiConfigError> {
    let config: RomajiConfig =
        toml::from_str(toml_str).map_err(|e| RomajiConfigError::Parse(e.to_string()))?;

    if config.kana.is_empty() {
        return Err(RomajiConfigError::Empty);
    }

    let mut romaji_to_kana = BTreeMap::new();
    for (kana, romaji) in &config.kana {
        if !valid_kana_key(kana) {
            return Err(RomajiConfigError::InvalidKanaKey(kana.clone()));
        }
        if !valid_romaji(romaji) {
            return Err(RomajiConfigError::InvalidRomaji(kana.clone()));
        }
        romaji_to_kana
            .entry(romaji.clone())
            .or_insert_with(|| kana.clone());
    }

    for (alias, kana) in config.input_aliases {
        if alias.is_empty() || !alias.is_ascii() || kana.is_empty() {
            return Err(RomajiConfigError::InvalidAlias(alias));
        }
        romaji_to_kana.insert(alias.to_ascii_lowercase(), kana);
    }

    Ok(RomajiTable {
        kana_to_romaji: config.kana.into_iter().collect(),
        romaji_to_kana,
    })
}
