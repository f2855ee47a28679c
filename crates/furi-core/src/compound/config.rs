use std::collections::BTreeMap;

use serde::Deserialize;

use crate::unicode::is_hiragana_reading;

#[derive(Deserialize)]
struct CompoundConfig {
    compounds: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CompoundConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[compounds] table is empty")]
    Empty,
    #[error("compound must be at least two characters: {0}")]
    TooShort(String),
    #[error("reading for {0} is not hiragana")]
    InvalidReading(String),
    #[error("compound dictionary already initialized")]
    AlreadyInitialized,
}

/// Parse TOML text into a sorted `BTreeMap<compound, reading>`.
pub fn parse_compound_toml(
    toml_str: &str,
) -> Result<BTreeMap<String, String>, CompoundConfigError> {
    let config: CompoundConfig =
        toml::from_str(toml_str).map_err(|e| CompoundConfigError::Parse(e.to_string()))?;

    if config.compounds.is_empty() {
        return Err(CompoundConfigError::Empty);
    }

    for (key, value) in &config.compounds {
        if key.chars().count() < 2 {
            return Err(CompoundConfigError::TooShort(key.clone()));
        }
        if !is_hiragana_reading(value) {
            return Err(CompoundConfigError::InvalidReading(key.clone()));
        }
    }

    Ok(config.compounds)
}
