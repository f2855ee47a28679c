use std::sync::OnceLock;

use super::config::{parse_romaji_toml, RomajiConfigError, RomajiTable};

pub(crate) const DEFAULT_TOML: &str = include_str!("default_romaji.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// The embedded default table, for export.
pub fn default_toml() -> &'static str {
    DEFAULT_TOML
}

impl RomajiTable {
    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), RomajiConfigError> {
        // Validate eagerly
        parse_romaji_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| RomajiConfigError::AlreadyInitialized)
    }

    /// Get or initialize the global table.
    pub fn global() -> &'static RomajiTable {
        static INSTANCE: OnceLock<RomajiTable> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_TOML);
            parse_romaji_toml(toml_str).expect("romaji TOML must be valid")
        })
    }
}
