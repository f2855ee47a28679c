//! Global settings loaded from TOML, following the same OnceLock pattern as the
//! compound and romaji tables.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Callers that want per-instance configuration parse their own `Settings`
//! with [`parse_settings_toml`] and hand it to an `Annotator`.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::segment::ReadingSplit;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub ruby: RubySettings,
    pub pipeline: PipelineSettings,
    pub batch: BatchSettings,
}

/// Length-ratio policy for `<rt>` classes.
#[derive(Debug, Clone, Deserialize)]
pub struct RubySettings {
    pub width_factor: f64,
    pub long_threshold: f64,
    pub hidden_threshold: f64,
    pub long_class: String,
    pub hidden_class: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    pub use_compounds: bool,
    pub reading_split: ReadingSplit,
    pub merge_adjacent: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    pub max_threads: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn invalid(field: &str, reason: &str) -> SettingsError {
    SettingsError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_f64 {
        ($section:ident . $field:ident) => {
            if s.$section.$field <= 0.0 || !s.$section.$field.is_finite() {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must be a positive number",
                ));
            }
        };
    }
    macro_rules! check_class_name {
        ($section:ident . $field:ident) => {
            let v = &s.$section.$field;
            if v.is_empty()
                || !v
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(invalid(
                    concat!(stringify!($section), ".", stringify!($field)),
                    "must be a non-empty CSS class name",
                ));
            }
        };
    }

    check_positive_f64!(ruby.width_factor);
    check_positive_f64!(ruby.long_threshold);
    check_positive_f64!(ruby.hidden_threshold);
    if s.ruby.long_threshold > s.ruby.hidden_threshold {
        return Err(invalid(
            "ruby.long_threshold",
            "must not exceed ruby.hidden_threshold",
        ));
    }
    check_class_name!(ruby.long_class);
    check_class_name!(ruby.hidden_class);

    if s.batch.max_threads == 0 {
        return Err(invalid("batch.max_threads", "must be positive"));
    }

    Ok(())
}
