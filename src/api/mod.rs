//! Caller-facing layer: the annotation context, sentence records, and
//! process-wide config loading.

mod engine;
mod handle;
mod types;

pub use engine::FuriganaEngine;
pub use handle::TokenizerHandle;
pub use types::{parse_sentence_json, AnnotatedPair, EngineError, Sentence};

use std::path::Path;

use furi_core::compound::CompoundDictionary;
use furi_core::romaji::RomajiTable;

use crate::trace_init::{TraceError, TraceGuard};

// ---------------------------------------------------------------------------
// Top-level functions
// ---------------------------------------------------------------------------

pub fn engine_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn read_config(path: &Path) -> Result<String, EngineError> {
    std::fs::read_to_string(path).map_err(|e| EngineError::Io {
        msg: format!("{}: {e}", path.display()),
    })
}

/// Replace the default settings. Must run before anything reads them.
pub fn settings_load_config(path: &Path) -> Result<(), EngineError> {
    let content = read_config(path)?;
    furi_core::settings::init_custom(content)
        .map_err(|e| EngineError::InvalidData { msg: e.to_string() })
}

/// Replace the default compound table. Must run before the first annotator
/// is built.
pub fn compounds_load_config(path: &Path) -> Result<(), EngineError> {
    let content = read_config(path)?;
    CompoundDictionary::init_custom(content)
        .map_err(|e| EngineError::InvalidData { msg: e.to_string() })
}

pub fn romaji_load_config(path: &Path) -> Result<(), EngineError> {
    let content = read_config(path)?;
    RomajiTable::init_custom(content).map_err(|e| EngineError::InvalidData { msg: e.to_string() })
}

pub fn settings_default_config() -> String {
    furi_core::settings::default_toml().to_string()
}

pub fn compounds_default_config() -> String {
    furi_core::compound::DEFAULT_COMPOUNDS_TOML.to_string()
}

pub fn romaji_default_config() -> String {
    furi_core::romaji::default_toml().to_string()
}

/// Start JSON tracing into `log_dir`; keep the guard until the run ends.
pub fn trace_init(log_dir: &Path) -> Result<TraceGuard, TraceError> {
    crate::trace_init::init_tracing(log_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            settings_load_config(&missing),
            Err(EngineError::Io { .. })
        ));
        assert!(matches!(
            compounds_load_config(&missing),
            Err(EngineError::Io { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_install() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[kana]\n").unwrap();
        assert!(matches!(
            romaji_load_config(&path),
            Err(EngineError::InvalidData { .. })
        ));
    }

    #[test]
    fn defaults_are_exported() {
        assert!(settings_default_config().contains("[ruby]"));
        assert!(compounds_default_config().contains("一員同様"));
        assert!(romaji_default_config().contains("[kana]"));
        assert!(!engine_version().is_empty());
    }
}
