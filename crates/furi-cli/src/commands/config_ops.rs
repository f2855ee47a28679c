use std::fs;

use furi_engine::compound::{parse_compound_toml, CompoundDictionary, DEFAULT_COMPOUNDS_TOML};
use furi_engine::romaji::{default_toml as romaji_default_toml, parse_romaji_toml};
use furi_engine::settings::{default_toml as settings_default_toml, parse_settings_toml};

pub fn compounds_export() {
    print!("{DEFAULT_COMPOUNDS_TOML}");
}

pub fn compounds_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let dict = die!(parse_compound_toml(&content), "Error: {}");
    println!("OK: {} compounds", dict.len());
}

/// Print every compound found in `text`, longest first.
pub fn compounds_lookup(text: &str) {
    let matches = CompoundDictionary::global().lookup_compounds(text);
    if matches.is_empty() {
        println!("(no compounds)");
        return;
    }
    for m in matches {
        println!("[{},{}] {} ({})", m.start, m.end, m.compound, m.reading);
    }
}

pub fn romaji_export() {
    print!("{}", romaji_default_toml());
}

pub fn romaji_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let table = die!(parse_romaji_toml(&content), "Error: {}");
    println!("OK: {} kana", table.len());
}

pub fn settings_export() {
    print!("{}", settings_default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: ruby.width_factor={}, pipeline.reading_split={}, batch.max_threads={}",
        s.ruby.width_factor, s.pipeline.reading_split, s.batch.max_threads
    );
}
