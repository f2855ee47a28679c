use std::fs;
use std::path::Path;

use furi_engine::{LexiconTokenizer, Tokenizer};

pub fn compile(input: &str, output: &str) {
    let lex = die!(
        LexiconTokenizer::load_tsv(Path::new(input)),
        "Error reading {input}: {}"
    );
    die!(lex.save(Path::new(output)), "Error writing {output}: {}");
    println!("OK: {} entries -> {output}", lex.len());
}

pub fn info(file: &str) {
    let bytes = die!(fs::read(file), "Error reading {file}: {}");
    let format = if bytes.starts_with(b"FRLX") {
        "compiled (FRLX)"
    } else {
        "TSV"
    };
    let lex = die!(LexiconTokenizer::load(Path::new(file)), "Error: {}");
    println!("Format:  {format}");
    println!("Size:    {} bytes", bytes.len());
    println!("Entries: {}", lex.len());
}

pub fn lookup(file: &str, surface: &str) {
    let lex = die!(LexiconTokenizer::load(Path::new(file)), "Error: {}");
    match lex.reading(surface) {
        Some(reading) => println!("{surface}\t{reading}"),
        None => println!("(not found)"),
    }
}

pub fn tokenize(file: &str, text: &str) {
    let lex = die!(LexiconTokenizer::load(Path::new(file)), "Error: {}");
    let tokens = die!(lex.tokenize(text), "Error: {}");
    let segs: Vec<String> = tokens
        .iter()
        .map(|t| match &t.reading {
            Some(reading) => format!("{}({})", t.surface_form, reading),
            None => t.surface_form.clone(),
        })
        .collect();
    println!("{}", segs.join(" | "));
}
