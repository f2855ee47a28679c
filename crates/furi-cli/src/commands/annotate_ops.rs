use std::path::Path;

use furi_engine::segment::{segment, ReadingSplit};
use furi_engine::settings::settings;
use furi_engine::{Annotator, FuriganaEngine, LexiconTokenizer, Tokenizer, TokenizerHandle};

use crate::input::{parse_sentences, read_source, InputFormat};
use crate::report::{format_pair, format_segmentation};

pub struct AnnotateOptions {
    pub lexicon: Option<String>,
    pub format: InputFormat,
    pub json: bool,
    pub split: Option<ReadingSplit>,
    pub no_compounds: bool,
    pub threads: Option<usize>,
}

fn annotator(split: Option<ReadingSplit>, no_compounds: bool) -> Annotator {
    let mut annotator = Annotator::default();
    if let Some(split) = split {
        annotator = annotator.with_split(split);
    }
    if no_compounds {
        annotator = annotator.with_compounds_enabled(false);
    }
    annotator
}

/// Without `--lexicon` only sentences that carry their own readings are
/// annotated; the rest come back degraded.
fn build_engine(opts: &AnnotateOptions) -> FuriganaEngine {
    let engine = match opts.lexicon.as_deref() {
        Some(path) => FuriganaEngine::from_lexicon_path(path),
        None => FuriganaEngine::with_handle(
            settings(),
            TokenizerHandle::unavailable("no --lexicon given"),
        ),
    };
    let engine = engine.with_annotator(annotator(opts.split, opts.no_compounds));
    match opts.threads {
        Some(n) => engine.with_max_threads(n),
        None => engine,
    }
}

pub fn annotate_cmd(input: Option<&str>, opts: &AnnotateOptions) {
    let content = die!(read_source(input), "Error: {}");
    let engine = build_engine(opts);

    let mut sentences = Vec::new();
    let mut skipped = 0;
    for parsed in parse_sentences(&content, opts.format) {
        match parsed {
            Ok(sentence) => sentences.push(sentence),
            Err(e) => {
                eprintln!("Skipping {e}");
                skipped += 1;
            }
        }
    }

    let pairs = engine.annotate_batch(&sentences);
    for pair in &pairs {
        let line = die!(format_pair(pair, opts.json), "Error encoding output: {}");
        println!("{line}");
    }

    let degraded = pairs.iter().filter(|p| p.is_degraded()).count();
    if degraded > 0 || skipped > 0 {
        eprintln!(
            "{} sentences: {} degraded, {} skipped",
            pairs.len() + skipped,
            degraded,
            skipped
        );
    }
}

fn open_lexicon(file: &str) -> LexiconTokenizer {
    die!(
        LexiconTokenizer::load(Path::new(file)),
        "Error opening lexicon: {}"
    )
}

pub fn hiragana_cmd(lexicon: &str, text: &str, no_compounds: bool) {
    let lex = open_lexicon(lexicon);
    let kana = die!(
        annotator(None, no_compounds).try_to_hiragana(text, Some(&lex)),
        "Error: {}"
    );
    println!("{kana}");
}

/// Show how `text` is tokenized and which reading spans survive segmentation.
pub fn segment_cmd(lexicon: &str, text: &str, split: Option<ReadingSplit>, json: bool) {
    let lex = open_lexicon(lexicon);
    let options = annotator(split, false).segment_options();
    let tokens = die!(lex.tokenize(text), "Error: {}");
    let spans = die!(segment(text, &tokens, options), "Error: {}");

    if json {
        let value = serde_json::json!({
            "text": text,
            "split": options.split.to_string(),
            "tokens": tokens,
            "spans": spans,
        });
        let out = die!(
            serde_json::to_string_pretty(&value),
            "Error encoding output: {}"
        );
        println!("{out}");
    } else {
        print!(
            "{}",
            format_segmentation(text, &tokens, &spans, &settings().ruby)
        );
    }
}
