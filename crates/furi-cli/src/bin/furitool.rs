use std::path::Path;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use furi_cli::commands::annotate_ops::{self, AnnotateOptions};
use furi_cli::commands::{config_ops, lexicon_ops, romaji_ops};
use furi_cli::input::InputFormat;
use furi_engine::api::{
    compounds_load_config, romaji_load_config, settings_load_config, trace_init,
};
use furi_engine::EngineError;
use furi_engine::segment::ReadingSplit;

#[derive(Parser)]
#[command(name = "furitool", about = "Furigana annotation tool", version)]
struct Cli {
    /// Custom settings TOML (replaces the embedded defaults)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Custom compound dictionary TOML
    #[arg(long, global = true)]
    compounds: Option<String>,
    /// Custom romaji table TOML
    #[arg(long, global = true)]
    romaji_table: Option<String>,
    /// Write JSON trace logs to this directory (requires --features trace)
    #[arg(long, global = true)]
    trace_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Split {
    PerCharacter,
    Token,
}

impl From<Split> for ReadingSplit {
    fn from(s: Split) -> Self {
        match s {
            Split::PerCharacter => ReadingSplit::PerCharacter,
            Split::Token => ReadingSplit::Token,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Annotate one sentence per line (file or stdin)
    Annotate {
        /// Input file; stdin when omitted or "-"
        input: Option<String>,
        /// Lexicon file (TSV or compiled)
        #[arg(long)]
        lexicon: Option<String>,
        /// Emit one JSON record per sentence
        #[arg(long)]
        json: bool,
        /// Input lines are JSON sentence records
        #[arg(long, conflicts_with = "bracketed")]
        jsonl: bool,
        /// Input lines carry inline readings, e.g. 猫(ねこ)
        #[arg(long)]
        bracketed: bool,
        /// How token readings are split over kanji
        #[arg(long, value_enum)]
        split: Option<Split>,
        /// Skip the compound dictionary
        #[arg(long)]
        no_compounds: bool,
        /// Worker threads for batch annotation
        #[arg(long)]
        threads: Option<usize>,
    },
    /// Show tokens and reading spans for a sentence
    Segment {
        /// Lexicon file
        lexicon: String,
        /// Japanese text
        text: String,
        #[arg(long, value_enum)]
        split: Option<Split>,
        #[arg(long)]
        json: bool,
    },
    /// Rewrite a sentence in hiragana
    Hiragana {
        /// Lexicon file
        lexicon: String,
        /// Japanese text
        text: String,
        #[arg(long)]
        no_compounds: bool,
    },
    /// Romaji to hiragana, or kana to romaji (auto-detected)
    Romaji {
        text: String,
    },
    /// Export default compound dictionary as TOML
    CompoundsExport,
    /// Validate a custom compound dictionary TOML file
    CompoundsValidate {
        /// Path to the TOML file
        file: String,
    },
    /// List compounds found in a text
    CompoundsLookup {
        text: String,
    },
    /// Export default romaji table as TOML
    RomajiExport,
    /// Validate a custom romaji table TOML file
    RomajiValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
    /// Compile a TSV lexicon to the binary format
    LexiconCompile {
        /// Input TSV file
        input: String,
        /// Output file
        output: String,
    },
    /// Show lexicon info (format auto-detected by magic bytes)
    LexiconInfo {
        file: String,
    },
    /// Look up a surface form in a lexicon (exact match)
    LexiconLookup {
        file: String,
        surface: String,
    },
    /// Tokenize text with a lexicon
    Tokenize {
        file: String,
        text: String,
    },
}

fn load_config(path: Option<&str>, load: fn(&Path) -> Result<(), EngineError>) {
    if let Some(path) = path {
        if let Err(e) = load(Path::new(path)) {
            eprintln!("Error loading {path}: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let _trace = cli.trace_dir.as_deref().map(|dir| {
        trace_init(Path::new(dir)).unwrap_or_else(|e| {
            eprintln!("Error starting trace in {dir}: {e}");
            process::exit(1);
        })
    });
    load_config(cli.settings.as_deref(), settings_load_config);
    load_config(cli.compounds.as_deref(), compounds_load_config);
    load_config(cli.romaji_table.as_deref(), romaji_load_config);

    match cli.command {
        Command::Annotate {
            input,
            lexicon,
            json,
            jsonl,
            bracketed,
            split,
            no_compounds,
            threads,
        } => {
            let format = if jsonl {
                InputFormat::Jsonl
            } else if bracketed {
                InputFormat::Bracketed
            } else {
                InputFormat::Plain
            };
            let opts = AnnotateOptions {
                lexicon,
                format,
                json,
                split: split.map(Into::into),
                no_compounds,
                threads,
            };
            annotate_ops::annotate_cmd(input.as_deref(), &opts);
        }
        Command::Segment {
            lexicon,
            text,
            split,
            json,
        } => annotate_ops::segment_cmd(&lexicon, &text, split.map(Into::into), json),
        Command::Hiragana {
            lexicon,
            text,
            no_compounds,
        } => annotate_ops::hiragana_cmd(&lexicon, &text, no_compounds),
        Command::Romaji { text } => romaji_ops::romaji_cmd(&text),
        Command::CompoundsExport => config_ops::compounds_export(),
        Command::CompoundsValidate { file } => config_ops::compounds_validate(&file),
        Command::CompoundsLookup { text } => config_ops::compounds_lookup(&text),
        Command::RomajiExport => config_ops::romaji_export(),
        Command::RomajiValidate { file } => config_ops::romaji_validate(&file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
        Command::LexiconCompile { input, output } => lexicon_ops::compile(&input, &output),
        Command::LexiconInfo { file } => lexicon_ops::info(&file),
        Command::LexiconLookup { file, surface } => lexicon_ops::lookup(&file, &surface),
        Command::Tokenize { file, text } => lexicon_ops::tokenize(&file, &text),
    }
}
