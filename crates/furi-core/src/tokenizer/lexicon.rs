//! Longest-match tokenizer over a surface → reading word list.
//!
//! Source format is TSV (`surface<TAB>reading`, `#` comments). A compiled
//! binary form (FRLX) loads without re-validating every line.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Token, Tokenizer, TokenizerError};
use crate::unicode::{hiragana_to_katakana, is_kana};

const MAGIC: &[u8; 4] = b"FRLX";
const VERSION: u8 = 1;
/// magic + version + crc32
const HEADER_LEN: usize = 9;

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short)")]
    InvalidHeader,

    #[error("invalid magic bytes (expected FRLX)")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("serialization error: {0}")]
    Serialize(bincode::Error),

    #[error("deserialization error: {0}")]
    Deserialize(bincode::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

#[derive(Serialize, Deserialize)]
struct LexiconRecord {
    surface: String,
    reading: String,
}

#[derive(Debug, Clone, Default)]
pub struct LexiconTokenizer {
    /// surface → katakana reading
    entries: HashMap<String, String>,
    /// Longest surface, in chars.
    max_len: usize,
}

impl LexiconTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut lex = Self::new();
        for (surface, reading) in entries {
            lex.insert(surface, reading.as_ref());
        }
        lex
    }

    /// Add a word. Hiragana readings are stored as katakana. Returns `false`
    /// if the surface was already present (the old reading is kept).
    pub fn insert(&mut self, surface: impl Into<String>, reading: &str) -> bool {
        let surface = surface.into();
        if surface.is_empty() || self.entries.contains_key(&surface) {
            return false;
        }
        self.max_len = self.max_len.max(surface.chars().count());
        self.entries.insert(surface, hiragana_to_katakana(reading));
        true
    }

    pub fn reading(&self, surface: &str) -> Option<&str> {
        self.entries.get(surface).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse_tsv(content: &str) -> Result<Self, LexiconError> {
        let mut lex = Self::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_err = |reason: &str| LexiconError::Parse {
                line: idx + 1,
                reason: reason.to_string(),
            };
            let mut fields = line.split('\t');
            let (Some(surface), Some(reading), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(parse_err("expected surface<TAB>reading"));
            };
            let (surface, reading) = (surface.trim(), reading.trim());
            if surface.is_empty() {
                return Err(parse_err("empty surface"));
            }
            if reading.is_empty() || !reading.chars().all(is_kana) {
                return Err(parse_err("reading must be kana"));
            }
            lex.insert(surface, reading);
        }
        debug!(entries = lex.len(), "parsed lexicon");
        Ok(lex)
    }

    pub fn load_tsv(path: &Path) -> Result<Self, LexiconError> {
        let content = fs::read_to_string(path)?;
        Self::parse_tsv(&content)
    }

    /// Serialize to bytes (FRLX format).
    pub fn to_bytes(&self) -> Result<Vec<u8>, LexiconError> {
        let mut records: Vec<LexiconRecord> = self
            .entries
            .iter()
            .map(|(surface, reading)| LexiconRecord {
                surface: surface.clone(),
                reading: reading.clone(),
            })
            .collect();
        records.sort_by(|a, b| a.surface.cmp(&b.surface));

        let body = bincode::serialize(&records).map_err(LexiconError::Serialize)?;
        let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Deserialize from bytes (FRLX format).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LexiconError> {
        if bytes.len() < HEADER_LEN {
            return Err(LexiconError::InvalidHeader);
        }
        if &bytes[0..4] != MAGIC {
            return Err(LexiconError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(LexiconError::UnsupportedVersion(bytes[4]));
        }
        let expected = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]);
        let body = &bytes[HEADER_LEN..];
        if crc32fast::hash(body) != expected {
            return Err(LexiconError::ChecksumMismatch);
        }
        let records: Vec<LexiconRecord> =
            bincode::deserialize(body).map_err(LexiconError::Deserialize)?;
        Ok(Self::from_entries(
            records.into_iter().map(|r| (r.surface, r.reading)),
        ))
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), LexiconError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn open(path: &Path) -> Result<Self, LexiconError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load either format, sniffing the FRLX magic.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let bytes = fs::read(path)?;
        if bytes.starts_with(MAGIC) {
            return Self::from_bytes(&bytes);
        }
        let content = String::from_utf8(bytes).map_err(|e| {
            LexiconError::Io(io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        Self::parse_tsv(&content)
    }
}

impl Tokenizer for LexiconTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut unknown = String::new();
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_len.min(chars.len() - i);
            let hit = (1..=longest).rev().find_map(|len| {
                let surface: String = chars[i..i + len].iter().collect();
                self.entries
                    .get(&surface)
                    .map(|reading| (len, Token::new(surface, reading.as_str())))
            });
            match hit {
                Some((len, token)) => {
                    if !unknown.is_empty() {
                        tokens.push(Token::bare(std::mem::take(&mut unknown)));
                    }
                    tokens.push(token);
                    i += len;
                }
                None => {
                    unknown.push(chars[i]);
                    i += 1;
                }
            }
        }
        if !unknown.is_empty() {
            tokens.push(Token::bare(unknown));
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LexiconTokenizer {
        LexiconTokenizer::from_entries([
            ("猫", "ネコ"),
            ("魚", "さかな"),
            ("好き", "スキ"),
            ("日本", "ニホン"),
            ("日本語", "ニホンゴ"),
        ])
    }

    #[test]
    fn tokenize_covers_text() {
        let tokens = sample().tokenize("猫は魚が好きです。").unwrap();
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface_form.as_str()).collect();
        assert_eq!(surfaces, vec!["猫", "は", "魚", "が", "好き", "です。"]);
        assert_eq!(tokens[2].reading.as_deref(), Some("サカナ"));
        assert_eq!(tokens[1].reading, None);
        let joined: String = surfaces.concat();
        assert_eq!(joined, "猫は魚が好きです。");
    }

    #[test]
    fn longest_match() {
        let tokens = sample().tokenize("日本語を").unwrap();
        assert_eq!(tokens[0], Token::new("日本語", "ニホンゴ"));
    }

    #[test]
    fn empty_input() {
        assert!(sample().tokenize("").unwrap().is_empty());
        assert!(LexiconTokenizer::new().tokenize("").unwrap().is_empty());
    }

    #[test]
    fn insert_keeps_first() {
        let mut lex = LexiconTokenizer::new();
        assert!(lex.insert("体", "からだ"));
        assert!(!lex.insert("体", "たい"));
        assert!(!lex.insert("", "から"));
        assert_eq!(lex.reading("体"), Some("カラダ"));
    }

    #[test]
    fn parse_tsv() {
        let tsv = "# words\n猫\tねこ\n\n魚\tサカナ\n";
        let lex = LexiconTokenizer::parse_tsv(tsv).unwrap();
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.reading("猫"), Some("ネコ"));
    }

    #[test]
    fn parse_tsv_errors() {
        let err = LexiconTokenizer::parse_tsv("猫\n").unwrap_err();
        assert!(matches!(err, LexiconError::Parse { line: 1, .. }));
        let err = LexiconTokenizer::parse_tsv("猫\tねこ\n魚\tsakana\n").unwrap_err();
        assert!(matches!(err, LexiconError::Parse { line: 2, .. }));
        let err = LexiconTokenizer::parse_tsv("a\tb\tc\n").unwrap_err();
        assert!(matches!(err, LexiconError::Parse { .. }));
    }

    #[test]
    fn bytes_roundtrip() {
        let lex = sample();
        let restored = LexiconTokenizer::from_bytes(&lex.to_bytes().unwrap()).unwrap();
        assert_eq!(restored.len(), lex.len());
        assert_eq!(restored.reading("日本語"), Some("ニホンゴ"));
    }

    #[test]
    fn from_bytes_rejects_corruption() {
        let mut bytes = sample().to_bytes().unwrap();
        assert!(matches!(
            LexiconTokenizer::from_bytes(&bytes[..4]),
            Err(LexiconError::InvalidHeader)
        ));
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            LexiconTokenizer::from_bytes(&bytes),
            Err(LexiconError::ChecksumMismatch)
        ));
        bytes[0] = b'X';
        assert!(matches!(
            LexiconTokenizer::from_bytes(&bytes),
            Err(LexiconError::InvalidMagic)
        ));
    }

    #[test]
    fn save_and_load_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("words.frlx");
        sample().save(&bin).unwrap();
        assert_eq!(LexiconTokenizer::open(&bin).unwrap().len(), 5);
        assert_eq!(LexiconTokenizer::load(&bin).unwrap().len(), 5);

        let tsv = dir.path().join("words.tsv");
        fs::write(&tsv, "体\tからだ\n").unwrap();
        assert_eq!(
            LexiconTokenizer::load(&tsv).unwrap().reading("体"),
            Some("カラダ")
        );
    }
}
