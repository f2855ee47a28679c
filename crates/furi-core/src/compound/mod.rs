//! Compound-word reading overrides.
//!
//! A static table of multi-kanji words whose tokenizer reading is wrong
//! (irregular or idiomatic readings). Entries are ordered longest-first once at
//! construction so a longer compound is never shadowed by a shorter one that
//! shares its prefix.

mod config;

pub use config::{parse_compound_toml, CompoundConfigError};

use std::sync::OnceLock;

pub const DEFAULT_COMPOUNDS_TOML: &str = include_str!("default_compounds.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundEntry {
    pub compound: String,
    pub reading: String,
}

/// A compound found in a text, in char offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundMatch {
    pub start: usize,
    pub end: usize,
    pub compound: String,
    pub reading: String,
}

#[derive(Debug, Clone)]
pub struct CompoundDictionary {
    /// Sorted by descending char length, then lexicographically.
    entries: Vec<CompoundEntry>,
    chars: Vec<Vec<char>>,
}

impl CompoundDictionary {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<CompoundEntry> = entries
            .into_iter()
            .map(|(k, v)| CompoundEntry {
                compound: k.into(),
                reading: v.into(),
            })
            .filter(|e| !e.compound.is_empty())
            .collect();
        entries.sort_by(|a, b| {
            b.compound
                .chars()
                .count()
                .cmp(&a.compound.chars().count())
                .then_with(|| a.compound.cmp(&b.compound))
        });
        entries.dedup_by(|a, b| a.compound == b.compound);
        let chars = entries.iter().map(|e| e.compound.chars().collect()).collect();
        Self { entries, chars }
    }

    /// Set custom TOML before first `global()` call.
    pub fn init_custom(toml_content: String) -> Result<(), CompoundConfigError> {
        parse_compound_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| CompoundConfigError::AlreadyInitialized)
    }

    /// Get or initialize the process-wide dictionary.
    pub fn global() -> &'static CompoundDictionary {
        static INSTANCE: OnceLock<CompoundDictionary> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML
                .get()
                .map(|s| s.as_str())
                .unwrap_or(DEFAULT_COMPOUNDS_TOML);
            let map = parse_compound_toml(toml_str).expect("compound TOML must be valid");
            CompoundDictionary::from_entries(map)
        })
    }

    pub fn entries(&self) -> &[CompoundEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, compound: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.compound == compound)
            .map(|e| e.reading.as_str())
    }

    /// Find every compound in `text`, scanning left to right and taking the
    /// longest entry that matches at each position.
    pub fn lookup_compounds(&self, text: &str) -> Vec<CompoundMatch> {
        self.lookup_compounds_where(text, |_, _| true)
    }

    /// Like [`lookup_compounds`](Self::lookup_compounds), but a candidate
    /// `start..end` range is only taken when `accept` agrees. A rejected
    /// candidate lets shorter entries at the same position compete.
    pub fn lookup_compounds_where<F>(&self, text: &str, accept: F) -> Vec<CompoundMatch>
    where
        F: Fn(usize, usize) -> bool,
    {
        let chars: Vec<char> = text.chars().collect();
        let mut matches = Vec::new();
        if self.entries.is_empty() {
            return matches;
        }

        let mut i = 0;
        while i < chars.len() {
            let hit = self.chars.iter().enumerate().find(|(_, key)| {
                chars[i..].starts_with(key) && accept(i, i + key.len())
            });
            match hit {
                Some((idx, key)) => {
                    let entry = &self.entries[idx];
                    matches.push(CompoundMatch {
                        start: i,
                        end: i + key.len(),
                        compound: entry.compound.clone(),
                        reading: entry.reading.clone(),
                    });
                    i += key.len();
                }
                None => i += 1,
            }
        }
        matches
    }

    /// Replace every compound in `text` with its plain reading.
    pub fn substitute_readings(&self, text: &str) -> String {
        let matches = self.lookup_compounds(text);
        if matches.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut next = matches.iter().peekable();
        let mut skip_until = 0;
        for (i, c) in text.chars().enumerate() {
            if i < skip_until {
                continue;
            }
            if let Some(m) = next.peek() {
                if m.start == i {
                    out.push_str(&m.reading);
                    skip_until = m.end;
                    next.next();
                    continue;
                }
            }
            out.push(c);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> CompoundDictionary {
        CompoundDictionary::from_entries([
            ("一員", "いちいん"),
            ("一員同様", "いちいんどうよう"),
            ("同様", "どうよう"),
        ])
    }

    #[test]
    fn entries_sorted_longest_first() {
        let d = dict();
        let keys: Vec<&str> = d.entries().iter().map(|e| e.compound.as_str()).collect();
        assert_eq!(keys, vec!["一員同様", "一員", "同様"]);
    }

    #[test]
    fn longest_match_wins() {
        let matches = dict().lookup_compounds("彼は一員同様に");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].compound, "一員同様");
        assert_eq!(matches[0].reading, "いちいんどうよう");
        assert_eq!((matches[0].start, matches[0].end), (2, 6));
    }

    #[test]
    fn shorter_entries_match_separately() {
        let matches = dict().lookup_compounds("一員と同様");
        let found: Vec<(&str, usize)> = matches
            .iter()
            .map(|m| (m.compound.as_str(), m.start))
            .collect();
        assert_eq!(found, vec![("一員", 0), ("同様", 3)]);
    }

    #[test]
    fn repeated_occurrences() {
        let matches = dict().lookup_compounds("一員、一員");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[1].start, 3);
    }

    #[test]
    fn rejected_candidate_falls_back_to_shorter() {
        // Pretend chars 2..4 are already claimed.
        let matches = dict().lookup_compounds_where("一員同様", |s, e| !(s < 4 && e > 2));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].compound, "一員");
    }

    #[test]
    fn no_match() {
        assert!(dict().lookup_compounds("猫は魚が好きです。").is_empty());
        assert!(dict().lookup_compounds("").is_empty());
    }

    #[test]
    fn lookup_exact() {
        let d = dict();
        assert_eq!(d.lookup("同様"), Some("どうよう"));
        assert_eq!(d.lookup("様"), None);
    }

    #[test]
    fn substitute_readings() {
        let d = dict();
        assert_eq!(d.substitute_readings("彼は一員同様に"), "彼はいちいんどうように");
        assert_eq!(d.substitute_readings("猫"), "猫");
    }

    #[test]
    fn global_has_defaults() {
        let d = CompoundDictionary::global();
        assert_eq!(d.len(), 6);
        assert_eq!(d.lookup("体中"), Some("からだじゅう"));
        assert_eq!(d.entries()[0].compound, "一員同様");
    }

    #[test]
    fn duplicates_collapse() {
        let d = CompoundDictionary::from_entries([("体中", "からだじゅう"), ("体中", "たいちゅう")]);
        assert_eq!(d.len(), 1);
    }
}
