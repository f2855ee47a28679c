use std::collections::HashMap;
use std::sync::OnceLock;

use super::config::RomajiTable;

#[derive(Debug, PartialEq)]
pub enum TrieLookupResult {
    None,
    Prefix,
    Exact(String),
    ExactAndPrefix(String),
}

#[derive(Default)]
struct Node {
    children: HashMap<u8, Node>,
    kana: Option<String>,
}

/// Byte trie over the romaji → kana direction of a [`RomajiTable`].
pub struct RomajiTrie {
    root: Node,
}

impl RomajiTrie {
    pub fn from_table(table: &RomajiTable) -> Self {
        let mut trie = RomajiTrie {
            root: Node::default(),
        };
        for (romaji, kana) in table.inputs() {
            trie.insert(romaji, kana);
        }
        trie
    }

    /// Get or initialize the global singleton, built from [`RomajiTable::global`].
    pub fn global() -> &'static RomajiTrie {
        static INSTANCE: OnceLock<RomajiTrie> = OnceLock::new();
        INSTANCE.get_or_init(|| RomajiTrie::from_table(RomajiTable::global()))
    }

    pub fn lookup(&self, romaji: &str) -> TrieLookupResult {
        let mut node = &self.root;
        for &b in romaji.as_bytes() {
            match node.children.get(&b) {
                Some(child) => node = child,
                None => return TrieLookupResult::None,
            }
        }
        let has_children = !node.children.is_empty();
        match (&node.kana, has_children) {
            (None, false) => TrieLookupResult::None,
            (None, true) => TrieLookupResult::Prefix,
            (Some(kana), false) => TrieLookupResult::Exact(kana.clone()),
            (Some(kana), true) => TrieLookupResult::ExactAndPrefix(kana.clone()),
        }
    }

    fn insert(&mut self, romaji: &str, kana: &str) {
        let mut node = &mut self.root;
        for &b in romaji.as_bytes() {
            node = node.children.entry(b).or_default();
        }
        node.kana = Some(kana.to_string());
    }
}
