// ============================================================
// Layer 4 — Vocabulary Builder
// ============================================================
// Maps every normalised token to a positive integer id.
//
// Build steps:
//   1. Split each text on whitespace (punctuation was already
//      spaced out by the normalizer)
//   2. Count occurrences over the whole corpus, remembering the
//      order in which each token was first seen
//   3. Sort by count descending, first-seen ascending
//   4. Keep the top `max_size` tokens and number them 1, 2, 3...
//
// Id 0 is never assigned: it means padding or "not in vocab".
//
// The corpus is the union of training AND evaluation questions,
// so both sides of the pipeline share one table.
//
// Reference: Rust Book §8 (Hash Maps)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::sequence::PAD_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Tokens in id order: `words[i]` has id `i + 1`
    words: Vec<String>,

    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build from a corpus of normalised texts, keeping at most
    /// `max_size` tokens. An empty corpus gives an empty vocabulary.
    pub fn build<S: AsRef<str>>(corpus: &[S], max_size: usize) -> Self {
        // token → (count, first-seen position)
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

        for text in corpus {
            for token in text.as_ref().split_whitespace() {
                let next = counts.len();
                counts.entry(token).or_insert((0, next)).0 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> = counts
            .into_iter()
            .map(|(tok, (count, first))| (tok, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(max_size);

        let words = ranked.into_iter().map(|(tok, _, _)| tok.to_string()).collect();
        Self::from_words(words)
    }

    /// Rebuild from tokens already in id order.
    pub fn from_words(words: Vec<String>) -> Self {
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i as u32 + 1))
            .collect();
        Self { words, index }
    }

    /// Id for `token`, or 0 when it is out of vocabulary.
    pub fn id(&self, token: &str) -> u32 {
        self.index.get(token).copied().unwrap_or(PAD_ID)
    }

    /// Token for `id`, or `None` for 0 and out-of-range ids.
    pub fn token(&self, id: u32) -> Option<&str> {
        if id == PAD_ID {
            return None;
        }
        self.words.get(id as usize - 1).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Number of real tokens (the padding id is not counted).
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Rows needed in an embedding table: every token plus id 0.
    pub fn table_size(&self) -> usize {
        self.words.len() + 1
    }

    /// `(token, id)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i as u32 + 1))
    }

    /// Restore the lookup index after deserialising.
    pub(crate) fn reindex(self) -> Self {
        Self::from_words(self.words)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golden_tie_broken_by_first_seen() {
        let v = Vocabulary::build(&["a a b", "b c"], 2);
        assert_eq!(v.len(), 2);
        assert_eq!(v.id("a"), 1);
        assert_eq!(v.id("b"), 2);
        assert_eq!(v.id("c"), 0);
    }

    #[test]
    fn test_frequency_beats_first_seen() {
        let v = Vocabulary::build(&["x y y z z z"], 10);
        let order: Vec<&str> = v.iter().map(|(w, _)| w).collect();
        assert_eq!(order, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_cap_keeps_most_frequent() {
        let corpus = ["d d d d c c c b b a", "e"];
        let v      = Vocabulary::build(&corpus, 3);
        assert_eq!(v.len(), 3);
        for w in ["d", "c", "b"] {
            assert!(v.contains(w), "{w} should be kept");
        }
        assert!(!v.contains("a"));
        assert!(!v.contains("e"));
    }

    #[test]
    fn test_never_exceeds_cap() {
        let corpus: Vec<String> = (0..50).map(|i| format!("w{i} w{}", i % 7)).collect();
        for cap in [0, 1, 5, 20, 100] {
            assert!(Vocabulary::build(&corpus, cap).len() <= cap);
        }
    }

    #[test]
    fn test_ids_are_contiguous_from_one() {
        let v   = Vocabulary::build(&["p q r s"], 10);
        let ids: Vec<u32> = v.iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(v.token(1), Some("p"));
        assert_eq!(v.token(0), None);
        assert_eq!(v.token(99), None);
    }

    #[test]
    fn test_empty_corpus_gives_empty_vocab() {
        let v = Vocabulary::build::<&str>(&[], 10);
        assert!(v.is_empty());
        assert_eq!(v.table_size(), 1);
        let v = Vocabulary::build(&["   ", ""], 10);
        assert!(v.is_empty());
    }

    #[test]
    fn test_whitespace_split_ignores_leading_and_trailing_space() {
        let v = Vocabulary::build(&[" what is up ! "], 10);
        assert_eq!(v.len(), 4);
        assert_eq!(v.id("!"), 4);
    }

    #[test]
    fn test_serde_roundtrip_restores_index() {
        let v    = Vocabulary::build(&["a b b"], 10);
        let json = serde_json::to_string(&v).unwrap();
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        let back = back.reindex();
        assert_eq!(back.id("b"), 1);
        assert_eq!(back, v);
    }
}
