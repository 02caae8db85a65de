// ============================================================
// Layer 3 — QuestionPair Domain Type
// ============================================================
// One row of the dataset: two free-text questions and, for
// training rows, whether they ask the same thing.
//
// Example:
//   question1: "How do I learn Rust quickly?"
//   question2: "What is the fastest way to learn Rust?"
//   is_duplicate: Some(true)
//
// Evaluation rows carry `is_duplicate: None`.
//
// A loaded pair is never edited in place. Normalisation returns
// a new QuestionPair so the raw text stays available.

use serde::{Deserialize, Serialize};

/// Placeholder substituted for a missing question before cleaning.
pub const MISSING_TEXT: &str = "na";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPair {
    /// Row identifier (`id` in the training file, `test_id` in the
    /// evaluation file)
    pub id: u64,

    pub question1: String,

    pub question2: String,

    /// Ground truth label — `None` for unlabelled evaluation rows
    pub is_duplicate: Option<bool>,
}

impl QuestionPair {
    pub fn new(
        id:           u64,
        question1:    impl Into<String>,
        question2:    impl Into<String>,
        is_duplicate: Option<bool>,
    ) -> Self {
        Self {
            id,
            question1: question1.into(),
            question2: question2.into(),
            is_duplicate,
        }
    }

    /// Build a pair from optional text fields, substituting
    /// [`MISSING_TEXT`] for anything absent.
    pub fn with_placeholders(
        id:           u64,
        question1:    Option<String>,
        question2:    Option<String>,
        is_duplicate: Option<bool>,
    ) -> Self {
        Self {
            id,
            question1: question1.unwrap_or_else(|| MISSING_TEXT.to_string()),
            question2: question2.unwrap_or_else(|| MISSING_TEXT.to_string()),
            is_duplicate,
        }
    }

    /// Return a derived copy with both questions passed through `f`.
    pub fn map_text<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&str) -> String,
    {
        Self {
            id:           self.id,
            question1:    f(&self.question1),
            question2:    f(&self.question2),
            is_duplicate: self.is_duplicate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_for_missing_text() {
        let p = QuestionPair::with_placeholders(7, None, Some("b".into()), Some(false));
        assert_eq!(p.question1, "na");
        assert_eq!(p.question2, "b");
    }

    #[test]
    fn test_map_text_leaves_original_untouched() {
        let raw     = QuestionPair::new(1, "A", "B", Some(true));
        let cleaned = raw.map_text(|t| t.to_lowercase());
        assert_eq!(raw.question1, "A");
        assert_eq!(cleaned.question1, "a");
        assert_eq!(cleaned.is_duplicate, Some(true));
    }
}
