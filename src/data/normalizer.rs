// ============================================================
// Layer 4 — Text Normalizer
// ============================================================
// Cleans a raw question before it is split into tokens.
//
// The cleaning is a fixed chain of find/replace rules. Order
// matters: later rules assume earlier ones already ran. For
// example `can't` must be rewritten before the generic `n't`
// rule, and punctuation is spaced out before the literal
// rewrites that match on surrounding spaces (" u s ").
//
// Stages (applied in order):
//   1. Lowercase
//   2. Replace characters outside the allowed set with a space
//   3. Expand contractions       (what's → what is)
//   4. Space out punctuation     (! → " ! ", . → " ")
//   5. Literal domain rewrites   (60k → 60000, e - mail → email)
//   6. Collapse 2+ whitespace into a single space
//
// Output is NOT trimmed: a leading or trailing space survives.
// Vocabularies built from older runs depend on the exact bytes.
//
// Known quirks kept on purpose:
//   - Stage 2 runs before the contraction rules, so `?` and
//     similar characters are already gone by stage 3.
//   - The allowed set contains the range `+-=`, i.e. every byte
//     from `+` to `=`. So `:`, `;` and `<` survive stage 2.
//   - The `\x00s` rewrite targets a NUL byte followed by `s`.
//     Stage 2 has already removed NUL, so it never fires.
//   - ` 9 11 ` becomes `911` with no surrounding spaces, gluing
//     it to its neighbours.
//
// Reference: regex crate documentation (Regex::replace_all)

use regex::{NoExpand, Regex};

/// Which stage of the chain a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Whitelist,
    Contraction,
    Punctuation,
    Rewrite,
    Collapse,
}

/// (stage, regex pattern, replacement) in application order.
/// Replacements are inserted literally (no `$1` expansion).
const RULES: &[(Stage, &str, &str)] = &[
    // `+-=` is a range: + , - . / 0-9 : ; < =
    (Stage::Whitelist,   r"[^A-Za-z0-9^,!./'+-=]", " "),

    (Stage::Contraction, r"what's", "what is "),
    (Stage::Contraction, r"'s",     " "),
    (Stage::Contraction, r"'ve",    " have "),
    (Stage::Contraction, r"can't",  "cannot "),
    (Stage::Contraction, r"n't",    " not "),
    (Stage::Contraction, r"i'm",    "i am "),
    (Stage::Contraction, r"'re",    " are "),
    (Stage::Contraction, r"'d",     " would "),
    (Stage::Contraction, r"'ll",    " will "),

    (Stage::Punctuation, r",",  " "),
    (Stage::Punctuation, r"\.", " "),
    (Stage::Punctuation, r"!",  " ! "),
    (Stage::Punctuation, r"/",  " "),
    (Stage::Punctuation, r"\^", " ^ "),
    (Stage::Punctuation, r"\+", " + "),
    (Stage::Punctuation, r"-",  " - "),
    (Stage::Punctuation, r"=",  " = "),
    (Stage::Punctuation, r"'",  " "),

    (Stage::Rewrite, r"60k",      " 60000 "),
    (Stage::Rewrite, r":",        " : "),
    (Stage::Rewrite, r" e g ",    " eg "),
    (Stage::Rewrite, r" b g ",    " bg "),
    (Stage::Rewrite, r" u s ",    " american "),
    (Stage::Rewrite, r"\x00s",    "0"),
    (Stage::Rewrite, r" 9 11 ",   "911"),
    (Stage::Rewrite, r"e - mail", "email"),
    (Stage::Rewrite, r"j k",      "jk"),

    (Stage::Collapse, r"\s{2,}", " "),
];

/// One compiled find/replace rule.
#[derive(Debug, Clone)]
pub struct Rule {
    stage:       Stage,
    regex:       Regex,
    replacement: &'static str,
}

impl Rule {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Apply this rule alone to `text`.
    pub fn apply(&self, text: &str) -> String {
        self.regex.replace_all(text, NoExpand(self.replacement)).into_owned()
    }
}

/// The full cleaning chain, compiled once and reused for every row.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    pub fn new() -> Result<Self, regex::Error> {
        let rules = RULES
            .iter()
            .map(|&(stage, pattern, replacement)| {
                Ok(Rule { stage, regex: Regex::new(pattern)?, replacement })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the whole chain on one string.
    pub fn normalize(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_lowercase(), |acc, rule| rule.apply(&acc))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> String {
        Normalizer::new().unwrap().normalize(text)
    }

    fn rule(pattern: &str) -> Rule {
        Normalizer::new()
            .unwrap()
            .rules()
            .iter()
            .find(|r| r.pattern() == pattern)
            .cloned()
            .unwrap_or_else(|| panic!("no rule {pattern}"))
    }

    // ── Rules in isolation ────────────────────────────────────────────────────

    #[test]
    fn test_all_patterns_compile_in_order() {
        let n = Normalizer::new().unwrap();
        assert_eq!(n.rules().len(), RULES.len());
        assert_eq!(n.rules()[0].stage(), Stage::Whitelist);
        assert_eq!(n.rules().last().unwrap().stage(), Stage::Collapse);
    }

    #[test]
    fn test_whitelist_rule() {
        let r = rule(r"[^A-Za-z0-9^,!./'+-=]");
        assert_eq!(r.apply("a?b#c"), "a b c");
        // the +-= range keeps : ; < but not > or @
        assert_eq!(r.apply("a:b;c<d>e@f"), "a:b;c<d e f");
        assert_eq!(r.apply("é"), " ");
        assert_eq!(r.apply("tab\there"), "tab here");
    }

    #[test]
    fn test_contraction_rules() {
        let cases = [
            (r"what's", "what's new", "what is  new"),
            (r"'s",     "john's car", "john  car"),
            (r"'ve",    "we've",      "we have "),
            (r"can't",  "can't go",   "cannot  go"),
            (r"n't",    "isn't",      "is not "),
            (r"i'm",    "i'm here",   "i am  here"),
            (r"'re",    "you're",     "you are "),
            (r"'d",     "i'd",        "i would "),
            (r"'ll",    "we'll",      "we will "),
        ];
        for (pattern, input, expected) in cases {
            assert_eq!(rule(pattern).apply(input), expected, "rule {pattern}");
        }
    }

    #[test]
    fn test_punctuation_rules() {
        let cases = [
            (r",",  "a,b", "a b"),
            (r"\.", "a.b", "a b"),
            (r"!",  "a!",  "a ! "),
            (r"/",  "a/b", "a b"),
            (r"\^", "2^3", "2 ^ 3"),
            (r"\+", "c+",  "c + "),
            (r"-",  "a-b", "a - b"),
            (r"=",  "x=1", "x = 1"),
            (r"'",  "o'k", "o k"),
        ];
        for (pattern, input, expected) in cases {
            assert_eq!(rule(pattern).apply(input), expected, "rule {pattern}");
        }
    }

    #[test]
    fn test_rewrite_rules() {
        let cases = [
            (r"60k",      "earn 60k",      "earn  60000 "),
            (r":",        "a:b",           "a : b"),
            (r" e g ",    "like e g this", "like eg this"),
            (r" b g ",    "a b g c",       "a bg c"),
            (r" u s ",    "the u s army",  "the american army"),
            (r"\x00s",    "1\u{0}s",       "10"),
            (r" 9 11 ",   "after 9 11 x",  "after911x"),
            (r"e - mail", "e - mail",      "email"),
            (r"j k",      "j k rowling",   "jk rowling"),
        ];
        for (pattern, input, expected) in cases {
            assert_eq!(rule(pattern).apply(input), expected, "rule {pattern}");
        }
    }

    #[test]
    fn test_collapse_rule_is_idempotent() {
        let r    = rule(r"\s{2,}");
        let once = r.apply("a   b \t c  ");
        assert_eq!(once, "a b c ");
        assert_eq!(r.apply(&once), once);
    }

    // ── Full chain ────────────────────────────────────────────────────────────

    #[test]
    fn test_golden_whats_up() {
        // ? removed by the whitelist, contraction expanded, ! spaced,
        // then the double space from "what is " collapsed
        assert_eq!(norm("What's up?!"), "what is up ! ");
    }

    #[test]
    fn test_specific_contraction_runs_before_generic() {
        assert_eq!(norm("can't"), "cannot ");
        assert_eq!(norm("What's"), "what is ");
        assert_eq!(norm("I'm sure they'll say it isn't"), "i am sure they will say it is not ");
    }

    #[test]
    fn test_question_mark_removed_before_contractions() {
        assert_eq!(norm("Why?"), "why ");
    }

    #[test]
    fn test_amounts_and_abbreviations() {
        assert_eq!(norm("60k salary"), " 60000 salary");
        assert_eq!(norm("in the U.S. today"), "in the american today");
        assert_eq!(norm("like e.g. Rust"), "like eg rust");
        assert_eq!(norm("Send e-mail"), "send email");
        assert_eq!(norm("J.K. Rowling"), "jk rowling");
    }

    #[test]
    fn test_nine_eleven_glues_neighbours() {
        assert_eq!(norm("after 9/11 attacks"), "after911attacks");
    }

    #[test]
    fn test_nul_rewrite_never_fires() {
        assert_eq!(norm("the 1990s"), "the 1990s");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(norm("C++ vs C#"), "c + + vs c ");
        assert_eq!(norm("2^10=1024"), "2 ^ 10 = 1024");
        assert_eq!(norm("Note: this"), "note : this");
        assert_eq!(norm("a;b"), "a;b");
    }

    #[test]
    fn test_non_ascii_becomes_space() {
        assert_eq!(norm("Café"), "caf ");
    }

    #[test]
    fn test_leading_and_trailing_space_survive() {
        assert_eq!(norm("  hello  "), " hello ");
        assert_eq!(norm(""), "");
    }

    #[test]
    fn test_normalized_samples_are_fixed_points() {
        let n = Normalizer::new().unwrap();
        for raw in ["What's up?!", "How do I learn Rust, fast?", "Is 2+2=4?", "don't/won't"] {
            let once = n.normalize(raw);
            assert_eq!(n.normalize(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn test_deterministic() {
        let n = Normalizer::new().unwrap();
        let t = "Which is better: Python or Rust?";
        assert_eq!(n.normalize(t), n.normalize(t));
    }
}
