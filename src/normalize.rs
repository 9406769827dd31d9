//! Text normalization and keyword expansion.
//!
//! Pipeline: raw input → case fold → split on {whitespace, comma, period,
//! hyphen, underscore} → drop single-char tokens → term-frequency vector
//! over the raw tokens → keyword set seeded with the whole text + tokens,
//! then expanded with synonyms, left-anchored prefixes, and cleaned
//! (alphanumeric-only) token forms.
//!
//! All operations are pure functions of the input text and the static
//! synonym table — no I/O, deterministic, idempotent. Lengths are measured
//! in chars so Hangul behaves like any other script.

use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// TextProfile — the output of analysis
// ---------------------------------------------------------------------------

/// Keyword set + term-frequency vector derived from one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextProfile {
    /// Expanded keyword set. Non-empty whenever the token stream is.
    pub keywords: BTreeSet<String>,
    /// Token → occurrence count over the *un-expanded* token stream.
    pub vector: BTreeMap<String, u32>,
}

impl TextProfile {
    pub fn empty() -> Self {
        Self {
            keywords: BTreeSet::new(),
            vector: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyze a text into its keyword set and term vector.
pub fn analyze(text: &str) -> TextProfile {
    let lower = text.to_lowercase();
    let tokens = tokenize(&lower);

    let mut vector: BTreeMap<String, u32> = BTreeMap::new();
    for t in &tokens {
        *vector.entry(t.clone()).or_insert(0) += 1;
    }

    let mut keywords: BTreeSet<String> = BTreeSet::new();
    let trimmed = lower.trim();
    if !trimmed.is_empty() {
        keywords.insert(trimmed.to_string());
    }
    for t in &tokens {
        keywords.insert(t.clone());
    }
    expand_into(&mut keywords, &tokens);

    TextProfile { keywords, vector }
}

/// Tokenize: lowercase, split on the separator class, drop tokens of
/// char-length ≤ 1.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == '-' || c == '_')
        .filter(|t| t.chars().count() > 1)
        .map(|t| t.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Keyword expansion
// ---------------------------------------------------------------------------

/// Expand the keyword set from the raw tokens: synonym table, left-anchored
/// prefixes (char-length 3..=len), cleaned alphanumeric-only forms.
///
/// Driven entirely by the raw tokens, so re-running it on an already
/// expanded set is a no-op.
fn expand_into(keywords: &mut BTreeSet<String>, tokens: &[String]) {
    let table = &super::vocab::vocab().synonyms;

    for token in tokens {
        // Synonym table
        if let Some(alts) = table.get(token.as_str()) {
            for alt in alts {
                keywords.insert(alt.clone());
            }
        }

        // Left-anchored prefixes: lets partial typing match full labels
        // (e.g. "등록하" against "등록하기").
        let chars: Vec<char> = token.chars().collect();
        if chars.len() >= 3 {
            for end in 3..=chars.len() {
                keywords.insert(chars[..end].iter().collect());
            }
        }

        // Cleaned form: alphanumeric only (Unicode-aware, Hangul survives)
        let cleaned: String = token.chars().filter(|c| c.is_alphanumeric()).collect();
        if cleaned.chars().count() > 1 {
            keywords.insert(cleaned);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
