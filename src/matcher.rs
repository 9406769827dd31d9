//! Hybrid lexical/vector scorer over candidate pools.
//!
//! Scores one utterance against either the navigation catalog or the live
//! element index. Per candidate:
//!
//! - **lexical** — a rule table evaluated per keyword, first rule fires,
//!   contributions summed across keywords:
//!     substring hit +15; keyword-contains-utterance +5 (keyword > 2 chars);
//!     edit-distance similarity > 0.6 → ⌊sim × 10⌋ (keyword > 3 chars).
//!   Rule order within a keyword is load-bearing; across keywords the sum
//!   is additive.
//! - **vector** — cosine similarity between term vectors × 20.
//! - **type bonus** — button +3, input +1, catalog entries 0. Awarded only
//!   when the candidate has lexical or vector evidence: the kind of an
//!   element is never a reason to act on it by itself.
//!
//! The winner is the maximal total at or above the pool threshold; ties go
//! to the earliest candidate in iteration order. All lengths are chars.

use std::collections::BTreeMap;

use crate::catalog::NavigationEntry;
use crate::normalize::TextProfile;
use crate::snapshot::{ElementDescriptor, ElementKind};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Minimum total for a navigation win. Navigation is the higher-stakes
/// action, so the bar is higher.
pub const CATALOG_THRESHOLD: f64 = 5.0;
/// Minimum total for a live-element win.
pub const ELEMENT_THRESHOLD: f64 = 3.0;

// ---------------------------------------------------------------------------
// Scoreable — what a candidate pool must expose
// ---------------------------------------------------------------------------

/// A candidate that can be scored against an utterance.
pub trait Scoreable {
    fn profile(&self) -> &TextProfile;
    fn type_bonus(&self) -> f64 {
        0.0
    }
}

impl Scoreable for NavigationEntry {
    fn profile(&self) -> &TextProfile {
        &self.profile
    }
}

impl Scoreable for ElementDescriptor {
    fn profile(&self) -> &TextProfile {
        &self.profile
    }

    fn type_bonus(&self) -> f64 {
        match self.kind {
            ElementKind::Button => 3.0,
            ElementKind::Input => 1.0,
            _ => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchCandidate — the scored winner
// ---------------------------------------------------------------------------

/// Scores for one candidate. Transient, produced per scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    /// Index of the candidate in the scored pool.
    pub index: usize,
    pub lexical_score: f64,
    pub vector_score: f64,
    pub type_bonus: f64,
    pub total: f64,
    /// Raw cosine similarity in [0, 1] (vector_score / 20).
    pub similarity: f64,
    /// Keywords that fired a lexical rule, in keyword-set order.
    pub matched_keywords: Vec<String>,
}

// ---------------------------------------------------------------------------
// Scoring entry point
// ---------------------------------------------------------------------------

/// Score `utterance` against every candidate in `pool` and return the best
/// one at or above `threshold`, or `None`. Deterministic: the earliest
/// candidate wins ties.
pub fn best_match<T: Scoreable>(
    utterance: &str,
    utterance_profile: &TextProfile,
    pool: &[T],
    threshold: f64,
) -> Option<MatchCandidate> {
    let u = utterance.to_lowercase();
    let u = u.trim();
    if u.is_empty() {
        return None;
    }

    let mut best: Option<MatchCandidate> = None;
    for (index, candidate) in pool.iter().enumerate() {
        let (lexical_score, matched_keywords) = lexical_score(u, candidate.profile());
        let similarity = cosine(&utterance_profile.vector, &candidate.profile().vector);
        let vector_score = similarity * 20.0;
        // No evidence, no bonus: otherwise a button's +3 alone would clear
        // the element threshold for any utterance.
        let type_bonus = if lexical_score > 0.0 || vector_score > 0.0 {
            candidate.type_bonus()
        } else {
            0.0
        };
        let total = lexical_score + vector_score + type_bonus;

        // Strict > keeps the earliest candidate on ties.
        if best.as_ref().map_or(true, |b| total > b.total) {
            best = Some(MatchCandidate {
                index,
                lexical_score,
                vector_score,
                type_bonus,
                total,
                similarity,
                matched_keywords,
            });
        }
    }

    match best {
        Some(candidate) if candidate.total >= threshold => {
            tracing::debug!(
                index = candidate.index,
                total = candidate.total,
                lexical = candidate.lexical_score,
                vector = candidate.vector_score,
                "match above threshold"
            );
            Some(candidate)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Lexical rules
// ---------------------------------------------------------------------------

/// Sum the lexical rule contributions over every keyword of a profile.
/// The first rule that fires for a keyword contributes; rules are not
/// cumulative within a single keyword.
fn lexical_score(utterance: &str, profile: &TextProfile) -> (f64, Vec<String>) {
    let u_len = utterance.chars().count();
    let mut score = 0.0;
    let mut matched = Vec::new();

    for keyword in &profile.keywords {
        let k_len = keyword.chars().count();

        let contribution = if utterance.contains(keyword.as_str()) {
            15.0
        } else if k_len > 2 && keyword.contains(utterance) {
            5.0
        } else if k_len > 3 {
            let sim = similarity(utterance, keyword, u_len, k_len);
            if sim > 0.6 {
                (sim * 10.0).floor()
            } else {
                0.0
            }
        } else {
            0.0
        };

        if contribution > 0.0 {
            score += contribution;
            matched.push(keyword.clone());
        }
    }

    (score, matched)
}

/// Normalized edit-distance similarity: 1 − lev(a, b) / max(len).
fn similarity(a: &str, b: &str, a_len: usize, b_len: usize) -> f64 {
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 0.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Plain char-based Levenshtein distance, two-row DP.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0usize; b_chars.len() + 1];

    for (i, &ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

// ---------------------------------------------------------------------------
// Cosine similarity
// ---------------------------------------------------------------------------

/// Cosine similarity of two term-frequency vectors; 0 when either is empty.
fn cosine(a: &BTreeMap<String, u32>, b: &BTreeMap<String, u32>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    for (term, &count) in a {
        if let Some(&other) = b.get(term) {
            dot += count as f64 * other as f64;
        }
    }
    if dot == 0.0 {
        return 0.0;
    }

    let norm = |v: &BTreeMap<String, u32>| -> f64 {
        v.values().map(|&c| (c as f64) * (c as f64)).sum::<f64>().sqrt()
    };
    dot / (norm(a) * norm(b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
