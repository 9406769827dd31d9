//! Interaction log and derived usage patterns.
//!
//! Every resolved (non-fallback) match appends an [`InteractionRecord`] to
//! a ring buffer capped at 50 — the oldest record is evicted first, so
//! `len ≤ 50` always holds. [`LearnedPatterns`] is fully recomputed from
//! the log by a periodic pass; it is a read-only annotation source and
//! never feeds back into scoring. Everything here is process-local and
//! resets with the engine.

use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap, VecDeque};

// ---------------------------------------------------------------------------
// InteractionRecord
// ---------------------------------------------------------------------------

/// What a winning candidate looked like at resolution time.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MatchedSnapshot {
    pub display_text: String,
    /// Element kind label, or "navigation" for catalog wins.
    pub kind: String,
    pub metadata: String,
}

/// One resolved utterance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InteractionRecord {
    pub timestamp: DateTime<Utc>,
    pub utterance: String,
    pub matched: Option<MatchedSnapshot>,
    pub score: f64,
    /// Raw cosine similarity in [0, 1].
    pub similarity: f64,
    pub page_context: String,
}

// ---------------------------------------------------------------------------
// InteractionLog — bounded ring buffer
// ---------------------------------------------------------------------------

pub const LOG_CAPACITY: usize = 50;

/// Ring buffer of the most recent resolutions.
#[derive(Debug, Default)]
pub struct InteractionLog {
    records: VecDeque<InteractionRecord>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self { records: VecDeque::with_capacity(LOG_CAPACITY) }
    }

    /// Append a record, evicting the oldest once at capacity.
    pub fn push(&mut self, record: InteractionRecord) {
        if self.records.len() == LOG_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

// ---------------------------------------------------------------------------
// LearnedPatterns — derived, recomputable
// ---------------------------------------------------------------------------

/// Aggregated usage statistics for one (utterance, page) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternStats {
    pub count: u32,
    /// Rolling average: avg' = (avg × (count−1) + s) / count, applied in
    /// append order.
    pub average_score: f64,
    pub distinct_matched_texts: BTreeSet<String>,
}

/// Usage statistics derived from the interaction log. Never the source of
/// truth — `rebuild` recomputes the whole table from the log.
#[derive(Debug, Default)]
pub struct LearnedPatterns {
    map: HashMap<(String, String), PatternStats>,
}

impl LearnedPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every pattern from the log.
    pub fn rebuild(&mut self, log: &InteractionLog) {
        self.map.clear();
        for record in log.iter() {
            let key = (record.utterance.to_lowercase(), record.page_context.clone());
            let stats = self.map.entry(key).or_insert(PatternStats {
                count: 0,
                average_score: 0.0,
                distinct_matched_texts: BTreeSet::new(),
            });
            stats.count += 1;
            stats.average_score += (record.score - stats.average_score) / stats.count as f64;
            if let Some(matched) = &record.matched {
                stats.distinct_matched_texts.insert(matched.display_text.clone());
            }
        }
    }

    pub fn get(&self, utterance: &str, page_context: &str) -> Option<&PatternStats> {
        self.map.get(&(utterance.to_lowercase(), page_context.to_string()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
