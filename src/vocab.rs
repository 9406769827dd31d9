//! Vocabulary pack loader — synonym table and trigger phrase lists.
//!
//! Single consolidated loader for the static word-list data the engine
//! needs: the synonym table used by keyword expansion, help/cancel/new-
//! posting trigger phrases, and the rotating fallback suggestion lines.
//!
//! Uses the standard disk-first + `include_str!` fallback pattern.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Embedded fallback
// ---------------------------------------------------------------------------

const EMBEDDED_VOCAB: &str = include_str!("../data/vocab.yaml");

// ---------------------------------------------------------------------------
// YAML schema types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VocabYaml {
    synonyms: Vec<SynonymEntry>,
    help_triggers: Vec<String>,
    cancel_phrases: Vec<String>,
    new_posting_triggers: Vec<String>,
    fallback_suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SynonymEntry {
    token: String,
    alts: Vec<String>,
}

// ---------------------------------------------------------------------------
// Runtime vocabulary — the loaded, indexed form
// ---------------------------------------------------------------------------

/// Loaded vocabulary pack, indexed for fast lookup.
#[derive(Debug)]
pub struct Vocab {
    /// Synonym table: token → alternate surface forms.
    pub synonyms: HashMap<String, Vec<String>>,
    /// Phrases that open the catalog listing.
    pub help_triggers: Vec<String>,
    /// Phrases that cancel an active collection session.
    pub cancel_phrases: Vec<String>,
    /// Phrases that also start the guided posting dialogue after navigation.
    pub new_posting_triggers: Vec<String>,
    /// Rotating tail lines for the conversational fallback.
    pub fallback_suggestions: Vec<String>,
}

impl Vocab {
    /// True if the lowercased utterance contains any phrase from `phrases`.
    pub fn contains_any(utterance: &str, phrases: &[String]) -> bool {
        phrases.iter().any(|p| utterance.contains(p.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Singleton
// ---------------------------------------------------------------------------

static VOCAB: OnceLock<Vocab> = OnceLock::new();

/// Get the loaded vocabulary pack (singleton, loaded on first call).
pub fn vocab() -> &'static Vocab {
    VOCAB.get_or_init(load_vocab)
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

fn load_vocab() -> Vocab {
    // Disk-first, embedded fallback
    let yaml_str = std::fs::read_to_string("data/vocab.yaml")
        .ok()
        .unwrap_or_else(|| EMBEDDED_VOCAB.to_string());

    parse_vocab(&yaml_str).unwrap_or_else(|e| {
        tracing::warn!("failed to parse vocab.yaml from disk ({}), using embedded", e);
        parse_vocab(EMBEDDED_VOCAB).expect("embedded vocab.yaml must parse")
    })
}

fn parse_vocab(yaml_str: &str) -> Result<Vocab, String> {
    let raw: VocabYaml = serde_yaml::from_str(yaml_str)
        .map_err(|e| format!("YAML parse error: {}", e))?;

    // The engine indexes into these lists; an empty one is a broken pack.
    if raw.help_triggers.is_empty()
        || raw.cancel_phrases.is_empty()
        || raw.new_posting_triggers.is_empty()
        || raw.fallback_suggestions.is_empty()
    {
        return Err("vocab pack has an empty phrase list".to_string());
    }

    let mut synonyms: HashMap<String, Vec<String>> = HashMap::new();
    for entry in raw.synonyms {
        synonyms
            .entry(entry.token.to_lowercase())
            .or_default()
            .extend(entry.alts.into_iter().map(|a| a.to_lowercase()));
    }

    Ok(Vocab {
        synonyms,
        help_triggers: raw.help_triggers,
        cancel_phrases: raw.cancel_phrases,
        new_posting_triggers: raw.new_posting_triggers,
        fallback_suggestions: raw.fallback_suggestions,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocab_loads() {
        let v = vocab();
        assert!(!v.synonyms.is_empty(), "synonyms should not be empty");
        assert!(!v.help_triggers.is_empty(), "help_triggers should not be empty");
        assert!(!v.cancel_phrases.is_empty(), "cancel_phrases should not be empty");
        assert!(!v.new_posting_triggers.is_empty(), "new_posting_triggers should not be empty");
        assert!(!v.fallback_suggestions.is_empty(), "fallback_suggestions should not be empty");
    }

    #[test]
    fn test_resume_synonyms() {
        let v = vocab();
        let alts = v.synonyms.get("이력서").expect("should have 이력서 synonyms");
        assert!(alts.contains(&"resume".to_string()), "got: {:?}", alts);
    }

    #[test]
    fn test_help_trigger_detection() {
        let v = vocab();
        assert!(Vocab::contains_any("도움말 보여줘", &v.help_triggers));
        assert!(!Vocab::contains_any("이력서 관리로 가줘", &v.help_triggers));
    }

    #[test]
    fn test_cancel_phrase_detection() {
        let v = vocab();
        assert!(Vocab::contains_any("그냥 취소할래", &v.cancel_phrases));
        assert!(!Vocab::contains_any("마케팅팀", &v.cancel_phrases));
    }

    #[test]
    fn test_new_posting_trigger_detection() {
        let v = vocab();
        assert!(Vocab::contains_any("새 공고 등록하러 가줘", &v.new_posting_triggers));
        assert!(!Vocab::contains_any("설정으로 이동", &v.new_posting_triggers));
    }

    #[test]
    fn test_parse_embedded_always_works() {
        // Directly parse the embedded YAML — must never fail
        let result = parse_vocab(EMBEDDED_VOCAB);
        assert!(result.is_ok(), "embedded vocab.yaml must parse: {:?}", result.err());
    }

    #[test]
    fn test_parse_malformed_yaml_returns_error() {
        let result = parse_vocab("not: valid: yaml: [[[");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_empty_phrase_lists() {
        // A pack that parses but carries no fallback lines must be refused,
        // otherwise the fallback rotation has nothing to index into.
        let yaml = r#"
synonyms:
  - token: 이력서
    alts: [resume]
help_triggers: [도움말]
cancel_phrases: [취소]
new_posting_triggers: [새 공고]
fallback_suggestions: []
"#;
        let result = parse_vocab(yaml);
        assert!(result.is_err(), "empty fallback_suggestions must not load");
    }
}
