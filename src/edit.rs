//! Structured-field-edit grammar.
//!
//! A fixed-pattern extractor for phrases of the shape
//! `<field> <value> 로/으로 바꿔/변경/수정` covering exactly four fields:
//! unit (free text), headcount (digits + 명), salary (digits + 만원/천만원),
//! and task description (free text).
//!
//! If the edit trigger is present but no field/value parses, the result is
//! `None` — the caller falls through to the next resolution stage rather
//! than emitting a partial edit.

use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// FieldEdit — one extracted edit
// ---------------------------------------------------------------------------

/// A successfully extracted field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Department/unit, free text.
    Unit(String),
    /// Headcount in people.
    Headcount(u32),
    /// Salary in units of 만원.
    Salary(u64),
    /// Task description, free text.
    Task(String),
}

impl FieldEdit {
    /// The schema key this edit targets (aligned with the collection
    /// session's field keys).
    pub fn key(&self) -> &'static str {
        match self {
            FieldEdit::Unit(_) => "department",
            FieldEdit::Headcount(_) => "headcount",
            FieldEdit::Salary(_) => "salary",
            FieldEdit::Task(_) => "task",
        }
    }

    /// The extracted value, rendered for the field-update emitter.
    pub fn value_text(&self) -> String {
        match self {
            FieldEdit::Unit(v) | FieldEdit::Task(v) => v.clone(),
            FieldEdit::Headcount(n) => format!("{}명", n),
            FieldEdit::Salary(n) => format!("{}만원", n),
        }
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

const TRIGGER_WORDS: [&str; 3] = ["바꿔", "변경", "수정"];

fn headcount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"인원(?:을|은|는)?\s*(\d+)\s*명(?:으로|로)?\s*(?:바꿔|변경|수정)").unwrap()
    })
}

fn salary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:급여|연봉|월급)(?:를|을|은|는)?\s*(\d+)\s*(천만원|만원)(?:으로|로)?\s*(?:바꿔|변경|수정)")
            .unwrap()
    })
}

fn unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:부서|팀)(?:를|을|은|는)?\s*(\S+?)\s*(?:으로|로)\s*(?:바꿔|변경|수정)").unwrap()
    })
}

fn task_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:업무\s*내용|담당\s*업무|업무)(?:를|을|은|는)?\s*(.+?)\s*(?:으로|로)\s*(?:바꿔|변경|수정)")
            .unwrap()
    })
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Try to extract a structured field edit from the utterance.
///
/// Numeric fields are tried before free-text ones so "인원" never ends up
/// swallowed by the task pattern's free-text capture.
pub fn parse_edit(utterance: &str) -> Option<FieldEdit> {
    if !TRIGGER_WORDS.iter().any(|w| utterance.contains(w)) {
        return None;
    }

    if let Some(caps) = headcount_re().captures(utterance) {
        let n: u32 = caps[1].parse().ok()?;
        return Some(FieldEdit::Headcount(n));
    }

    if let Some(caps) = salary_re().captures(utterance) {
        let amount: u64 = caps[1].parse().ok()?;
        let in_manwon = match &caps[2] {
            "천만원" => amount.checked_mul(1000)?,
            _ => amount,
        };
        return Some(FieldEdit::Salary(in_manwon));
    }

    if let Some(caps) = unit_re().captures(utterance) {
        let value = caps[1].trim();
        if !value.is_empty() {
            return Some(FieldEdit::Unit(value.to_string()));
        }
    }

    if let Some(caps) = task_re().captures(utterance) {
        let value = caps[1].trim();
        if !value.is_empty() {
            return Some(FieldEdit::Task(value.to_string()));
        }
    }

    // Trigger present but nothing parsable: no structured edit.
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_edit() {
        let edit = parse_edit("부서를 마케팅으로 바꿔줘").expect("should extract");
        assert_eq!(edit, FieldEdit::Unit("마케팅".to_string()));
        assert_eq!(edit.key(), "department");
        assert_eq!(edit.value_text(), "마케팅");
    }

    #[test]
    fn test_team_alias_for_unit() {
        let edit = parse_edit("팀을 개발팀으로 변경해줘").expect("should extract");
        assert_eq!(edit, FieldEdit::Unit("개발팀".to_string()));
    }

    #[test]
    fn test_headcount_edit() {
        let edit = parse_edit("인원을 5명으로 바꿔줘").expect("should extract");
        assert_eq!(edit, FieldEdit::Headcount(5));
        assert_eq!(edit.key(), "headcount");
        assert_eq!(edit.value_text(), "5명");
    }

    #[test]
    fn test_salary_edit_manwon() {
        let edit = parse_edit("연봉을 5000만원으로 수정해줘").expect("should extract");
        assert_eq!(edit, FieldEdit::Salary(5000));
        assert_eq!(edit.value_text(), "5000만원");
    }

    #[test]
    fn test_salary_edit_cheonmanwon() {
        let edit = parse_edit("급여를 1천만원으로 바꿔").expect("should extract");
        assert_eq!(edit, FieldEdit::Salary(1000));
    }

    #[test]
    fn test_task_edit() {
        let edit = parse_edit("업무를 백엔드 개발로 변경해줘").expect("should extract");
        assert_eq!(edit, FieldEdit::Task("백엔드 개발".to_string()));
        assert_eq!(edit.key(), "task");
    }

    #[test]
    fn test_no_trigger_is_none() {
        assert_eq!(parse_edit("부서가 마케팅이야"), None);
    }

    #[test]
    fn test_trigger_without_field_is_none() {
        // Edit phrase present but no recognizable field
        assert_eq!(parse_edit("그거 좀 바꿔줘"), None);
    }

    #[test]
    fn test_trigger_with_unparsable_value_is_none() {
        // "인원" named but the value is not digits+명
        assert_eq!(parse_edit("인원을 많이 바꿔줘"), None);
    }

    #[test]
    fn test_unrelated_text_is_none() {
        assert_eq!(parse_edit("오늘 날씨 어때"), None);
    }
}
