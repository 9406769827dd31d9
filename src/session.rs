//! Guided slot-filling session — the fixed-length posting dialogue.
//!
//! A sequential state machine over a fixed ordered schema of 8 fields.
//! Exactly one field is written per accepted utterance, the step index
//! strictly increases, and no field is ever revisited within one session.
//! The session is destroyed on completion, cancellation, or view change;
//! partial values are never persisted.

// ---------------------------------------------------------------------------
// Field schema
// ---------------------------------------------------------------------------

/// The ordered collection schema: (key, prompt).
pub const FIELDS: [(&str, &str); 8] = [
    ("department", "어느 부서(팀)에서 채용하나요?"),
    ("headcount", "몇 명을 채용할 예정인가요?"),
    ("task", "담당하게 될 업무를 알려주세요."),
    ("hours", "근무 시간은 어떻게 되나요?"),
    ("location", "근무 지역(장소)은 어디인가요?"),
    ("salary", "급여 조건을 알려주세요."),
    ("deadline", "지원 마감일은 언제인가요?"),
    ("contact", "담당자 연락처를 알려주세요."),
];

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Collection status. `Collecting` is the only state in which utterances
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Collecting,
    Completed,
}

/// What a session does with one accepted utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    /// Prompt for the next field.
    Prompt { key: &'static str, prompt: &'static str },
    /// All fields collected, in schema order. The session is now spent.
    Completed { values: Vec<(&'static str, String)> },
}

/// One guided data-collection dialogue.
#[derive(Debug)]
pub struct CollectSession {
    /// 1-based index of the field being asked for; ranges over [1, N+1].
    step_index: usize,
    values: Vec<(&'static str, String)>,
    status: SessionStatus,
}

impl CollectSession {
    /// Create a session positioned at field 1 and return its first prompt.
    pub fn start() -> (Self, SessionStep) {
        let session = Self {
            step_index: 1,
            values: Vec::with_capacity(FIELDS.len()),
            status: SessionStatus::Collecting,
        };
        let (key, prompt) = FIELDS[0];
        (session, SessionStep::Prompt { key, prompt })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Store the raw utterance as the value of the current field and
    /// advance. Returns `None` once the session is no longer collecting.
    pub fn accept(&mut self, utterance: &str) -> Option<SessionStep> {
        if self.status != SessionStatus::Collecting {
            return None;
        }

        let (key, _) = FIELDS[self.step_index - 1];
        self.values.push((key, utterance.to_string()));
        self.step_index += 1;

        if self.step_index <= FIELDS.len() {
            let (key, prompt) = FIELDS[self.step_index - 1];
            Some(SessionStep::Prompt { key, prompt })
        } else {
            self.status = SessionStatus::Completed;
            Some(SessionStep::Completed { values: std::mem::take(&mut self.values) })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_prompts_first_field() {
        let (session, step) = CollectSession::start();
        assert_eq!(session.status(), SessionStatus::Collecting);
        assert_eq!(session.step_index(), 1);
        match step {
            SessionStep::Prompt { key, .. } => assert_eq!(key, "department"),
            other => panic!("expected Prompt, got: {:?}", other),
        }
    }

    #[test]
    fn test_eight_utterances_complete_in_order() {
        let (mut session, _) = CollectSession::start();
        let answers = [
            "개발팀", "3명", "백엔드 개발", "9시-6시",
            "서울 강남", "5000만원", "2026-09-30", "hr@example.com",
        ];

        let mut last = None;
        for answer in &answers {
            last = session.accept(answer);
        }

        assert_eq!(session.status(), SessionStatus::Completed);
        match last.expect("eighth utterance should resolve") {
            SessionStep::Completed { values } => {
                assert_eq!(values.len(), 8);
                for (i, (key, value)) in values.iter().enumerate() {
                    assert_eq!(*key, FIELDS[i].0);
                    assert_eq!(value, answers[i], "field {} out of order", key);
                }
            }
            other => panic!("expected Completed, got: {:?}", other),
        }
    }

    #[test]
    fn test_step_index_strictly_increases() {
        let (mut session, _) = CollectSession::start();
        let mut prev = session.step_index();
        for _ in 0..FIELDS.len() {
            session.accept("값");
            assert!(session.step_index() > prev);
            prev = session.step_index();
        }
        assert_eq!(session.step_index(), FIELDS.len() + 1);
    }

    #[test]
    fn test_ninth_utterance_rejected() {
        let (mut session, _) = CollectSession::start();
        for _ in 0..FIELDS.len() {
            session.accept("값");
        }
        assert_eq!(session.accept("한 번 더"), None, "completed session must reject input");
    }

    #[test]
    fn test_intermediate_prompts_follow_schema() {
        let (mut session, _) = CollectSession::start();
        match session.accept("개발팀").unwrap() {
            SessionStep::Prompt { key, .. } => assert_eq!(key, "headcount"),
            other => panic!("expected headcount prompt, got: {:?}", other),
        }
        match session.accept("3명").unwrap() {
            SessionStep::Prompt { key, .. } => assert_eq!(key, "task"),
            other => panic!("expected task prompt, got: {:?}", other),
        }
    }
}
