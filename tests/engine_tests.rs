//! End-to-end resolution tests over the public engine API.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use docent::backend::{ChatBackend, ChatReply, ChatRequest};
use docent::catalog;
use docent::edit::{parse_edit, FieldEdit};
use docent::matcher::{best_match, CATALOG_THRESHOLD, ELEMENT_THRESHOLD};
use docent::normalize::analyze;
use docent::snapshot::{
    index_view, ActivationError, Control, ElementKind, ElementMeta, RawControl, SnapshotSource,
    ViewNode,
};
use docent::{Engine, EngineConfig, Resolution};

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

struct ClickSpy {
    hits: Cell<u32>,
}

impl Control for ClickSpy {
    fn activate(&self) -> Result<(), ActivationError> {
        self.hits.set(self.hits.get() + 1);
        Ok(())
    }
}

struct FixedView {
    buttons: Vec<(String, Rc<dyn Control>)>,
}

impl SnapshotSource for FixedView {
    fn view_root(&self) -> ViewNode {
        ViewNode {
            control: None,
            children: self
                .buttons
                .iter()
                .map(|(text, handle)| ViewNode {
                    control: Some(RawControl {
                        kind: ElementKind::Button,
                        text: text.clone(),
                        placeholder: None,
                        handle: handle.clone(),
                        meta: ElementMeta::default(),
                    }),
                    children: Vec::new(),
                })
                .collect(),
        }
    }

    fn dialog_root(&self) -> Option<ViewNode> {
        None
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        collect_start_delay: Duration::ZERO,
        learning_interval: Duration::ZERO,
        chat_history_limit: 20,
    }
}

// ---------------------------------------------------------------------------
// Catalog navigation
// ---------------------------------------------------------------------------

#[test]
fn test_resume_navigation_scores_at_least_15() {
    let utterance = "이력서 관리로 가줘";
    let profile = analyze(utterance);
    let win = best_match(utterance, &profile, catalog::catalog(), CATALOG_THRESHOLD)
        .expect("should clear the navigation threshold");

    let entry = &catalog::catalog()[win.index];
    assert_eq!(entry.name, "이력서 관리");
    assert_eq!(entry.path, "/resume");
    assert!(win.total >= 15.0, "exact substring hit expected, got {}", win.total);
}

#[test]
fn test_resolve_requests_resume_navigation() {
    let mut engine = Engine::new();
    match engine.resolve("이력서 관리로 가줘", "/") {
        Resolution::Navigate { path, destination, .. } => {
            assert_eq!(path, "/resume");
            assert_eq!(destination, "이력서 관리");
        }
        other => panic!("expected Navigate, got: {:?}", other),
    }
}

#[test]
fn test_save_utterance_stays_out_of_the_catalog() {
    // "저장" is element territory; no catalog keyword may swallow it via the
    // keyword-contains-utterance rule and shadow the visible save button.
    let profile = analyze("저장");
    let win = best_match("저장", &profile, catalog::catalog(), CATALOG_THRESHOLD);
    assert!(win.is_none(), "catalog swallowed 저장: {:?}", win);
}

#[test]
fn test_resolve_is_deterministic() {
    let utterance = "지원자 관리 열어줘";
    let profile = analyze(utterance);
    let a = best_match(utterance, &profile, catalog::catalog(), CATALOG_THRESHOLD).unwrap();
    let b = best_match(utterance, &profile, catalog::catalog(), CATALOG_THRESHOLD).unwrap();
    assert_eq!(a.index, b.index);
    assert_eq!(a.total, b.total);
}

// ---------------------------------------------------------------------------
// Structured field edits
// ---------------------------------------------------------------------------

#[test]
fn test_unit_edit_extracts_value() {
    let mut engine = Engine::new();
    match engine.resolve("부서를 마케팅으로 바꿔줘", "/jobs/edit") {
        Resolution::FieldEdit { field, value, .. } => {
            assert_eq!(field, "department");
            assert_eq!(value, "마케팅");
        }
        other => panic!("expected FieldEdit, got: {:?}", other),
    }
}

#[test]
fn test_headcount_edit_extracts_integer() {
    assert_eq!(parse_edit("인원을 5명으로 바꿔줘"), Some(FieldEdit::Headcount(5)));
}

// ---------------------------------------------------------------------------
// Live element pool
// ---------------------------------------------------------------------------

#[test]
fn test_partial_typing_matches_button_with_bonus() {
    let view = FixedView {
        buttons: vec![("새 이력서 등록".to_string(), Rc::new(ClickSpy { hits: Cell::new(0) }))],
    };
    let pool = index_view(&view);

    let utterance = "새이력서";
    let profile = analyze(utterance);
    let win = best_match(utterance, &profile, &pool, ELEMENT_THRESHOLD)
        .expect("should clear the element threshold");

    assert!(win.total >= 8.0, "got {}", win.total);
    assert_eq!(win.type_bonus, 3.0, "button bonus should apply");
}

#[test]
fn test_resolved_button_is_clicked() {
    let spy = Rc::new(ClickSpy { hits: Cell::new(0) });
    let view = FixedView { buttons: vec![("임시 저장".to_string(), spy.clone())] };

    let mut engine = Engine::new();
    engine.index_view(&view, "/jobs/edit");

    match engine.resolve("저장", "/jobs/edit") {
        Resolution::Activated { element, .. } => assert_eq!(element, "임시 저장"),
        other => panic!("expected Activated, got: {:?}", other),
    }
    assert_eq!(spy.hits.get(), 1);
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

#[test]
fn test_unrelated_text_misses_both_pools() {
    let utterance = "오늘 날씨 어때";
    let profile = analyze(utterance);
    assert!(best_match(utterance, &profile, catalog::catalog(), CATALOG_THRESHOLD).is_none());

    let view = FixedView {
        buttons: vec![("새 이력서 등록".to_string(), Rc::new(ClickSpy { hits: Cell::new(0) }))],
    };
    let pool = index_view(&view);
    assert!(best_match(utterance, &profile, &pool, ELEMENT_THRESHOLD).is_none());

    let mut engine = Engine::new();
    engine.index_view(&view, "/resume");
    match engine.resolve(utterance, "/resume") {
        Resolution::Fallback { .. } => {}
        other => panic!("expected Fallback, got: {:?}", other),
    }
    assert!(engine.log().is_empty(), "fallback must not be logged");
}

// ---------------------------------------------------------------------------
// Interaction log through the engine
// ---------------------------------------------------------------------------

#[test]
fn test_log_caps_at_50_through_resolutions() {
    let mut engine = Engine::new();
    for i in 0..60 {
        engine.resolve(&format!("이력서 관리로 가줘 {}", i), "/");
    }
    assert_eq!(engine.log().len(), 50);

    // The survivors are exactly the 50 most recent utterances
    let first = engine.log().iter().next().unwrap();
    assert!(first.utterance.ends_with("10"), "got: {}", first.utterance);
}

// ---------------------------------------------------------------------------
// Guided collection through the engine
// ---------------------------------------------------------------------------

#[test]
fn test_full_posting_dialogue() {
    let mut engine = Engine::with_config(fast_config());

    // Navigation with new-posting phrasing stages the dialogue start
    match engine.resolve("새 공고 등록하러 가줘", "/") {
        Resolution::Navigate { path, .. } => assert_eq!(path, "/jobs"),
        other => panic!("expected Navigate, got: {:?}", other),
    }
    let fired = engine.poll_due();
    assert_eq!(fired.len(), 1, "collect start should fire");

    let answers = [
        "개발팀", "3명", "백엔드 개발", "주 40시간",
        "서울 강남", "5000만원", "2026-09-30", "hr@example.com",
    ];
    let mut last = None;
    for answer in answers {
        last = Some(engine.resolve(answer, "/jobs"));
    }

    match last.unwrap() {
        Resolution::CollectCompleted { values, .. } => {
            assert_eq!(values.len(), 8);
            let submitted: Vec<&str> = values.iter().map(|(_, v)| v.as_str()).collect();
            assert_eq!(submitted, answers, "values must keep submission order");
        }
        other => panic!("expected CollectCompleted, got: {:?}", other),
    }

    // A ninth utterance finds no active session
    match engine.resolve("하나 더요", "/jobs") {
        Resolution::Fallback { .. } => {}
        other => panic!("expected Fallback after completion, got: {:?}", other),
    }
}

#[test]
fn test_view_change_kills_staged_dialogue_and_session() {
    let mut engine = Engine::with_config(fast_config());
    engine.resolve("새 공고 등록하러 가줘", "/");
    engine.view_changed();
    assert!(engine.poll_due().is_empty(), "stale timer must not fire");

    engine.start_collect();
    engine.resolve("개발팀", "/jobs");
    engine.view_changed();
    assert!(!engine.collecting(), "view change discards the session");
}

// ---------------------------------------------------------------------------
// Help listing
// ---------------------------------------------------------------------------

#[test]
fn test_help_lists_every_destination() {
    let mut engine = Engine::new();
    match engine.resolve("도움말", "/") {
        Resolution::Listing { text } => {
            for entry in catalog::catalog() {
                assert!(text.contains(&entry.name), "listing should mention {}", entry.name);
            }
        }
        other => panic!("expected Listing, got: {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Chat plumbing
// ---------------------------------------------------------------------------

struct CollectingBackend;

impl ChatBackend for CollectingBackend {
    fn complete(&self, request: &ChatRequest) -> docent::Result<ChatReply> {
        assert_eq!(request.mode, "chat");
        Ok(serde_json::from_str(
            r#"{
                "message": "공고 내용을 추출했어요",
                "type": "autonomous_collection",
                "extracted_data": {"department": "개발팀", "headcount": 3}
            }"#,
        )
        .expect("canned body parses"))
    }
}

#[test]
fn test_autonomous_collection_becomes_field_updates() {
    let mut engine = Engine::new();
    let outcome = engine.chat(&CollectingBackend, "개발팀에서 3명 채용할 거예요", "/jobs/new");
    assert_eq!(outcome.field_updates.len(), 2);
    assert!(outcome
        .field_updates
        .contains(&("department".to_string(), "개발팀".to_string())));
}
