//! The engine instance and the per-utterance action resolver.
//!
//! One [`Engine`] owns every piece of mutable state: the live element index,
//! the optional collection session, the interaction log, the derived usage
//! patterns, the deferred-action queue, and the chat sequence counter.
//! Lifecycle is `new → resolve* → reset`; there are no module-level
//! singletons holding session state.
//!
//! Resolution order per utterance:
//! 1. help/menu trigger → catalog listing, no side effect
//! 2. navigation catalog → navigate (new-posting phrasing additionally
//!    schedules a deferred collection start)
//! 3. live element index → activate the control; a dead/throwing handle
//!    becomes a textual failure, never a panic
//! 4. structured-field-edit grammar → field update
//! 5. active collection session → forward the raw utterance
//! 6. conversational fallback (not logged)
//!
//! Deferred actions capture the engine epoch at schedule time and no-op if
//! the epoch has advanced by the time they fire. Chat replies carry a
//! monotonically increasing sequence number; anything but the latest issued
//! is discarded.

use std::time::{Duration, Instant};

use crate::backend::{ChatBackend, ChatReply, ChatRequest, ChatTurn};
use crate::catalog;
use crate::history::{InteractionLog, InteractionRecord, LearnedPatterns, MatchedSnapshot};
use crate::matcher::{self, MatchCandidate, CATALOG_THRESHOLD, ELEMENT_THRESHOLD};
use crate::normalize;
use crate::session::{CollectSession, SessionStep};
use crate::snapshot::{self, ElementDescriptor, SnapshotSource};
use crate::types::Result;
use crate::vocab::{vocab, Vocab};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunables for timed behavior. Tests zero the intervals.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Delay between a navigation win with new-posting phrasing and the
    /// start of the guided collection dialogue.
    pub collect_start_delay: Duration,
    /// Minimum interval between learning passes over the log.
    pub learning_interval: Duration,
    /// Retained chat turns.
    pub chat_history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collect_start_delay: Duration::from_millis(400),
            learning_interval: Duration::from_secs(10),
            chat_history_limit: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution — what one utterance resolved to
// ---------------------------------------------------------------------------

/// The outcome of resolving one utterance. Navigation and field-update
/// variants are requests for the embedding page to act on, fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Generated catalog listing (help request).
    Listing { text: String },
    /// Navigate to a catalog destination.
    Navigate { path: String, destination: String, text: String },
    /// A live control was activated.
    Activated { element: String, text: String },
    /// The resolved control's handle was stale or the control rejected
    /// activation.
    ActivationFailed { element: String, text: String },
    /// A structured field edit to emit.
    FieldEdit { field: &'static str, value: String, text: String },
    /// The collection session prompts for a field.
    CollectPrompt { field: &'static str, text: String },
    /// The collection session finished; values in schema order.
    CollectCompleted { values: Vec<(&'static str, String)>, text: String },
    /// The collection session was cancelled.
    CollectCancelled { text: String },
    /// Conversational fallback; no side effect.
    Fallback { text: String },
}

impl Resolution {
    /// The user-facing response text.
    pub fn text(&self) -> &str {
        match self {
            Resolution::Listing { text }
            | Resolution::Navigate { text, .. }
            | Resolution::Activated { text, .. }
            | Resolution::ActivationFailed { text, .. }
            | Resolution::FieldEdit { text, .. }
            | Resolution::CollectPrompt { text, .. }
            | Resolution::CollectCompleted { text, .. }
            | Resolution::CollectCancelled { text }
            | Resolution::Fallback { text } => text,
        }
    }
}

/// Outcome of a chat round trip. Backend failures surface as the message
/// text; there is no automatic retry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOutcome {
    pub message: String,
    pub suggestions: Vec<String>,
    /// Bulk field updates from an `autonomous_collection` reply.
    pub field_updates: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// Deferred actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    StartCollect,
}

#[derive(Debug)]
struct Scheduled {
    /// Engine epoch captured at schedule time.
    epoch: u64,
    due: Instant,
    action: Deferred,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

pub struct Engine {
    config: EngineConfig,
    elements: Vec<ElementDescriptor>,
    indexed_page: Option<String>,
    session: Option<CollectSession>,
    log: InteractionLog,
    patterns: LearnedPatterns,
    last_learning_pass: Instant,
    /// Advances on every view change / reset; stale deferred actions and
    /// handles die against it.
    epoch: u64,
    chat_seq: u64,
    chat_history: Vec<ChatTurn>,
    pending: Vec<Scheduled>,
    fallback_turn: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            elements: Vec::new(),
            indexed_page: None,
            session: None,
            log: InteractionLog::new(),
            patterns: LearnedPatterns::new(),
            last_learning_pass: Instant::now(),
            epoch: 0,
            chat_seq: 0,
            chat_history: Vec::new(),
            pending: Vec::new(),
            fallback_turn: 0,
        }
    }

    // -- View lifecycle ----------------------------------------------------

    /// Index the current view for `page`. Replaces any prior index; the
    /// result is never cached across views.
    pub fn index_view(&mut self, source: &dyn SnapshotSource, page: &str) {
        self.elements = snapshot::index_view(source);
        self.indexed_page = Some(page.to_string());
    }

    /// The view changed: the element index and any collection session are
    /// invalid, and scheduled actions from the old view must not fire.
    pub fn view_changed(&mut self) {
        self.epoch += 1;
        self.elements.clear();
        self.indexed_page = None;
        self.session = None;
    }

    /// Back to the post-construction state.
    pub fn reset(&mut self) {
        self.view_changed();
        self.log.clear();
        self.patterns.clear();
        self.chat_history.clear();
        self.pending.clear();
        self.fallback_turn = 0;
    }

    // -- Introspection -----------------------------------------------------

    pub fn log(&self) -> &InteractionLog {
        &self.log
    }

    pub fn patterns(&self) -> &LearnedPatterns {
        &self.patterns
    }

    pub fn collecting(&self) -> bool {
        self.session.is_some()
    }

    pub fn indexed_element_count(&self) -> usize {
        self.elements.len()
    }

    // -- Collection session ------------------------------------------------

    /// Start the guided posting dialogue. At most one session exists;
    /// starting a new one discards any prior one.
    pub fn start_collect(&mut self) -> Resolution {
        let (session, step) = CollectSession::start();
        self.session = Some(session);
        match step {
            SessionStep::Prompt { key, prompt } => Resolution::CollectPrompt {
                field: key,
                text: format!("채용공고 등록을 시작할게요! {}", prompt),
            },
            // start() always prompts for field 1
            SessionStep::Completed { .. } => unreachable!("fresh session cannot be complete"),
        }
    }

    /// Cancel any active session. No partial values survive.
    pub fn cancel_collect(&mut self) -> Option<Resolution> {
        self.session.take().map(|_| Resolution::CollectCancelled {
            text: "진행 중이던 등록을 취소했어요.".to_string(),
        })
    }

    // -- Resolution --------------------------------------------------------

    /// Resolve one utterance against the current interface state.
    pub fn resolve(&mut self, utterance: &str, page: &str) -> Resolution {
        self.maybe_learn();

        let trimmed = utterance.trim();
        let lower = trimmed.to_lowercase();
        let v = vocab();

        // 1. Help/menu listing
        if Vocab::contains_any(&lower, &v.help_triggers) {
            return Resolution::Listing { text: catalog::listing() };
        }

        let profile = normalize::analyze(trimmed);

        // 2. Navigation catalog
        if let Some(win) =
            matcher::best_match(&lower, &profile, catalog::catalog(), CATALOG_THRESHOLD)
        {
            return self.resolve_navigation(trimmed, &lower, page, win);
        }

        // 3. Live element index — only when this page is the indexed view
        if self.indexed_page.as_deref() == Some(page) {
            if let Some(win) =
                matcher::best_match(&lower, &profile, &self.elements, ELEMENT_THRESHOLD)
            {
                return self.resolve_activation(trimmed, page, win);
            }
        }

        // 4. Structured field edit
        if let Some(edit) = crate::edit::parse_edit(trimmed) {
            let value = edit.value_text();
            return Resolution::FieldEdit {
                field: edit.key(),
                text: format!("{} 항목을 '{}'(으)로 바꿀게요.", edit.key(), value),
                value,
            };
        }

        // 5. Active collection session
        if self.session.is_some() {
            return self.resolve_collect_input(trimmed, &lower);
        }

        // 6. Conversational fallback — never logged
        let suggestion =
            &v.fallback_suggestions[self.fallback_turn % v.fallback_suggestions.len()];
        self.fallback_turn += 1;
        Resolution::Fallback { text: format!("잘 이해하지 못했어요. {}", suggestion) }
    }

    fn resolve_navigation(
        &mut self,
        utterance: &str,
        lower: &str,
        page: &str,
        win: MatchCandidate,
    ) -> Resolution {
        let entry = &catalog::catalog()[win.index];
        let note = self.usage_note(utterance, page);

        self.log.push(InteractionRecord {
            timestamp: chrono::Utc::now(),
            utterance: utterance.to_string(),
            matched: Some(MatchedSnapshot {
                display_text: entry.name.clone(),
                kind: "navigation".to_string(),
                metadata: entry.path.clone(),
            }),
            score: win.total,
            similarity: win.similarity,
            page_context: page.to_string(),
        });

        // New-posting phrasing also stages the guided dialogue, after the
        // navigation has had time to land.
        if Vocab::contains_any(lower, &vocab().new_posting_triggers) {
            self.schedule(Deferred::StartCollect);
        }

        let mut text = format!("{}(으)로 이동할게요.", entry.name);
        if let Some(note) = note {
            text.push_str(&note);
        }

        Resolution::Navigate {
            path: entry.path.clone(),
            destination: entry.name.clone(),
            text,
        }
    }

    fn resolve_activation(
        &mut self,
        utterance: &str,
        page: &str,
        win: MatchCandidate,
    ) -> Resolution {
        let descriptor = &self.elements[win.index];
        let element = descriptor.display_text.clone();
        let kind = descriptor.kind.label().to_string();
        let meta_tag = descriptor.meta.tag.clone();
        let outcome = descriptor.activate();

        match outcome {
            Ok(()) => {
                let note = self.usage_note(utterance, page);
                self.log.push(InteractionRecord {
                    timestamp: chrono::Utc::now(),
                    utterance: utterance.to_string(),
                    matched: Some(MatchedSnapshot {
                        display_text: element.clone(),
                        kind,
                        metadata: meta_tag,
                    }),
                    score: win.total,
                    similarity: win.similarity,
                    page_context: page.to_string(),
                });

                let mut text = format!("'{}'을(를) 실행했어요.", element);
                if let Some(note) = note {
                    text.push_str(&note);
                }
                Resolution::Activated { element, text }
            }
            Err(err) => {
                tracing::warn!(element = %element, ?err, "activation failed");
                Resolution::ActivationFailed {
                    text: format!(
                        "'{}'을(를) 실행하지 못했어요. 화면이 바뀌었을 수 있어요.",
                        element
                    ),
                    element,
                }
            }
        }
    }

    fn resolve_collect_input(&mut self, utterance: &str, lower: &str) -> Resolution {
        if Vocab::contains_any(lower, &vocab().cancel_phrases) {
            // session is known active here
            return self.cancel_collect().expect("active session");
        }

        let session = self.session.as_mut().expect("active session");
        match session.accept(utterance) {
            Some(SessionStep::Prompt { key, prompt }) => {
                Resolution::CollectPrompt { field: key, text: prompt.to_string() }
            }
            Some(SessionStep::Completed { values }) => {
                self.session = None;
                Resolution::CollectCompleted {
                    values,
                    text: "필요한 정보를 모두 받았어요! 공고 등록을 진행할게요.".to_string(),
                }
            }
            // Collecting sessions always accept; a spent one was dropped
            None => unreachable!("spent session retained"),
        }
    }

    // -- Learned-pattern annotations ---------------------------------------

    fn usage_note(&self, utterance: &str, page: &str) -> Option<String> {
        let stats = self.patterns.get(utterance, page)?;
        if stats.count >= 2 {
            Some(format!(" (최근에 {}번 사용한 요청이에요)", stats.count))
        } else {
            None
        }
    }

    fn maybe_learn(&mut self) {
        if self.log.is_empty() {
            return;
        }
        if self.last_learning_pass.elapsed() >= self.config.learning_interval {
            self.patterns.rebuild(&self.log);
            self.last_learning_pass = Instant::now();
            tracing::debug!(patterns = self.patterns.len(), "learning pass");
        }
    }

    /// Force a learning pass now (the periodic trigger lives in `resolve`).
    pub fn run_learning_pass(&mut self) {
        self.patterns.rebuild(&self.log);
        self.last_learning_pass = Instant::now();
    }

    // -- Deferred actions --------------------------------------------------

    fn schedule(&mut self, action: Deferred) {
        self.pending.push(Scheduled {
            epoch: self.epoch,
            due: Instant::now() + self.config.collect_start_delay,
            action,
        });
    }

    /// Fire due deferred actions. Actions scheduled before the last view
    /// change carry an older epoch and are dropped unexecuted.
    pub fn poll_due(&mut self) -> Vec<Resolution> {
        let now = Instant::now();
        let due: Vec<Scheduled> = {
            let (ready, waiting): (Vec<_>, Vec<_>) =
                self.pending.drain(..).partition(|s| s.due <= now);
            self.pending = waiting;
            ready
        };

        let mut out = Vec::new();
        for scheduled in due {
            if scheduled.epoch != self.epoch {
                tracing::debug!(?scheduled.action, "dropping stale deferred action");
                continue;
            }
            match scheduled.action {
                Deferred::StartCollect => out.push(self.start_collect()),
            }
        }
        out
    }

    // -- Chat --------------------------------------------------------------

    /// Issue a new chat sequence number. Only the reply matching the most
    /// recently issued number will be accepted.
    pub fn next_chat_seq(&mut self) -> u64 {
        self.chat_seq += 1;
        self.chat_seq
    }

    /// Accept a chat reply (or failure) for sequence number `seq`.
    /// Returns `None` when the reply is stale and was discarded.
    pub fn accept_chat_reply(&mut self, seq: u64, result: Result<ChatReply>) -> Option<ChatOutcome> {
        if seq != self.chat_seq {
            tracing::debug!(seq, latest = self.chat_seq, "discarding out-of-order chat reply");
            return None;
        }

        let outcome = match result {
            Ok(reply) => {
                self.push_chat_turn("assistant", &reply.message);
                ChatOutcome {
                    field_updates: reply.field_updates(),
                    message: reply.message,
                    suggestions: reply.suggestions,
                }
            }
            Err(err) => ChatOutcome {
                message: format!("서버와 통신하지 못했어요. 잠시 후 다시 시도해 주세요. ({})", err),
                suggestions: Vec::new(),
                field_updates: Vec::new(),
            },
        };
        Some(outcome)
    }

    /// One blocking chat round trip through `backend`.
    pub fn chat(&mut self, backend: &dyn ChatBackend, utterance: &str, page: &str) -> ChatOutcome {
        let request = ChatRequest {
            utterance: utterance.to_string(),
            history: self.chat_history.clone(),
            page_context: page.to_string(),
            mode: "chat".to_string(),
        };
        self.push_chat_turn("user", utterance);

        let seq = self.next_chat_seq();
        let result = backend.complete(&request);
        self.accept_chat_reply(seq, result)
            .expect("synchronous reply is always the latest")
    }

    fn push_chat_turn(&mut self, role: &str, content: &str) {
        self.chat_history.push(ChatTurn { role: role.to_string(), content: content.to_string() });
        if self.chat_history.len() > self.config.chat_history_limit {
            let overflow = self.chat_history.len() - self.config.chat_history_limit;
            self.chat_history.drain(..overflow);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
