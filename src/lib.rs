//! docent — the conversational intent-resolution engine behind the
//! recruitment client's floating assistant widget.
//!
//! Given one free-text utterance and a snapshot of the rendered interface,
//! the engine decides whether the user wants to navigate somewhere, activate
//! a visible control, edit a structured field, feed a guided data-collection
//! dialogue, or just chat. Pipeline:
//!
//! 1. **Normalization** — tokenize + keyword expansion (`normalize`, `vocab`)
//! 2. **Catalog scoring** — hybrid lexical/vector match against the static
//!    navigation catalog (`catalog`, `matcher`)
//! 3. **Element scoring** — same scorer against the live interface index
//!    (`snapshot`, `matcher`)
//! 4. **Edit grammar** — fixed-pattern structured field edits (`edit`)
//! 5. **Slot filling** — the guided 8-field posting dialogue (`session`)
//! 6. **Fallback** — conversational response, optionally via the chat
//!    backend (`backend`)
//!
//! Plus a bounded interaction log with derived usage statistics (`history`).
//! All mutable state lives on an explicit [`engine::Engine`] instance.

pub mod types;
pub mod vocab;
pub mod normalize;
pub mod snapshot;
pub mod catalog;
pub mod matcher;
pub mod edit;
pub mod session;
pub mod history;
pub mod backend;
pub mod engine;

pub use engine::{Engine, EngineConfig, Resolution};
pub use types::{EngineError, Result};
