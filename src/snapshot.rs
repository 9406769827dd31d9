//! Interface snapshot indexing.
//!
//! The rendering layer hands the engine a tree of the currently visible
//! interactive controls ([`ViewNode`] via [`SnapshotSource`]). One indexing
//! pass flattens that tree into [`ElementDescriptor`]s annotated with the
//! keyword/vector profile of their visible text. The result lives exactly
//! one pass: it is rebuilt on every view change and never cached across
//! views.
//!
//! Control handles are opaque capabilities ([`Control`]) held weakly — the
//! live control can disappear between indexing and activation, so an
//! activation can always fail and callers must treat that as data, not as
//! a panic.

use std::rc::{Rc, Weak};

use crate::normalize::{self, TextProfile};

// ---------------------------------------------------------------------------
// Element kinds and metadata
// ---------------------------------------------------------------------------

/// The coarse interaction class of a captured control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Button,
    Link,
    Clickable,
    Input,
    Heading,
}

impl ElementKind {
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Link => "link",
            ElementKind::Clickable => "clickable",
            ElementKind::Input => "input",
            ElementKind::Heading => "heading",
        }
    }
}

/// Coarse metadata copied off the rendered control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementMeta {
    pub tag: String,
    pub css_class: String,
    pub id: String,
    pub extra: Option<String>,
}

// ---------------------------------------------------------------------------
// Control capability
// ---------------------------------------------------------------------------

/// Why an activation attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// The underlying control was removed from the view.
    Stale,
    /// The control rejected the activation.
    Rejected(String),
}

/// An opaque capability over a live control. The single operation can fail;
/// liveness is never assumed.
pub trait Control {
    fn activate(&self) -> Result<(), ActivationError>;
}

// ---------------------------------------------------------------------------
// Snapshot source — the contract with the rendering layer
// ---------------------------------------------------------------------------

/// One node of the rendered-control tree.
pub struct ViewNode {
    /// The control at this node, if it is itself interactive.
    pub control: Option<RawControl>,
    pub children: Vec<ViewNode>,
}

/// An interactive control as reported by the rendering layer.
pub struct RawControl {
    pub kind: ElementKind,
    /// Visible text. For inputs this is the associated label text.
    pub text: String,
    /// Placeholder text (inputs only).
    pub placeholder: Option<String>,
    pub handle: Rc<dyn Control>,
    pub meta: ElementMeta,
}

/// Provider of the current rendered view, and of the open dialog subtree
/// when a modal is up.
pub trait SnapshotSource {
    fn view_root(&self) -> ViewNode;
    /// The open dialog's subtree, if any. When present, indexing is scoped
    /// to it.
    fn dialog_root(&self) -> Option<ViewNode>;
}

// ---------------------------------------------------------------------------
// ElementDescriptor — one indexed control
// ---------------------------------------------------------------------------

/// A captured control plus the match profile of its visible text.
pub struct ElementDescriptor {
    pub kind: ElementKind,
    pub display_text: String,
    pub profile: TextProfile,
    /// Weak handle: the control may be gone by activation time.
    pub handle: Weak<dyn Control>,
    pub meta: ElementMeta,
}

impl ElementDescriptor {
    /// Activate the underlying control. A dead handle is `Stale`.
    pub fn activate(&self) -> Result<(), ActivationError> {
        match self.handle.upgrade() {
            Some(control) => control.activate(),
            None => Err(ActivationError::Stale),
        }
    }
}

// ---------------------------------------------------------------------------
// Indexing pass
// ---------------------------------------------------------------------------

/// Index the current view. Scoped to the open dialog when one is present.
pub fn index_view(source: &dyn SnapshotSource) -> Vec<ElementDescriptor> {
    let root = source.dialog_root().unwrap_or_else(|| source.view_root());
    let mut out = Vec::new();
    walk(&root, &mut out);
    tracing::debug!(elements = out.len(), "indexed view snapshot");
    out
}

fn walk(node: &ViewNode, out: &mut Vec<ElementDescriptor>) {
    let mut captured_container = false;

    if let Some(raw) = &node.control {
        if let Some(descriptor) = capture(raw) {
            // Controls nested inside a captured button/link are not
            // captured a second time.
            captured_container =
                matches!(raw.kind, ElementKind::Button | ElementKind::Link);
            out.push(descriptor);
        }
    }

    if !captured_container {
        for child in &node.children {
            walk(child, out);
        }
    }
}

fn capture(raw: &RawControl) -> Option<ElementDescriptor> {
    // Inputs index as label ++ placeholder; everything else as visible text.
    let text = match raw.kind {
        ElementKind::Input => {
            let placeholder = raw.placeholder.as_deref().unwrap_or("");
            let joined = format!("{} {}", raw.text, placeholder);
            joined.trim().to_string()
        }
        _ => raw.text.trim().to_string(),
    };

    if text.is_empty() {
        return None;
    }

    Some(ElementDescriptor {
        kind: raw.kind,
        display_text: text.clone(),
        profile: normalize::analyze(&text),
        handle: Rc::downgrade(&raw.handle),
        meta: raw.meta.clone(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
