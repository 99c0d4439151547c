use url::Url;

use crate::view_model::{OverlayViewModel, StatusIndicator};

/// Minimum selection length for the annotation toolbar to appear.
pub const MIN_SELECTION_LEN: usize = 3;

const MIN_SEGMENT_LEN: usize = 6;
const GENERIC_SEGMENTS: &[&str] = &["app", "search", "history"];

/// Derives a stable conversation id from the page URL: the last non-empty
/// path segment, rejected when short or generic. Pages without one cannot
/// carry annotations.
pub fn conversation_id_from_url(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment.len() < MIN_SEGMENT_LEN {
        return None;
    }
    if GENERIC_SEGMENTS.contains(&segment) {
        return None;
    }
    Some(segment.to_string())
}

/// Markdown marker the annotation toolbar applies to a selected snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetFormat {
    Bold,
    Italic,
    Code,
    Quote,
    Highlight,
}

/// The current text selection, as reported by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
    /// Index of the message element the selection falls inside, when any.
    pub message_index: Option<usize>,
}

/// A completed export, kept for the recent-exports list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSnapshot {
    pub title: String,
    pub url: String,
    pub exported_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayState {
    status: StatusIndicator,
    page_url: String,
    conversation_id: Option<String>,
    overlay_injected: bool,
    reinject_pending: bool,
    autosave_armed: bool,
    selection: Option<Selection>,
    toolbar_open: bool,
    recent_exports: Vec<ExportSnapshot>,
    dirty: bool,
}

impl OverlayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> OverlayViewModel {
        OverlayViewModel {
            status: self.status.clone(),
            conversation_id: self.conversation_id.clone(),
            toolbar_visible: self.toolbar_open && self.valid_selection().is_some(),
            autosave_armed: self.autosave_armed,
            overlay_injected: self.overlay_injected,
            recent_exports: self.recent_exports.clone(),
        }
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Selection long enough for the annotation toolbar, if any.
    pub(crate) fn valid_selection(&self) -> Option<&Selection> {
        self.selection
            .as_ref()
            .filter(|s| s.text.chars().count() >= MIN_SELECTION_LEN)
    }

    pub(crate) fn set_page(&mut self, url: String) {
        self.conversation_id = conversation_id_from_url(&url);
        self.page_url = url;
        self.overlay_injected = true;
        self.reinject_pending = false;
        self.autosave_armed = true;
        self.status = StatusIndicator::Idle;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: StatusIndicator) {
        self.status = status;
        self.dirty = true;
    }

    pub(crate) fn autosave_armed(&self) -> bool {
        self.autosave_armed
    }

    pub(crate) fn disarm_autosave(&mut self) {
        self.autosave_armed = false;
        self.dirty = true;
    }

    /// Marks the overlay as torn out and returns whether a re-inject effect
    /// should fire. At most one fires until the overlay reports itself back.
    pub(crate) fn overlay_removed(&mut self) -> bool {
        self.overlay_injected = false;
        self.dirty = true;
        if self.reinject_pending {
            return false;
        }
        self.reinject_pending = true;
        true
    }

    pub(crate) fn mark_injected(&mut self) {
        self.overlay_injected = true;
        self.reinject_pending = false;
        self.dirty = true;
    }

    pub(crate) fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
        if self.valid_selection().is_none() {
            self.toolbar_open = false;
        }
        self.dirty = true;
    }

    pub(crate) fn toggle_toolbar(&mut self) {
        if self.toolbar_open {
            self.toolbar_open = false;
        } else if self.valid_selection().is_some() {
            self.toolbar_open = true;
        }
        self.dirty = true;
    }

    pub(crate) fn close_toolbar(&mut self) {
        self.toolbar_open = false;
        self.dirty = true;
    }

    pub(crate) fn restore_recent(&mut self, snapshots: Vec<ExportSnapshot>) {
        self.recent_exports = snapshots;
        self.dirty = true;
    }

    pub(crate) fn push_recent(&mut self, snapshot: ExportSnapshot) {
        self.recent_exports.push(snapshot);
        self.dirty = true;
    }
}
