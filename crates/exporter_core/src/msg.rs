use crate::state::{ExportSnapshot, Selection, SnippetFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Page (re)loaded or SPA-navigated to a conversation URL.
    PageLoaded { url: String },
    /// Export button clicked, optionally into a bucket.
    ExportClicked { bucket: Option<String> },
    /// Periodic autosave tick.
    AutosaveTick,
    /// Page teardown notification. Best-effort; may never arrive.
    PageHiding,
    /// The host SPA tore the overlay out of the document.
    DomMutated,
    /// The overlay reports it is present in the document again.
    OverlayInjected,
    /// Current text selection changed.
    SelectionChanged(Option<Selection>),
    /// Annotation toolbar toggle clicked.
    AnnotateToggled,
    /// A format button was clicked with an optional comment.
    FormatApplied { format: SnippetFormat, comment: String },
    /// Coordinator answered a cache request.
    CacheResponded { ok: bool, error: Option<String> },
    /// Coordinator answered an export request.
    ExportResponded {
        ok: bool,
        skipped: bool,
        error: Option<String>,
    },
    /// Extraction produced no messages.
    ExtractionEmpty,
    /// The background channel is gone (extension was reloaded).
    ChannelInvalidated,
    /// Restore previously exported conversations from persisted state.
    RestoreRecentExports(Vec<ExportSnapshot>),
    /// Record a completed export for the recent list.
    ExportRecorded(ExportSnapshot),
    /// Fallback for placeholder wiring.
    NoOp,
}
