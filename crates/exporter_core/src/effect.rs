use crate::state::SnippetFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Extract and format the page, then cache the draft in the background.
    CaptureAndCache,
    /// Extract and format the page, then export it.
    CaptureAndExport { bucket: Option<String> },
    /// Persist an annotation for the current conversation.
    SaveAnnotation {
        message_index: usize,
        snippet: String,
        comment: String,
        format: SnippetFormat,
    },
    /// Re-insert the overlay after the host SPA removed it.
    ReinjectOverlay,
    /// Stop the periodic autosave timer permanently.
    CancelAutosave,
}
