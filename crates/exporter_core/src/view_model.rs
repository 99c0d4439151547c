use crate::state::ExportSnapshot;

/// Last known coordinator state, shown in the status pill.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusIndicator {
    #[default]
    Idle,
    Saving,
    Exporting,
    Saved,
    Error(String),
}

impl StatusIndicator {
    pub fn label(&self) -> &str {
        match self {
            StatusIndicator::Idle => "Idle",
            StatusIndicator::Saving => "Saving...",
            StatusIndicator::Exporting => "Exporting...",
            StatusIndicator::Saved => "Saved",
            StatusIndicator::Error(text) => text,
        }
    }

    /// Pill color, matching the host page's accent palette.
    pub fn color(&self) -> &'static str {
        match self {
            StatusIndicator::Idle => "#5f6368",
            StatusIndicator::Saving => "#f9ab00",
            StatusIndicator::Exporting => "#1a73e8",
            StatusIndicator::Saved => "#188038",
            StatusIndicator::Error(_) => "#d93025",
        }
    }
}

/// Bucket labels offered as export buttons on the floating panel.
pub const DEFAULT_BUCKETS: &[&str] = &["work", "personal", "research"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlayViewModel {
    pub status: StatusIndicator,
    pub conversation_id: Option<String>,
    pub toolbar_visible: bool,
    pub autosave_armed: bool,
    pub overlay_injected: bool,
    pub recent_exports: Vec<ExportSnapshot>,
}
