use std::fmt;

use serde::{Deserialize, Serialize};

pub type TabId = u32;

/// Fixed interval after a successful export during which repeat export
/// requests for the same tab are treated as duplicates.
pub const SUPPRESSION_WINDOW_MS: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
    Unknown,
}

impl Role {
    /// Heading label used in the exported Markdown.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Model => "Gemini",
            Role::Unknown => "Unknown",
        }
    }
}

/// One role-tagged turn of the conversation, produced fresh per extraction
/// and never persisted individually.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The most recently cached, not-yet-exported Markdown rendering of a tab's
/// conversation. One per tab; overwritten on every cache tick and deleted
/// once successfully exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatDraft {
    pub markdown: String,
    pub title: String,
    pub url: String,
    pub conversation_id: Option<String>,
    pub updated_at_ms: u64,
}

/// Why a cached draft is being exported, carried for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureReason {
    Manual,
    Autosave,
    PageHide,
    TabRemoved,
}

impl fmt::Display for CaptureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaptureReason::Manual => "manual",
            CaptureReason::Autosave => "autosave",
            CaptureReason::PageHide => "pagehide",
            CaptureReason::TabRemoved => "tab-removed",
        };
        write!(f, "{label}")
    }
}

/// Result of a single export attempt. Failures are values, never panics;
/// the next periodic capture is the de facto retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed { path: std::path::PathBuf },
    Skipped,
    Failed { error: String },
}

/// Inbound action from the page context to the background worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionMessage {
    CacheChat {
        tab: TabId,
        payload: String,
        title: String,
        url: String,
        conversation_id: Option<String>,
    },
    ExportChat {
        tab: TabId,
        payload: String,
        title: String,
        url: String,
        conversation_id: Option<String>,
        bucket: Option<String>,
        /// Computed by the caller for diagnostics; never consulted for dedup.
        content_hash: Option<String>,
    },
    TabRemoved {
        tab: TabId,
    },
}

/// Outbound response: `{ok: true}`, `{ok: true, skipped: true}`, or
/// `{ok: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            skipped: false,
            error: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            ok: true,
            skipped: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            skipped: false,
            error: Some(error.into()),
        }
    }
}
