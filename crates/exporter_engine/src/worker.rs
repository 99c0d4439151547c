use std::fmt;
use std::sync::mpsc;
use std::thread;

use exporter_logging::{export_debug, export_info};

use crate::coordinator::ExportCoordinator;
use crate::types::{ActionMessage, ActionResponse, ChatDraft, ExportOutcome, TabId};

/// Error message callers see when the background channel is gone, matching
/// how the host reports an invalidated extension context.
pub const CHANNEL_INVALIDATED: &str = "Extension context invalidated";

/// The background channel is closed; further requests are futile and
/// periodic autosave must stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelClosed;

impl fmt::Display for ChannelClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CHANNEL_INVALIDATED}")
    }
}

impl std::error::Error for ChannelClosed {}

struct Request {
    message: ActionMessage,
    reply: Option<mpsc::Sender<ActionResponse>>,
}

/// Handle to the single background worker thread that owns the coordinator.
/// All coordinator mutations happen on that thread, so no locking is needed
/// around the draft and marker maps.
#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<Request>,
}

impl BackgroundHandle {
    pub fn new(coordinator: ExportCoordinator) -> Self {
        let (tx, rx) = mpsc::channel::<Request>();
        thread::spawn(move || {
            let mut coordinator = coordinator;
            while let Ok(request) = rx.recv() {
                let response = dispatch(&mut coordinator, request.message);
                if let Some(reply) = request.reply {
                    let _ = reply.send(response);
                }
            }
            export_info!("background worker shutting down");
        });
        Self { tx }
    }

    /// Sends an action and waits for its response. A closed channel is the
    /// invalidated-context case; callers must stop autosaving.
    pub fn request(&self, message: ActionMessage) -> Result<ActionResponse, ChannelClosed> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Request {
                message,
                reply: Some(reply_tx),
            })
            .map_err(|_| ChannelClosed)?;
        reply_rx.recv().map_err(|_| ChannelClosed)
    }

    /// Fire-and-forget notification that a tab went away. The worker runs
    /// the cached-draft export backstop; nobody awaits the outcome.
    pub fn tab_removed(&self, tab: TabId) {
        let _ = self.tx.send(Request {
            message: ActionMessage::TabRemoved { tab },
            reply: None,
        });
    }
}

fn dispatch(coordinator: &mut ExportCoordinator, message: ActionMessage) -> ActionResponse {
    match message {
        ActionMessage::CacheChat {
            tab,
            payload,
            title,
            url,
            conversation_id,
        } => {
            let draft = ChatDraft {
                markdown: payload,
                title,
                url,
                conversation_id,
                updated_at_ms: coordinator.now_ms(),
            };
            coordinator.cache(tab, draft);
            ActionResponse::ok()
        }
        ActionMessage::ExportChat {
            tab,
            payload,
            title,
            url,
            conversation_id,
            bucket,
            content_hash,
        } => {
            if let Some(hash) = &content_hash {
                export_debug!("export_chat for tab {tab}, content hash {hash}");
            }
            let draft = ChatDraft {
                markdown: payload,
                title,
                url,
                conversation_id,
                updated_at_ms: coordinator.now_ms(),
            };
            outcome_response(coordinator.export(tab, &draft, bucket.as_deref()))
        }
        ActionMessage::TabRemoved { tab } => outcome_response(coordinator.handle_tab_removed(tab)),
    }
}

fn outcome_response(outcome: ExportOutcome) -> ActionResponse {
    match outcome {
        ExportOutcome::Completed { .. } => ActionResponse::ok(),
        ExportOutcome::Skipped => ActionResponse::skipped(),
        ExportOutcome::Failed { error } => ActionResponse::failure(error),
    }
}
