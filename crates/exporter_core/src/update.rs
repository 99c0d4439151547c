use crate::view_model::StatusIndicator;
use crate::{Effect, Msg, OverlayState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: OverlayState, msg: Msg) -> (OverlayState, Vec<Effect>) {
    let effects = match msg {
        Msg::PageLoaded { url } => {
            state.set_page(url);
            Vec::new()
        }
        Msg::ExportClicked { bucket } => {
            state.set_status(StatusIndicator::Exporting);
            vec![Effect::CaptureAndExport { bucket }]
        }
        Msg::AutosaveTick => {
            if state.autosave_armed() {
                state.set_status(StatusIndicator::Saving);
                vec![Effect::CaptureAndCache]
            } else {
                Vec::new()
            }
        }
        Msg::PageHiding => {
            // Teardown may cut this short; the tab-removal backstop covers it.
            vec![Effect::CaptureAndExport { bucket: None }]
        }
        Msg::DomMutated => {
            if state.overlay_removed() {
                vec![Effect::ReinjectOverlay]
            } else {
                Vec::new()
            }
        }
        Msg::OverlayInjected => {
            state.mark_injected();
            Vec::new()
        }
        Msg::SelectionChanged(selection) => {
            state.set_selection(selection);
            Vec::new()
        }
        Msg::AnnotateToggled => {
            state.toggle_toolbar();
            Vec::new()
        }
        Msg::FormatApplied { format, comment } => {
            if state.conversation_id().is_none() {
                return (state, Vec::new());
            }
            let effect = state.valid_selection().and_then(|selection| {
                selection.message_index.map(|message_index| Effect::SaveAnnotation {
                    message_index,
                    snippet: selection.text.clone(),
                    comment: comment.clone(),
                    format,
                })
            });
            match effect {
                Some(effect) => {
                    state.close_toolbar();
                    vec![effect]
                }
                None => Vec::new(),
            }
        }
        Msg::CacheResponded { ok, error } => {
            let status = if ok {
                StatusIndicator::Saved
            } else {
                StatusIndicator::Error(error.unwrap_or_else(|| "cache failed".to_string()))
            };
            state.set_status(status);
            Vec::new()
        }
        Msg::ExportResponded { ok, skipped, error } => {
            let status = match (ok, skipped) {
                (true, false) => StatusIndicator::Saved,
                (true, true) => StatusIndicator::Idle,
                (false, _) => {
                    StatusIndicator::Error(error.unwrap_or_else(|| "export failed".to_string()))
                }
            };
            state.set_status(status);
            Vec::new()
        }
        Msg::ExtractionEmpty => {
            state.set_status(StatusIndicator::Error("No chat content found".to_string()));
            Vec::new()
        }
        Msg::ChannelInvalidated => {
            state.disarm_autosave();
            state.set_status(StatusIndicator::Error(
                "Extension reloaded, please refresh the page".to_string(),
            ));
            vec![Effect::CancelAutosave]
        }
        Msg::RestoreRecentExports(snapshots) => {
            state.restore_recent(snapshots);
            Vec::new()
        }
        Msg::ExportRecorded(snapshot) => {
            state.push_recent(snapshot);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
