use std::sync::{mpsc, Arc};

use chrono::{Local, Utc};
use exporter_core::{Effect, ExportSnapshot, Msg, SnippetFormat};
use exporter_engine::{
    build_chat_markdown, content_hash, page_title, ActionMessage, AnnotationFormat,
    AnnotationStore, BackgroundHandle, Clock, DocumentMeta, GeminiDomExtractor, MessageExtractor,
    StorageArea, SystemClock, TabId, Timestamps,
};
use exporter_logging::{export_info, export_warn};

/// Executes core effects against the engine and feeds the coordinator's
/// responses back as messages. This is the page-script half of the
/// message-passing protocol, with the saved page standing in for the live
/// document.
pub struct EffectRunner {
    background: BackgroundHandle,
    extractor: GeminiDomExtractor,
    annotations_area: Arc<dyn StorageArea>,
    clock: SystemClock,
    msg_tx: mpsc::Sender<Msg>,
    tab: TabId,
    page_url: String,
    conversation_id: Option<String>,
    html: String,
}

impl EffectRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        background: BackgroundHandle,
        annotations_area: Arc<dyn StorageArea>,
        msg_tx: mpsc::Sender<Msg>,
        tab: TabId,
        page_url: String,
        conversation_id: Option<String>,
        html: String,
    ) -> Self {
        Self {
            background,
            extractor: GeminiDomExtractor,
            annotations_area,
            clock: SystemClock,
            msg_tx,
            tab,
            page_url,
            conversation_id,
            html,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_one(effect);
        }
    }

    fn run_one(&self, effect: Effect) {
        match effect {
            Effect::CaptureAndCache => {
                let Some((markdown, title)) = self.capture() else {
                    let _ = self.msg_tx.send(Msg::ExtractionEmpty);
                    return;
                };
                let message = ActionMessage::CacheChat {
                    tab: self.tab,
                    payload: markdown,
                    title,
                    url: self.page_url.clone(),
                    conversation_id: self.conversation_id.clone(),
                };
                self.send(message, None);
            }
            Effect::CaptureAndExport { bucket } => {
                let Some((markdown, title)) = self.capture() else {
                    let _ = self.msg_tx.send(Msg::ExtractionEmpty);
                    return;
                };
                let hash = content_hash(&markdown);
                let snapshot = ExportSnapshot {
                    title: title.clone(),
                    url: self.page_url.clone(),
                    exported_at_ms: self.clock.now_ms(),
                };
                let message = ActionMessage::ExportChat {
                    tab: self.tab,
                    payload: markdown,
                    title,
                    url: self.page_url.clone(),
                    conversation_id: self.conversation_id.clone(),
                    bucket,
                    content_hash: Some(hash),
                };
                self.send(message, Some(snapshot));
            }
            Effect::SaveAnnotation {
                message_index,
                snippet,
                comment,
                format,
            } => {
                let Some(conversation_id) = &self.conversation_id else {
                    return;
                };
                let store = AnnotationStore::new(self.annotations_area.as_ref(), &self.clock);
                match store.add(conversation_id, message_index, snippet, comment, map_format(format))
                {
                    Ok(id) => export_info!("annotation {id} saved for {conversation_id}"),
                    Err(err) => export_warn!("failed to save annotation: {err}"),
                }
            }
            Effect::ReinjectOverlay => {
                let _ = self.msg_tx.send(Msg::OverlayInjected);
            }
            Effect::CancelAutosave => {
                export_info!("autosave cancelled");
            }
        }
    }

    fn capture(&self) -> Option<(String, String)> {
        let messages = self.extractor.extract(&self.html);
        if messages.is_empty() {
            return None;
        }
        let title = page_title(&self.html).unwrap_or_else(|| "gemini_chat".to_string());
        let annotations = match &self.conversation_id {
            Some(id) => {
                AnnotationStore::new(self.annotations_area.as_ref(), &self.clock).load(id)
            }
            None => Vec::new(),
        };
        let meta = DocumentMeta {
            title: title.clone(),
            url: self.page_url.clone(),
            conversation_id: self.conversation_id.clone(),
            timestamps: now_timestamps(),
        };
        let markdown = build_chat_markdown(&messages, &meta, &annotations)?;
        Some((markdown, title))
    }

    fn send(&self, message: ActionMessage, snapshot: Option<ExportSnapshot>) {
        let is_export = snapshot.is_some();
        match self.background.request(message) {
            Ok(response) => {
                let msg = if is_export {
                    Msg::ExportResponded {
                        ok: response.ok,
                        skipped: response.skipped,
                        error: response.error.clone(),
                    }
                } else {
                    Msg::CacheResponded {
                        ok: response.ok,
                        error: response.error.clone(),
                    }
                };
                let _ = self.msg_tx.send(msg);
                if response.ok && !response.skipped {
                    if let Some(snapshot) = snapshot {
                        let _ = self.msg_tx.send(Msg::ExportRecorded(snapshot));
                    }
                }
            }
            Err(err) => {
                // The invalidated-context signal: the worker channel is gone.
                export_warn!("background channel closed: {err}");
                let _ = self.msg_tx.send(Msg::ChannelInvalidated);
            }
        }
    }
}

pub(crate) fn now_timestamps() -> Timestamps {
    Timestamps {
        local: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        iso: Utc::now().to_rfc3339(),
    }
}

fn map_format(format: SnippetFormat) -> AnnotationFormat {
    match format {
        SnippetFormat::Bold => AnnotationFormat::Bold,
        SnippetFormat::Italic => AnnotationFormat::Italic,
        SnippetFormat::Code => AnnotationFormat::Code,
        SnippetFormat::Quote => AnnotationFormat::Quote,
        SnippetFormat::Highlight => AnnotationFormat::Highlight,
    }
}
