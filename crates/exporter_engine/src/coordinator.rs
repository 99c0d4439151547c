use std::collections::HashMap;
use std::sync::Arc;

use exporter_logging::{export_debug, export_info, export_warn};

use crate::clock::Clock;
use crate::download::Downloader;
use crate::filename::export_relative_path;
use crate::storage::StorageArea;
use crate::types::{CaptureReason, ChatDraft, ExportOutcome, TabId, SUPPRESSION_WINDOW_MS};

fn draft_key(tab: TabId) -> String {
    format!("draft:{tab}")
}

fn marker_key(tab: TabId) -> String {
    format!("export:{tab}")
}

fn parse_tab(key: &str, prefix: &str) -> Option<TabId> {
    key.strip_prefix(prefix)?.parse().ok()
}

/// Owns the per-tab draft cache and export-dedup markers, mirrors both to
/// durable storage, and drives downloads.
///
/// Per-tab lifecycle: `NoDraft -> Drafted -> Exported -> NoDraft`. All calls
/// happen on the single worker thread; the in-memory maps are rehydrated
/// lazily from the store after a host restart. Mirroring failures are
/// logged and never block the caller.
pub struct ExportCoordinator {
    drafts: HashMap<TabId, ChatDraft>,
    export_markers: HashMap<TabId, u64>,
    hydrated: bool,
    store: Arc<dyn StorageArea>,
    downloader: Arc<dyn Downloader>,
    clock: Arc<dyn Clock>,
}

impl ExportCoordinator {
    pub fn new(
        store: Arc<dyn StorageArea>,
        downloader: Arc<dyn Downloader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            drafts: HashMap::new(),
            export_markers: HashMap::new(),
            hydrated: false,
            store,
            downloader,
            clock,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Last-write-wins draft cache. Mirrored to the durable store so the
    /// tab-removal backstop still has something to export after a restart.
    pub fn cache(&mut self, tab: TabId, draft: ChatDraft) {
        match serde_json::to_value(&draft) {
            Ok(value) => {
                if let Err(err) = self.store.set(&draft_key(tab), value) {
                    export_warn!("failed to mirror draft for tab {tab}: {err}");
                }
            }
            Err(err) => export_warn!("failed to encode draft for tab {tab}: {err}"),
        }
        export_debug!("cached draft for tab {tab} ({} bytes)", draft.markdown.len());
        self.drafts.insert(tab, draft);
    }

    /// Exports a draft for the tab unless an export completed within the
    /// suppression window. On success the marker is recorded and the tab's
    /// cached draft dropped; on failure everything stays as it was and the
    /// next capture attempt is the retry.
    pub fn export(&mut self, tab: TabId, draft: &ChatDraft, bucket: Option<&str>) -> ExportOutcome {
        let now = self.clock.now_ms();
        if self.suppressed(tab, now) {
            export_info!("export for tab {tab} suppressed (within dedup window)");
            return ExportOutcome::Skipped;
        }

        let relative =
            export_relative_path(&draft.title, draft.conversation_id.as_deref(), bucket, now);
        match self.downloader.start(&relative, &draft.markdown) {
            Ok(path) => {
                export_info!("exported tab {tab} to {:?}", path);
                self.record_export(tab, now);
                self.clear_draft(tab);
                ExportOutcome::Completed { path }
            }
            Err(err) => {
                export_warn!("download failed for tab {tab}: {err}");
                ExportOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Exports the last cached draft for the tab, rehydrating first when the
    /// in-memory view is empty (the host process may have restarted since
    /// the draft was cached).
    pub fn export_from_cache(&mut self, tab: TabId, reason: CaptureReason) -> ExportOutcome {
        if !self.hydrated && self.drafts.is_empty() {
            self.hydrate();
        }
        let Some(draft) = self.drafts.get(&tab).cloned() else {
            export_info!("no cached draft for tab {tab} ({reason})");
            return ExportOutcome::Failed {
                error: format!("no cached draft for tab {tab}"),
            };
        };
        export_info!("exporting cached draft for tab {tab} ({reason})");
        self.export(tab, &draft, None)
    }

    /// Reliability backstop for tabs whose page-teardown notification never
    /// arrived.
    pub fn handle_tab_removed(&mut self, tab: TabId) -> ExportOutcome {
        self.export_from_cache(tab, CaptureReason::TabRemoved)
    }

    /// Reloads drafts and export markers from the durable store. Keys
    /// already present in memory win over their stored copies.
    pub fn hydrate(&mut self) {
        self.hydrated = true;
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(err) => {
                export_warn!("failed to enumerate storage keys: {err}");
                return;
            }
        };
        for key in keys {
            if let Some(tab) = parse_tab(&key, "draft:") {
                if self.drafts.contains_key(&tab) {
                    continue;
                }
                if let Ok(Some(value)) = self.store.get(&key) {
                    match serde_json::from_value::<ChatDraft>(value) {
                        Ok(draft) => {
                            self.drafts.insert(tab, draft);
                        }
                        Err(err) => export_warn!("failed to decode stored draft {key}: {err}"),
                    }
                }
            } else if let Some(tab) = parse_tab(&key, "export:") {
                if self.export_markers.contains_key(&tab) {
                    continue;
                }
                if let Ok(Some(value)) = self.store.get(&key) {
                    if let Some(ts) = value.as_u64() {
                        self.export_markers.insert(tab, ts);
                    }
                }
            }
        }
        export_info!(
            "hydrated {} draft(s) and {} export marker(s)",
            self.drafts.len(),
            self.export_markers.len()
        );
    }

    pub fn draft(&self, tab: TabId) -> Option<&ChatDraft> {
        self.drafts.get(&tab)
    }

    pub fn last_export_ms(&self, tab: TabId) -> Option<u64> {
        self.export_markers.get(&tab).copied()
    }

    fn suppressed(&self, tab: TabId, now: u64) -> bool {
        match self.export_markers.get(&tab) {
            Some(ts) => now.saturating_sub(*ts) < SUPPRESSION_WINDOW_MS,
            None => false,
        }
    }

    fn record_export(&mut self, tab: TabId, now: u64) {
        self.export_markers.insert(tab, now);
        if let Err(err) = self
            .store
            .set(&marker_key(tab), serde_json::Value::from(now))
        {
            export_warn!("failed to persist export marker for tab {tab}: {err}");
        }
    }

    fn clear_draft(&mut self, tab: TabId) {
        self.drafts.remove(&tab);
        if let Err(err) = self.store.remove(&draft_key(tab)) {
            export_warn!("failed to clear stored draft for tab {tab}: {err}");
        }
    }
}
