use std::fs;
use std::sync::{mpsc, Arc};

use anyhow::{bail, Context, Result};
use exporter_core::{
    conversation_id_from_url, update, Msg, OverlayState,
};
use exporter_engine::{
    build_chat_markdown, ensure_output_dir, export_relative_path, page_title, BackgroundHandle,
    Clock, DocumentMeta, Downloader, ExportCoordinator, FsDownloader, GeminiDomExtractor,
    JsonFileStore, MemoryStore, MessageExtractor, StorageArea, SystemClock, TieredStore,
    EXPORTS_ROOT,
};
use exporter_logging::export_info;

use super::cli::Options;
use super::effects::{now_timestamps, EffectRunner};
use super::persistence;

const STORE_FILENAME: &str = ".exporter_store.json";

pub fn run(options: Options) -> Result<()> {
    let html = fs::read_to_string(&options.page)
        .with_context(|| format!("failed to read {:?}", options.page))?;
    ensure_output_dir(&options.output_dir)?;

    if options.direct {
        return run_direct(&options, &html);
    }

    // Storage areas: session-scoped memory preferred, JSON file fallback.
    // Annotations always live in the longer-lived area.
    let session: Arc<dyn StorageArea> = Arc::new(MemoryStore::new());
    let local: Arc<dyn StorageArea> = Arc::new(JsonFileStore::new(
        options.output_dir.clone(),
        STORE_FILENAME,
    ));
    let tab_store: Arc<dyn StorageArea> = Arc::new(TieredStore::new(session, local.clone()));

    let downloader = Arc::new(FsDownloader::new(options.output_dir.join(EXPORTS_ROOT)));
    let coordinator = ExportCoordinator::new(tab_store, downloader, Arc::new(SystemClock));
    let background = BackgroundHandle::new(coordinator);

    let conversation_id = conversation_id_from_url(&options.url);
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(
        background,
        local,
        msg_tx,
        options.tab,
        options.url.clone(),
        conversation_id,
        html,
    );

    let mut state = OverlayState::new();
    let restored = persistence::load_recent_exports(&options.output_dir);
    state = pump(state, Msg::RestoreRecentExports(restored), &runner, &msg_rx);
    state = pump(
        state,
        Msg::PageLoaded {
            url: options.url.clone(),
        },
        &runner,
        &msg_rx,
    );
    // One autosave pass caches the draft, then the manual export runs.
    state = pump(state, Msg::AutosaveTick, &runner, &msg_rx);
    state = pump(
        state,
        Msg::ExportClicked {
            bucket: options.bucket.clone(),
        },
        &runner,
        &msg_rx,
    );

    let view = state.view();
    export_info!("final status: {}", view.status.label());
    println!("{}", view.status.label());
    persistence::save_recent_exports(&options.output_dir, &view.recent_exports);
    Ok(())
}

/// Applies a message, runs its effects, then drains and applies any
/// feedback messages the effect runner produced.
fn pump(
    state: OverlayState,
    msg: Msg,
    runner: &EffectRunner,
    msg_rx: &mpsc::Receiver<Msg>,
) -> OverlayState {
    let (mut state, effects) = update(state, msg);
    runner.run(effects);
    while let Ok(feedback) = msg_rx.try_recv() {
        let (next, effects) = update(state, feedback);
        state = next;
        runner.run(effects);
    }
    state
}

/// Standalone one-shot variant: extraction + formatting + direct file write,
/// bypassing the background worker entirely.
fn run_direct(options: &Options, html: &str) -> Result<()> {
    let messages = GeminiDomExtractor.extract(html);
    if messages.is_empty() {
        bail!("no chat content found in {:?}", options.page);
    }
    let title = page_title(html).unwrap_or_else(|| "gemini_chat".to_string());
    let conversation_id = conversation_id_from_url(&options.url);
    let meta = DocumentMeta {
        title: title.clone(),
        url: options.url.clone(),
        conversation_id: conversation_id.clone(),
        timestamps: now_timestamps(),
    };
    let Some(markdown) = build_chat_markdown(&messages, &meta, &[]) else {
        bail!("no chat content found in {:?}", options.page);
    };

    let relative = export_relative_path(
        &title,
        conversation_id.as_deref(),
        options.bucket.as_deref(),
        SystemClock.now_ms(),
    );
    let downloader = FsDownloader::new(options.output_dir.join(EXPORTS_ROOT));
    let path = downloader.start(&relative, &markdown)?;

    export_info!("exported {} message(s) to {:?}", messages.len(), path);
    println!("Exported {} messages to {}", messages.len(), path.display());
    Ok(())
}
