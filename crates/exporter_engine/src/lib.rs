//! Exporter engine: extraction, formatting, durable storage, and the
//! capture/export coordinator behind the background worker.
mod annotations;
mod clock;
mod coordinator;
mod download;
mod extract;
mod filename;
mod format;
mod hash;
mod persist;
mod storage;
mod types;
mod worker;

pub use annotations::{Annotation, AnnotationFormat, AnnotationStore};
pub use clock::{Clock, SystemClock};
pub use coordinator::ExportCoordinator;
pub use download::{DownloadError, Downloader, FsDownloader};
pub use extract::{page_title, GeminiDomExtractor, MessageExtractor};
pub use filename::{export_relative_path, sanitize_bucket, sanitize_title, EXPORTS_ROOT};
pub use format::{build_chat_markdown, DocumentMeta, Timestamps};
pub use hash::content_hash;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use storage::{JsonFileStore, MemoryStore, StorageArea, StorageError, TieredStore};
pub use types::{
    ActionMessage, ActionResponse, CaptureReason, ChatDraft, ExportOutcome, Message, Role, TabId,
    SUPPRESSION_WINDOW_MS,
};
pub use worker::{BackgroundHandle, ChannelClosed, CHANNEL_INVALIDATED};
