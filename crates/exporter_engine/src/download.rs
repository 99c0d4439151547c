use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download rejected: {0}")]
    Rejected(String),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Sink for finished Markdown documents. Stands in for the host download
/// API; implementations treat filename collisions as overwrites.
pub trait Downloader: Send + Sync {
    fn start(&self, relative: &Path, content: &str) -> Result<PathBuf, DownloadError>;
}

/// Writes downloads under a root directory on the local filesystem.
pub struct FsDownloader {
    writer: AtomicFileWriter,
}

impl FsDownloader {
    pub fn new(root: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(root),
        }
    }
}

impl Downloader for FsDownloader {
    fn start(&self, relative: &Path, content: &str) -> Result<PathBuf, DownloadError> {
        Ok(self.writer.write(relative, content)?)
    }
}
