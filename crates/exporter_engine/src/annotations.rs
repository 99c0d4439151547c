use exporter_logging::export_warn;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::storage::{StorageArea, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationFormat {
    Bold,
    Italic,
    Code,
    Quote,
    Highlight,
}

impl AnnotationFormat {
    /// Wraps a snippet with this format's Markdown marker.
    pub fn apply(self, snippet: &str) -> String {
        match self {
            AnnotationFormat::Bold => format!("**{snippet}**"),
            AnnotationFormat::Italic => format!("*{snippet}*"),
            AnnotationFormat::Code => format!("`{snippet}`"),
            AnnotationFormat::Quote => format!("> {snippet}"),
            AnnotationFormat::Highlight => format!("=={snippet}=="),
        }
    }
}

/// A user-added note on a snippet of one message. Never mutated in place;
/// the whole per-conversation list is replaced on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub message_index: usize,
    pub snippet: String,
    pub comment: String,
    pub format: AnnotationFormat,
    pub created_at_ms: u64,
}

fn storage_key(conversation_id: &str) -> String {
    format!("annotations:{conversation_id}")
}

/// Per-conversation annotation lists over a durable storage area. Reads are
/// tolerant (decode failures come back empty); writes replace the whole
/// list, last writer wins.
pub struct AnnotationStore<'a> {
    area: &'a dyn StorageArea,
    clock: &'a dyn Clock,
}

impl<'a> AnnotationStore<'a> {
    pub fn new(area: &'a dyn StorageArea, clock: &'a dyn Clock) -> Self {
        Self { area, clock }
    }

    pub fn load(&self, conversation_id: &str) -> Vec<Annotation> {
        match self.area.get(&storage_key(conversation_id)) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(annotations) => annotations,
                Err(err) => {
                    export_warn!("failed to decode annotations for {conversation_id}: {err}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                export_warn!("failed to load annotations for {conversation_id}: {err}");
                Vec::new()
            }
        }
    }

    pub fn save(
        &self,
        conversation_id: &str,
        annotations: &[Annotation],
    ) -> Result<(), StorageError> {
        let value = serde_json::to_value(annotations)
            .map_err(|e| StorageError::Write(e.to_string()))?;
        self.area.set(&storage_key(conversation_id), value)
    }

    /// Appends a new annotation and returns its id, `<ms hex>-<random hex>`.
    pub fn add(
        &self,
        conversation_id: &str,
        message_index: usize,
        snippet: impl Into<String>,
        comment: impl Into<String>,
        format: AnnotationFormat,
    ) -> Result<String, StorageError> {
        let now = self.clock.now_ms();
        let id = format!("{now:x}-{:04x}", rand::random::<u16>());
        let mut annotations = self.load(conversation_id);
        annotations.push(Annotation {
            id: id.clone(),
            message_index,
            snippet: snippet.into(),
            comment: comment.into(),
            format,
            created_at_ms: now,
        });
        self.save(conversation_id, &annotations)?;
        Ok(id)
    }

    /// Removes the annotation with the given id. Returns whether it existed.
    pub fn remove(&self, conversation_id: &str, id: &str) -> Result<bool, StorageError> {
        let mut annotations = self.load(conversation_id);
        let before = annotations.len();
        annotations.retain(|annotation| annotation.id != id);
        if annotations.len() == before {
            return Ok(false);
        }
        self.save(conversation_id, &annotations)?;
        Ok(true)
    }
}
