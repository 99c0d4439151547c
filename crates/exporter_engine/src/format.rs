use exporter_logging::export_debug;

use crate::annotations::Annotation;
use crate::types::Message;

/// Caller-supplied render times, injected so identical inputs produce
/// byte-identical documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamps {
    pub local: String,
    pub iso: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: String,
    pub url: String,
    pub conversation_id: Option<String>,
    pub timestamps: Timestamps,
}

/// Renders a full Markdown document: metadata header, then one `##` section
/// per message in input order. Returns `None` for an empty conversation.
pub fn build_chat_markdown(
    messages: &[Message],
    meta: &DocumentMeta,
    annotations: &[Annotation],
) -> Option<String> {
    if messages.is_empty() {
        return None;
    }

    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", meta.title));
    md.push_str(&format!("**Date:** {}\n", meta.timestamps.local));
    md.push_str(&format!("**Exported:** {}\n", meta.timestamps.iso));
    md.push_str(&format!("**Messages:** {}\n", messages.len()));
    md.push_str(&format!("**Source:** {}\n", meta.url));
    if let Some(id) = &meta.conversation_id {
        md.push_str(&format!("**Conversation:** {id}\n"));
    }
    if !annotations.is_empty() {
        md.push_str(&format!("**Annotations:** {}\n", annotations.len()));
    }
    md.push_str("\n---\n\n");

    for (index, message) in messages.iter().enumerate() {
        md.push_str(&format!("## {}\n\n", message.role.label()));
        let (body, notes) = apply_annotations(&message.content, index, annotations);
        md.push_str(&body);
        md.push_str("\n\n");
        for note in notes {
            md.push_str(&format!("> **Note:** {note}\n\n"));
        }
    }

    Some(md)
}

/// Wraps each matching annotation's snippet with its format marker (first
/// occurrence only) and collects attached comments. A snippet that is no
/// longer a literal substring of the content is skipped silently.
fn apply_annotations(
    content: &str,
    message_index: usize,
    annotations: &[Annotation],
) -> (String, Vec<String>) {
    let mut body = content.to_string();
    let mut notes = Vec::new();
    for annotation in annotations
        .iter()
        .filter(|a| a.message_index == message_index)
    {
        match body.find(&annotation.snippet) {
            Some(pos) => {
                let marked = annotation.format.apply(&annotation.snippet);
                body.replace_range(pos..pos + annotation.snippet.len(), &marked);
            }
            None => {
                export_debug!("annotation {} snippet not present, skipping", annotation.id);
                continue;
            }
        }
        if !annotation.comment.is_empty() {
            notes.push(annotation.comment.clone());
        }
    }
    (body, notes)
}
