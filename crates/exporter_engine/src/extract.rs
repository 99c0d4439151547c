use exporter_logging::{export_debug, export_warn};
use scraper::{ElementRef, Html, Selector};

use crate::types::{Message, Role};

/// Messages shorter than this are guessed to be user turns by the
/// last-resort strategy. Known-flaky, kept from the hosting page's observed
/// behaviour; only consulted when no role hint exists.
const SHORT_TEXT_ROLE_THRESHOLD: usize = 50;

pub trait MessageExtractor: Send + Sync {
    fn extract(&self, html: &str) -> Vec<Message>;
}

/// Selector-based extractor for the Gemini conversation DOM.
///
/// Three strategies run in order, first non-empty wins:
/// 1. the canonical custom elements (`user-query`, `model-response`);
/// 2. class/attribute fallbacks for the same two kinds;
/// 3. direct children of a generic scroller with non-empty text, roles
///    guessed from text length.
///
/// Zero messages is not an error; callers check for emptiness.
#[derive(Debug, Default)]
pub struct GeminiDomExtractor;

impl MessageExtractor for GeminiDomExtractor {
    fn extract(&self, html: &str) -> Vec<Message> {
        let doc = Html::parse_document(html);

        let mut elements = select_all(&doc, "user-query, model-response");
        if elements.is_empty() {
            export_debug!("custom message elements not found, trying class selectors");
            elements = select_all(
                &doc,
                ".user-query, .model-response, \
                 [data-test-id=\"user-query\"], [data-test-id=\"model-response\"]",
            );
        }
        let mut guess_roles = false;
        if elements.is_empty() {
            export_debug!("class selectors not found, trying scroller container");
            guess_roles = true;
            elements = scroller_children(&doc);
        }

        let mut messages = Vec::with_capacity(elements.len());
        for element in elements {
            let role = detect_role(&element, guess_roles);
            let content = extract_content(&element, role);
            if content.is_empty() {
                continue;
            }
            messages.push(Message { role, content });
        }

        if messages.is_empty() {
            export_warn!("no messages found in document");
        }
        messages
    }
}

/// Pulls the conversation title from the page, preferring the in-page
/// conversation heading over the document `<title>`.
pub fn page_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    for selectors in [
        "span.conversation-title, .conversation-title, h1",
        "title",
    ] {
        if let Ok(sel) = Selector::parse(selectors) {
            if let Some(node) = doc.select(&sel).next() {
                let text = node.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

fn select_all<'a>(doc: &'a Html, selectors: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selectors) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

fn scroller_children(doc: &Html) -> Vec<ElementRef<'_>> {
    let Ok(sel) = Selector::parse("infinite-scroller, .infinite-scroller, main") else {
        return Vec::new();
    };
    let Some(scroller) = doc.select(&sel).next() else {
        return Vec::new();
    };
    scroller
        .child_elements()
        .filter(|child| !element_text(child).is_empty())
        .collect()
}

fn detect_role(element: &ElementRef<'_>, guess_from_length: bool) -> Role {
    let value = element.value();
    let tag = value.name().to_ascii_lowercase();
    let has_class = |class: &str| value.classes().any(|c| c == class);
    let test_id = value.attr("data-test-id").unwrap_or("");

    if tag.contains("user") || has_class("user-query") || test_id == "user-query" {
        Role::User
    } else if tag.contains("model") || has_class("model-response") || test_id == "model-response" {
        Role::Model
    } else if guess_from_length {
        // Short messages are likely the user's. Flaky; scroller fallback only.
        if element_text(element).len() < SHORT_TEXT_ROLE_THRESHOLD {
            Role::User
        } else {
            Role::Model
        }
    } else {
        Role::Unknown
    }
}

fn extract_content(element: &ElementRef<'_>, role: Role) -> String {
    let inner = match role {
        Role::User => first_match_text(element, ".query-text, .query-text-line, p"),
        Role::Model => first_match_text(element, ".markdown, .message-content"),
        Role::Unknown => None,
    };
    inner.unwrap_or_else(|| element_text(element))
}

fn first_match_text(element: &ElementRef<'_>, selectors: &str) -> Option<String> {
    let sel = Selector::parse(selectors).ok()?;
    let node = element.select(&sel).next()?;
    let text = element_text(&node);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
