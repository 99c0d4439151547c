use exporter_engine::{AnnotationFormat, AnnotationStore, Clock, MemoryStore};
use pretty_assertions::assert_eq;
use serde_json::json;

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

const CONVERSATION: &str = "abcdef123";

#[test]
fn add_persists_and_loads_back() {
    let area = MemoryStore::new();
    let clock = FixedClock(1_693_000_000_000);
    let store = AnnotationStore::new(&area, &clock);

    let id = store
        .add(CONVERSATION, 2, "borrow checker", "key point", AnnotationFormat::Bold)
        .unwrap();

    let annotations = store.load(CONVERSATION);
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].id, id);
    assert_eq!(annotations[0].message_index, 2);
    assert_eq!(annotations[0].snippet, "borrow checker");
    assert_eq!(annotations[0].comment, "key point");
    assert_eq!(annotations[0].format, AnnotationFormat::Bold);
    assert_eq!(annotations[0].created_at_ms, 1_693_000_000_000);
}

#[test]
fn ids_embed_the_creation_time() {
    let area = MemoryStore::new();
    let clock = FixedClock(0x1234);
    let store = AnnotationStore::new(&area, &clock);

    let id = store
        .add(CONVERSATION, 0, "s", "c", AnnotationFormat::Code)
        .unwrap();
    assert!(id.starts_with("1234-"));
}

#[test]
fn conversations_are_stored_independently() {
    let area = MemoryStore::new();
    let clock = FixedClock(1);
    let store = AnnotationStore::new(&area, &clock);

    store
        .add("abcdef123", 0, "one", "", AnnotationFormat::Italic)
        .unwrap();
    store
        .add("fedcba987", 0, "two", "", AnnotationFormat::Quote)
        .unwrap();

    assert_eq!(store.load("abcdef123").len(), 1);
    assert_eq!(store.load("fedcba987").len(), 1);
    assert_eq!(store.load("abcdef123")[0].snippet, "one");
}

#[test]
fn remove_reports_whether_the_id_existed() {
    let area = MemoryStore::new();
    let clock = FixedClock(1);
    let store = AnnotationStore::new(&area, &clock);

    let id = store
        .add(CONVERSATION, 0, "snippet", "note", AnnotationFormat::Highlight)
        .unwrap();

    assert!(store.remove(CONVERSATION, &id).unwrap());
    assert!(store.load(CONVERSATION).is_empty());
    assert!(!store.remove(CONVERSATION, &id).unwrap());
}

#[test]
fn undecodable_stored_list_loads_as_empty() {
    use exporter_engine::StorageArea;

    let area = MemoryStore::new();
    area.set("annotations:abcdef123", json!("not a list")).unwrap();

    let clock = FixedClock(1);
    let store = AnnotationStore::new(&area, &clock);
    assert!(store.load(CONVERSATION).is_empty());
}

#[test]
fn format_markers_wrap_the_snippet() {
    assert_eq!(AnnotationFormat::Bold.apply("x"), "**x**");
    assert_eq!(AnnotationFormat::Italic.apply("x"), "*x*");
    assert_eq!(AnnotationFormat::Code.apply("x"), "`x`");
    assert_eq!(AnnotationFormat::Quote.apply("x"), "> x");
    assert_eq!(AnnotationFormat::Highlight.apply("x"), "==x==");
}
