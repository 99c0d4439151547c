use exporter_engine::{page_title, GeminiDomExtractor, MessageExtractor, Role};
use pretty_assertions::assert_eq;

#[test]
fn custom_elements_win_with_role_specific_content() {
    let html = "<html><body>\
        <user-query><p>What is Rust?</p></user-query>\
        <model-response><div class=\"markdown\">A systems language.</div></model-response>\
        </body></html>";

    let messages = GeminiDomExtractor.extract(html);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "What is Rust?");
    assert_eq!(messages[1].role, Role::Model);
    assert_eq!(messages[1].content, "A systems language.");
}

#[test]
fn class_selectors_are_the_second_strategy() {
    let html = "<html><body>\
        <div class=\"user-query\"><span class=\"query-text\">Hello there</span></div>\
        <div class=\"model-response\"><div class=\"message-content\">Hi!</div></div>\
        </body></html>";

    let messages = GeminiDomExtractor.extract(html);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Hello there");
    assert_eq!(messages[1].role, Role::Model);
    assert_eq!(messages[1].content, "Hi!");
}

#[test]
fn test_id_attributes_count_as_role_hints() {
    let html = "<html><body>\
        <div data-test-id=\"user-query\">Ping</div>\
        <div data-test-id=\"model-response\">Pong answer</div>\
        </body></html>";

    let messages = GeminiDomExtractor.extract(html);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Ping");
    assert_eq!(messages[1].role, Role::Model);
}

#[test]
fn scroller_fallback_guesses_roles_from_length() {
    let long_reply = "This reply is comfortably longer than the fifty char threshold used by the fallback.";
    let html = format!(
        "<html><body><main>\
         <div>Short ask</div>\
         <div>{long_reply}</div>\
         </main></body></html>"
    );

    let messages = GeminiDomExtractor.extract(&html);

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Short ask");
    assert_eq!(messages[1].role, Role::Model);
    assert_eq!(messages[1].content, long_reply);
}

#[test]
fn elements_without_text_are_dropped() {
    let html = "<html><body>\
        <user-query></user-query>\
        <model-response><div class=\"markdown\">Yes.</div></model-response>\
        </body></html>";

    let messages = GeminiDomExtractor.extract(html);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Model);
}

#[test]
fn no_recognisable_structure_yields_empty() {
    let html = "<html><body><p>just an article, no chat here</p></body></html>";
    assert!(GeminiDomExtractor.extract(html).is_empty());
}

#[test]
fn user_content_falls_back_to_full_text() {
    // No inner text container present; the element's own text is used.
    let html = "<html><body><user-query>raw question text</user-query></body></html>";

    let messages = GeminiDomExtractor.extract(html);

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "raw question text");
}

#[test]
fn page_title_prefers_conversation_heading() {
    let html = "<html><head><title>Doc Title</title></head>\
        <body><span class=\"conversation-title\">Chat Title</span></body></html>";
    assert_eq!(page_title(html).as_deref(), Some("Chat Title"));
}

#[test]
fn page_title_falls_back_to_document_title() {
    let html = "<html><head><title>Doc Title</title></head><body></body></html>";
    assert_eq!(page_title(html).as_deref(), Some("Doc Title"));
}

#[test]
fn page_title_is_none_when_nothing_matches() {
    assert_eq!(page_title("<html><body></body></html>"), None);
}
