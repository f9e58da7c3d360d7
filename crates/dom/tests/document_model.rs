use dom::{Document, DomCapabilities};

#[test]
fn scaffold_exposes_head_and_body() {
    let doc = Document::new();
    assert_eq!(doc.tag(doc.head()), Some("head"));
    assert_eq!(doc.tag(doc.body()), Some("body"));
    assert!(doc.is_connected(doc.head()), "head starts connected");
    assert!(doc.capabilities().constructable_stylesheets, "default document supports constructible sheets");
}

#[test]
fn set_text_content_replaces_wholesale() {
    let mut doc = Document::new();
    let style = doc.create_element("style");
    doc.append_child(doc.head(), style).unwrap();

    doc.set_text_content(style, ".a { color: red }").unwrap();
    doc.set_text_content(style, ".b { color: blue }").unwrap();
    assert_eq!(
        doc.text_content(style).unwrap(),
        ".b { color: blue }",
        "text content should be replaced, not appended"
    );
    assert_eq!(doc.children(style).len(), 1, "one text child after repeated set_text_content");

    doc.set_text_content(style, "").unwrap();
    assert_eq!(doc.children(style).len(), 0, "empty text clears all children");
    assert_eq!(doc.text_content(style).unwrap(), "");
}

#[test]
fn attributes_are_stored_lowercased_and_replaced() {
    let mut doc = Document::new();
    let el = doc.create_element("x-chip");
    doc.append_child(doc.body(), el).unwrap();

    doc.set_attribute(el, "Theme", "dark").unwrap();
    assert_eq!(doc.attribute(el, "theme"), Some("dark"));
    assert_eq!(doc.attribute(el, "THEME"), Some("dark"), "lookup is case-insensitive too");

    doc.set_attribute(el, "theme", "light").unwrap();
    assert_eq!(doc.attribute(el, "theme"), Some("light"), "set replaces the existing value");

    let text = doc.create_text("t");
    assert!(doc.set_attribute(text, "a", "b").is_err(), "attributes only apply to elements");
}

#[test]
fn remove_node_is_idempotent_and_scrubs_shadow_state() {
    let mut doc = Document::new();
    let host = doc.create_element("x-app");
    doc.append_child(doc.body(), host).unwrap();
    doc.attach_shadow(host).unwrap();
    let child = doc.create_element("span");
    doc.append_child(host, child).unwrap();

    doc.remove_node(host);
    assert!(doc.tag(host).is_none(), "removed nodes are gone");
    assert!(doc.tag(child).is_none(), "the whole subtree goes with the node");
    assert!(doc.shadow_root(host).is_none(), "shadow state must not outlive the node");
    assert!(!doc.is_connected(host));

    // Second removal is a no-op.
    doc.remove_node(host);
}

#[test]
fn attach_shadow_rejects_non_elements_and_double_attach() {
    let mut doc = Document::new();
    let host = doc.create_element("x-app");
    doc.append_child(doc.body(), host).unwrap();

    doc.attach_shadow(host).unwrap();
    assert!(doc.attach_shadow(host).is_err(), "an element hosts at most one shadow root");

    let text = doc.create_text("hello");
    assert!(doc.attach_shadow(text).is_err(), "text nodes cannot host shadow roots");
}

#[test]
fn constructible_sheets_replace_atomically() {
    let mut doc = Document::new();
    let sheet = doc.create_stylesheet().unwrap();
    assert_eq!(doc.sheet_text(sheet), Some(""), "fresh sheets start empty");

    doc.replace_sheet_text(sheet, ".a { x: 1 }").unwrap();
    doc.replace_sheet_text(sheet, ".b { y: 2 }").unwrap();
    assert_eq!(doc.sheet_text(sheet), Some(".b { y: 2 }"), "replace is a full swap");

    doc.remove_stylesheet(sheet);
    assert!(doc.sheet_text(sheet).is_none());
    doc.remove_stylesheet(sheet);
    assert!(doc.replace_sheet_text(sheet, ".c {}").is_err(), "writing a dropped sheet fails");
}

#[test]
fn sheet_keys_are_never_reused() {
    let mut doc = Document::new();
    let first = doc.create_stylesheet().unwrap();
    doc.remove_stylesheet(first);
    let second = doc.create_stylesheet().unwrap();
    assert_ne!(first, second, "keys stay unique across the document lifetime");
}

#[test]
fn degraded_document_refuses_sheet_construction() {
    let mut doc = Document::with_capabilities(DomCapabilities {
        constructable_stylesheets: false,
    });
    assert!(doc.create_stylesheet().is_err(), "capability absence must be a hard error");
}
