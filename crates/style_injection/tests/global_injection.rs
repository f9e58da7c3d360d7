use dom::{Document, DomCapabilities};
use style_injection::{StyleKind, StyleRuntime};

#[test]
fn repeated_injection_keeps_one_node_with_latest_content() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::new();
    let mut runtime = StyleRuntime::new(doc.capabilities());

    runtime.inject_global(&mut doc, "shared-styles", ".a { color: red }").unwrap();
    let head_children = doc.children(doc.head()).len();
    runtime.inject_global(&mut doc, "shared-styles", ".a { color: blue }").unwrap();

    assert_eq!(
        doc.children(doc.head()).len(),
        head_children,
        "re-injection must not add another style node"
    );
    let node = runtime.global_style_node("shared-styles").unwrap();
    assert_eq!(
        doc.text_content(node).unwrap(),
        ".a { color: blue }",
        "content is replaced wholesale"
    );
}

#[test]
fn distinct_ids_get_distinct_nodes() {
    let mut doc = Document::new();
    let mut runtime = StyleRuntime::new(doc.capabilities());

    runtime.inject_global(&mut doc, "typography", "body { font: serif }").unwrap();
    runtime.inject_global(&mut doc, "spacing", "body { margin: 0 }").unwrap();

    let typography = runtime.global_style_node("typography").unwrap();
    let spacing = runtime.global_style_node("spacing").unwrap();
    assert_ne!(typography, spacing);
    assert_eq!(doc.tag(typography), Some("style"));
    assert!(
        doc.children(doc.head()).contains(&typography) && doc.children(doc.head()).contains(&spacing),
        "both style nodes live in the head"
    );
}

#[test]
fn remover_detaches_node_and_is_idempotent() {
    let mut doc = Document::new();
    let mut runtime = StyleRuntime::new(doc.capabilities());

    let remover = runtime.inject_global(&mut doc, "shared-styles", ".a {}").unwrap();
    assert_eq!(remover.kind(), StyleKind::Global);
    assert_eq!(remover.id(), "shared-styles");

    let node = runtime.global_style_node("shared-styles").unwrap();
    runtime.remove_style(&mut doc, &remover);
    assert!(doc.tag(node).is_none(), "style node should leave the document");
    assert!(runtime.global_style_node("shared-styles").is_none());

    // Double dispose is a no-op.
    runtime.remove_style(&mut doc, &remover);
}

#[test]
fn stale_remover_cannot_remove_a_recreated_style() {
    let mut doc = Document::new();
    let mut runtime = StyleRuntime::new(doc.capabilities());

    let first = runtime.inject_global(&mut doc, "shared-styles", ".a {}").unwrap();
    runtime.remove_style(&mut doc, &first);
    runtime.inject_global(&mut doc, "shared-styles", ".b {}").unwrap();

    runtime.remove_style(&mut doc, &first);
    let node = runtime.global_style_node("shared-styles");
    assert!(node.is_some(), "a stale remover must not destroy the re-created style");
    assert_eq!(doc.text_content(node.unwrap()).unwrap(), ".b {}");
}

#[test]
fn both_removers_for_one_live_style_work_once() {
    let mut doc = Document::new();
    let mut runtime = StyleRuntime::new(doc.capabilities());

    let first = runtime.inject_global(&mut doc, "shared-styles", ".a {}").unwrap();
    let second = runtime.inject_global(&mut doc, "shared-styles", ".a2 {}").unwrap();

    runtime.remove_style(&mut doc, &second);
    assert!(runtime.global_style_node("shared-styles").is_none());
    // The earlier remover now points at nothing.
    runtime.remove_style(&mut doc, &first);
    assert!(runtime.global_style_node("shared-styles").is_none());
}

#[test]
fn degraded_document_still_accepts_global_styles() {
    let mut doc = Document::with_capabilities(DomCapabilities {
        constructable_stylesheets: false,
    });
    let mut runtime = StyleRuntime::new(doc.capabilities());

    runtime.inject_global(&mut doc, "plain", "body { margin: 0 }").unwrap();
    assert!(runtime.global_style_node("plain").is_some());

    assert!(
        runtime.inject_scoped(&mut doc, "scoped", ".x {}", None).is_err(),
        "scoped injection requires constructible stylesheets"
    );
    assert!(
        runtime.add_embedded_fragment(&mut doc, ".y {}").is_err(),
        "embedded aggregation requires constructible stylesheets"
    );
}
