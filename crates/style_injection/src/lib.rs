#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

use dom::{DomCapabilities, NodeId, SheetKey};
use std::collections::HashMap;

mod broadcast;
mod embedded;
mod hash;
mod propagate;
mod registry;
mod store;

pub use broadcast::CssFeed;
pub use hash::{FragmentHash, fnv32a, fragment_hash};
pub use store::{StyleKind, StyleRemover};

/// Internal record for one global `<style>` node injected into the head.
#[derive(Debug, Clone, Copy)]
struct GlobalStyle {
    node: NodeId,
    instance: u64,
}

/// Internal record for one scoped constructible stylesheet.
#[derive(Debug, Clone)]
struct ScopedStyle {
    sheet: SheetKey,
    selector: Option<String>,
    instance: u64,
}

/// StyleRuntime owns every stylesheet pushed into the page from the server
/// side: global `<style>` nodes in the document head, per-id constructible
/// sheets propagated into component shadow roots by selector, and the shared
/// sheet that aggregates embedded-mode fragments. It is created once per page
/// and passed by reference; it stores only ids and keys, never node data, so
/// it cannot keep any element alive. All operations are synchronous and run
/// to completion inside the caller.
#[derive(Debug)]
pub struct StyleRuntime {
    caps: DomCapabilities,
    globals: HashMap<String, GlobalStyle>,
    scoped: HashMap<String, ScopedStyle>,
    /// Scoped ids in first-injection order; connect-time sweeps follow it.
    scoped_order: Vec<String>,
    /// Connected components in connection order.
    components: Vec<NodeId>,
    /// Shared sheet carrying the merged embedded fragments, created lazily.
    embedded_sheet: Option<SheetKey>,
    /// Distinct embedded fragments in first-submission order.
    embedded_fragments: Vec<String>,
    /// Monotonic source for remover instance stamps. Stamps are never reused,
    /// so a remover from a disposed style cannot tear down a later style that
    /// recycled the same id.
    next_instance: u64,
    /// Performance counters for adopted-list mutations.
    total_adopt_count: u64,
    total_unadopt_count: u64,
}

impl StyleRuntime {
    /// Create an empty runtime for a document with the given host
    /// capabilities.
    pub fn new(caps: DomCapabilities) -> Self {
        Self {
            caps,
            globals: HashMap::new(),
            scoped: HashMap::new(),
            scoped_order: Vec::new(),
            components: Vec::new(),
            embedded_sheet: None,
            embedded_fragments: Vec::new(),
            next_instance: 1,
            total_adopt_count: 0,
            total_unadopt_count: 0,
        }
    }

    fn mint_instance(&mut self) -> u64 {
        let instance = self.next_instance;
        self.next_instance += 1;
        instance
    }

    /// Whether `element` is currently registered as a connected component.
    pub fn is_registered(&self, element: NodeId) -> bool {
        self.components.contains(&element)
    }

    /// Number of currently registered components.
    pub fn registered_count(&self) -> usize {
        self.components.len()
    }

    /// Sheet backing a scoped style id, if one is stored.
    pub fn scoped_sheet_key(&self, id: &str) -> Option<SheetKey> {
        self.scoped.get(id).map(|style| style.sheet)
    }

    /// `<style>` node backing a global style id, if one is stored.
    pub fn global_style_node(&self, id: &str) -> Option<NodeId> {
        self.globals.get(id).map(|style| style.node)
    }

    /// The shared embedded sheet, once any fragment has been aggregated.
    pub fn embedded_sheet_key(&self) -> Option<SheetKey> {
        self.embedded_sheet
    }

    /// Number of distinct embedded fragments aggregated so far.
    pub fn fragment_count(&self) -> usize {
        self.embedded_fragments.len()
    }

    /// Performance counter: cumulative sheet adoptions across components.
    pub fn perf_total_adopt_count(&self) -> u64 {
        self.total_adopt_count
    }

    /// Performance counter: cumulative sheet removals across components.
    pub fn perf_total_unadopt_count(&self) -> u64 {
        self.total_unadopt_count
    }
}
