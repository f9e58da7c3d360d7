//! In-process document model: an element tree with shadow roots, adopted
//! stylesheet lists and constructible stylesheet objects. This is the host
//! surface that the style-injection runtime drives.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};
use indextree::{Arena, NodeId};
use log::debug;
use smallvec::SmallVec;

use crate::selector::SelectorList;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
}

/// Host features detected once when the document is created.
#[derive(Debug, Clone, Copy)]
pub struct DomCapabilities {
    /// Whether stylesheet objects can be constructed from script and shared
    /// across shadow roots by reference.
    pub constructable_stylesheets: bool,
}

impl Default for DomCapabilities {
    fn default() -> Self {
        Self {
            constructable_stylesheets: true,
        }
    }
}

/// Handle for a constructible stylesheet object owned by the document.
///
/// Keys are never reused, so a stale handle can only miss, not alias a
/// newer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetKey(pub u64);

/// Shadow subtree state for a host element. `adopted` is the ordered list of
/// stylesheet objects applied inside the subtree; later entries win the
/// cascade, index 0 is the lowest-priority slot.
#[derive(Debug, Clone, Default)]
pub struct ShadowRoot {
    pub adopted: Vec<SheetKey>,
}

/// A document: node tree plus the stylesheet and shadow-root side tables.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    shadow: HashMap<NodeId, ShadowRoot>,
    sheets: HashMap<SheetKey, String>,
    next_sheet: u64,
    caps: DomCapabilities,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_capabilities(DomCapabilities::default())
    }

    /// Build an empty `html > (head, body)` scaffold with the given host
    /// capabilities.
    pub fn with_capabilities(caps: DomCapabilities) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        let html = arena.new_node(element_node("html"));
        let head = arena.new_node(element_node("head"));
        let body = arena.new_node(element_node("body"));
        root.append(html, &mut arena);
        html.append(head, &mut arena);
        html.append(body, &mut arena);
        Self {
            arena,
            root,
            head,
            body,
            shadow: HashMap::new(),
            sheets: HashMap::new(),
            next_sheet: 1,
            caps,
        }
    }

    pub fn capabilities(&self) -> DomCapabilities {
        self.caps
    }

    /// The `<head>` element.
    pub fn head(&self) -> NodeId {
        self.head
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
    }

    fn ensure_present(&self, id: NodeId) -> Result<()> {
        if self.node(id).is_none() {
            bail!("node {id:?} is not part of this document");
        }
        Ok(())
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(element_node(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(DomNode {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        })
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_present(parent)?;
        self.ensure_present(child)?;
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|err| anyhow!("cannot append node: {err}"))
    }

    /// Detach `node` and drop its whole subtree, including any shadow-root
    /// state hanging off removed elements. Removing a node that is already
    /// gone is a no-op.
    pub fn remove_node(&mut self, node: NodeId) {
        if self.node(node).is_none() {
            return;
        }
        let doomed: Vec<NodeId> = node.descendants(&self.arena).collect();
        for id in &doomed {
            self.shadow.remove(id);
        }
        node.remove_subtree(&mut self.arena);
    }

    /// Whether `node` is still part of the document tree.
    pub fn is_connected(&self, node: NodeId) -> bool {
        if self.node(node).is_none() {
            return false;
        }
        node.ancestors(&self.arena).any(|ancestor| ancestor == self.root)
    }

    /// Child nodes of `node` in tree order, empty for removed nodes.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.node(node).is_none() {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Tag name for element nodes, `None` otherwise.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    /// Set an attribute, replacing any existing value. Names are stored
    /// lowercased, matching the host's case-insensitive attribute handling.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let Some(dom_node) = self.node_mut(node) else {
            bail!("node {node:?} is not part of this document");
        };
        if !matches!(dom_node.kind, NodeKind::Element { .. }) {
            bail!("attributes only apply to element nodes");
        }
        if let Some(entry) = dom_node.attrs.iter_mut().find(|(attr, _)| *attr == name) {
            entry.1 = value.to_owned();
        } else {
            dom_node.attrs.push((name, value.to_owned()));
        }
        Ok(())
    }

    /// Current value of an attribute, if set.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        let needle = name.to_ascii_lowercase();
        self.node(node)?
            .attrs
            .iter()
            .find(|(attr, _)| *attr == needle)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the children of `node` with a single text node holding `text`
    /// (no child at all when `text` is empty).
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.ensure_present(node)?;
        let old: Vec<NodeId> = node.children(&self.arena).collect();
        for child in old {
            self.remove_node(child);
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            node.checked_append(text_node, &mut self.arena)
                .map_err(|err| anyhow!("cannot append text node: {err}"))?;
        }
        Ok(())
    }

    /// Concatenated text of all text descendants of `node`.
    pub fn text_content(&self, node: NodeId) -> Option<String> {
        self.node(node)?;
        let mut out = String::new();
        for id in node.descendants(&self.arena) {
            if let Some(DomNode {
                kind: NodeKind::Text { text },
                ..
            }) = self.node(id)
            {
                out.push_str(text);
            }
        }
        Some(out)
    }

    /// Attach a shadow root to an element. Errors when the node is not an
    /// element or already hosts one.
    pub fn attach_shadow(&mut self, element: NodeId) -> Result<()> {
        if self.tag(element).is_none() {
            bail!("cannot attach a shadow root to a non-element node");
        }
        if self.shadow.contains_key(&element) {
            bail!("element {element:?} already hosts a shadow root");
        }
        self.shadow.insert(element, ShadowRoot::default());
        Ok(())
    }

    pub fn shadow_root(&self, element: NodeId) -> Option<&ShadowRoot> {
        self.shadow.get(&element)
    }

    pub fn shadow_root_mut(&mut self, element: NodeId) -> Option<&mut ShadowRoot> {
        self.shadow.get_mut(&element)
    }

    /// Construct a new, empty stylesheet object. Fails hard when the host
    /// lacks constructible-stylesheet support: callers have no fallback
    /// rendering path for per-instance content.
    pub fn create_stylesheet(&mut self) -> Result<SheetKey> {
        if !self.caps.constructable_stylesheets {
            bail!("constructible stylesheets are not supported by this document");
        }
        let key = SheetKey(self.next_sheet);
        self.next_sheet += 1;
        self.sheets.insert(key, String::new());
        debug!("constructed stylesheet {key:?}");
        Ok(key)
    }

    /// Atomically replace the full text of a stylesheet object.
    pub fn replace_sheet_text(&mut self, key: SheetKey, text: &str) -> Result<()> {
        let Some(slot) = self.sheets.get_mut(&key) else {
            bail!("unknown stylesheet {key:?}");
        };
        slot.clear();
        slot.push_str(text);
        Ok(())
    }

    /// Current text of a stylesheet object.
    pub fn sheet_text(&self, key: SheetKey) -> Option<&str> {
        self.sheets.get(&key).map(String::as_str)
    }

    /// Drop a stylesheet object. Unknown keys are a no-op; adopted lists
    /// still holding the key are left to their owners to clean up.
    pub fn remove_stylesheet(&mut self, key: SheetKey) {
        self.sheets.remove(&key);
    }

    /// Native element-matches predicate over the supported selector subset.
    /// Errors on malformed or unsupported selectors and on non-element nodes,
    /// so callers surface bad input instead of silently not matching.
    pub fn matches(&self, element: NodeId, selector: &str) -> Result<bool> {
        let list = SelectorList::parse(selector)?;
        let Some(node) = self.node(element) else {
            bail!("node {element:?} is not part of this document");
        };
        let NodeKind::Element { tag } = &node.kind else {
            bail!("selector matching requires an element node");
        };
        Ok(list.matches(tag, &node.attrs))
    }
}

fn element_node(tag: &str) -> DomNode {
    DomNode {
        kind: NodeKind::Element {
            tag: tag.to_owned(),
        },
        attrs: SmallVec::new(),
    }
}
