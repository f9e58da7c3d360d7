//! Component registry: connect/disconnect notifications from the component
//! framework, absorbed idempotently.

use anyhow::{Result, bail};
use dom::{Document, NodeId, SheetKey};
use log::debug;

use crate::StyleRuntime;

impl StyleRuntime {
    /// Record that a component's element entered the document. Fails when the
    /// node is not an element of this document or carries no shadow root;
    /// both are caller programming errors, and skipping silently would leave
    /// an unstyled component with no diagnostic. Double notifications are
    /// absorbed: membership is checked before insert, and the catch-up sweep
    /// below is idempotent.
    pub fn component_connected(&mut self, doc: &mut Document, element: NodeId) -> Result<()> {
        if doc.tag(element).is_none() {
            bail!("connect notification for {element:?}, which is not an element in this document");
        }
        if doc.shadow_root(element).is_none() {
            bail!("component {element:?} has no shadow root to scope styles into");
        }
        if !self.components.contains(&element) {
            self.components.push(element);
            debug!("registered component {element:?} ({} total)", self.components.len());
        }
        self.reconcile_component(doc, element)
    }

    /// Record that a component's element left the document. Removes it from
    /// the registry and detaches every runtime-owned sheet from its adopted
    /// list by identity; entries adopted by other code are preserved.
    /// Disconnecting a component that was never connected is tolerated.
    pub fn component_disconnected(&mut self, doc: &mut Document, element: NodeId) -> Result<()> {
        if doc.tag(element).is_none() {
            bail!("disconnect notification for {element:?}, which is not an element in this document");
        }
        if doc.shadow_root(element).is_none() {
            bail!("component {element:?} has no shadow root to detach styles from");
        }
        self.components.retain(|entry| *entry != element);
        // Identity-based detach: the selector is not re-evaluated, because
        // attributes may have changed since the sheet was attached.
        for sheet in self.owned_sheets() {
            self.unadopt_sheet(doc, element, sheet);
        }
        debug!("unregistered component {element:?} ({} remain)", self.components.len());
        Ok(())
    }

    /// Every sheet the runtime currently owns: all scoped sheets plus the
    /// shared embedded sheet.
    fn owned_sheets(&self) -> Vec<SheetKey> {
        let mut owned: Vec<SheetKey> = self.scoped.values().map(|style| style.sheet).collect();
        if let Some(sheet) = self.embedded_sheet {
            owned.push(sheet);
        }
        owned
    }
}
