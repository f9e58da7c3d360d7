//! Scoped propagation: reconciling stored sheets against the registered
//! component population via the document's element-matches primitive.
//!
//! Matching happens at injection time and at connect time only; attribute
//! changes after connection do not re-trigger it. Detach paths never consult
//! the selector, they work by sheet identity.

use anyhow::Result;
use dom::{Document, NodeId, SheetKey};
use log::{debug, trace};
use tracing::info_span;

use crate::StyleRuntime;

impl StyleRuntime {
    /// Re-evaluate one scoped style against every registered component:
    /// attach where the selector now matches, detach where it no longer
    /// does. A stored selector of `None` matches every component. Selector
    /// errors from the matches primitive propagate to the caller.
    pub fn reconcile(&mut self, doc: &mut Document, id: &str) -> Result<()> {
        let Some(style) = self.scoped.get(id) else {
            debug!("reconcile for unknown scoped style {id:?}; nothing to do");
            return Ok(());
        };
        let sheet = style.sheet;
        let selector = style.selector.clone();

        let _span = info_span!("style_injection.reconcile").entered();
        for element in self.components.clone() {
            let applies = match selector.as_deref() {
                None => true,
                Some(sel) => doc.matches(element, sel)?,
            };
            if applies {
                self.adopt_sheet(doc, element, sheet);
            } else {
                self.unadopt_sheet(doc, element, sheet);
            }
        }
        Ok(())
    }

    /// Bring one component fully up to date: the shared embedded sheet at
    /// the lowest-priority slot, then every stored scoped sheet in
    /// first-injection order per its current selector.
    pub fn reconcile_component(&mut self, doc: &mut Document, element: NodeId) -> Result<()> {
        let _span = info_span!("style_injection.reconcile_component").entered();
        if let Some(sheet) = self.embedded_sheet {
            self.prepend_sheet(doc, element, sheet);
        }
        for id in self.scoped_order.clone() {
            let Some(style) = self.scoped.get(&id) else {
                continue;
            };
            let sheet = style.sheet;
            let selector = style.selector.clone();
            let applies = match selector.as_deref() {
                None => true,
                Some(sel) => doc.matches(element, sel)?,
            };
            if applies {
                self.adopt_sheet(doc, element, sheet);
            } else {
                self.unadopt_sheet(doc, element, sheet);
            }
        }
        Ok(())
    }

    /// Full sweep: reconcile every registered component against every stored
    /// sheet. Exposed for host-driven refreshes.
    pub fn reconcile_all(&mut self, doc: &mut Document) -> Result<()> {
        let _span = info_span!("style_injection.reconcile_all").entered();
        for element in self.components.clone() {
            self.reconcile_component(doc, element)?;
        }
        Ok(())
    }

    /// Append `sheet` to the component's adopted list unless it is already
    /// there.
    pub(crate) fn adopt_sheet(&mut self, doc: &mut Document, element: NodeId, sheet: SheetKey) {
        let Some(root) = doc.shadow_root_mut(element) else {
            debug!("component {element:?} lost its shadow root; skipping adopt");
            return;
        };
        if root.adopted.contains(&sheet) {
            return;
        }
        root.adopted.push(sheet);
        self.total_adopt_count += 1;
        trace!("adopted sheet {sheet:?} into component {element:?}");
    }

    /// Insert `sheet` at the lowest-priority slot of the component's adopted
    /// list unless it is already present somewhere.
    pub(crate) fn prepend_sheet(&mut self, doc: &mut Document, element: NodeId, sheet: SheetKey) {
        let Some(root) = doc.shadow_root_mut(element) else {
            debug!("component {element:?} lost its shadow root; skipping adopt");
            return;
        };
        if root.adopted.contains(&sheet) {
            return;
        }
        root.adopted.insert(0, sheet);
        self.total_adopt_count += 1;
        trace!("adopted sheet {sheet:?} at the bottom of component {element:?}");
    }

    /// Remove `sheet` from the component's adopted list by identity. Other
    /// entries, including sheets adopted by foreign code, stay untouched.
    pub(crate) fn unadopt_sheet(&mut self, doc: &mut Document, element: NodeId, sheet: SheetKey) {
        let Some(root) = doc.shadow_root_mut(element) else {
            debug!("component {element:?} lost its shadow root; skipping detach");
            return;
        };
        let before = root.adopted.len();
        root.adopted.retain(|entry| *entry != sheet);
        if root.adopted.len() != before {
            self.total_unadopt_count += 1;
            trace!("removed sheet {sheet:?} from component {element:?}");
        }
    }

    /// Detach `sheet` from every registered component.
    pub(crate) fn detach_everywhere(&mut self, doc: &mut Document, sheet: SheetKey) {
        for element in self.components.clone() {
            self.unadopt_sheet(doc, element, sheet);
        }
    }
}
