//! The sheet store: identity-stable styles keyed by opaque string ids, with
//! full-replace re-injection and instance-guarded removers.

use anyhow::{Result, bail};
use dom::Document;
use log::debug;

use crate::{GlobalStyle, ScopedStyle, StyleRuntime};

/// Which store a remover points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Global,
    Scoped,
}

/// Owned disposer token for one injected style. Tokens are validated against
/// the instance stamp minted when the underlying resource was created, so a
/// token that outlives its style (disposed, or the id re-created afterwards)
/// is inert.
#[derive(Debug, Clone)]
pub struct StyleRemover {
    kind: StyleKind,
    id: String,
    instance: u64,
}

impl StyleRemover {
    /// Which store this remover points into.
    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    /// The style id this remover was minted for.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl StyleRuntime {
    /// Inject document-wide CSS under `id`. The first call for an id creates
    /// a `<style>` element appended to the document head; every later call
    /// replaces that element's text wholesale, so repeated injection never
    /// accumulates content or nodes.
    pub fn inject_global(
        &mut self,
        doc: &mut Document,
        id: &str,
        css: &str,
    ) -> Result<StyleRemover> {
        if let Some(global) = self.globals.get(id) {
            doc.set_text_content(global.node, css)?;
            debug!("replaced global style {id:?} ({} bytes)", css.len());
            return Ok(StyleRemover {
                kind: StyleKind::Global,
                id: id.to_owned(),
                instance: global.instance,
            });
        }

        let node = doc.create_element("style");
        doc.set_text_content(node, css)?;
        doc.append_child(doc.head(), node)?;
        let instance = self.mint_instance();
        self.globals.insert(id.to_owned(), GlobalStyle { node, instance });
        debug!("injected global style {id:?} ({} bytes)", css.len());
        Ok(StyleRemover {
            kind: StyleKind::Global,
            id: id.to_owned(),
            instance,
        })
    }

    /// Inject CSS under `id` as a constructible sheet scoped to components
    /// matching `selector` (`None` scopes to every component). Every call
    /// replaces both the stored selector and the sheet text, then reconciles
    /// the sheet against all registered components so the new scope takes
    /// effect immediately.
    pub fn inject_scoped(
        &mut self,
        doc: &mut Document,
        id: &str,
        css: &str,
        selector: Option<&str>,
    ) -> Result<StyleRemover> {
        if !self.caps.constructable_stylesheets {
            bail!("cannot inject scoped style {id:?}: constructible stylesheets are unsupported");
        }

        let instance = if let Some(style) = self.scoped.get_mut(id) {
            style.selector = selector.map(str::to_owned);
            doc.replace_sheet_text(style.sheet, css)?;
            debug!("replaced scoped style {id:?} ({} bytes)", css.len());
            style.instance
        } else {
            let sheet = doc.create_stylesheet()?;
            doc.replace_sheet_text(sheet, css)?;
            let instance = self.mint_instance();
            self.scoped.insert(
                id.to_owned(),
                ScopedStyle {
                    sheet,
                    selector: selector.map(str::to_owned),
                    instance,
                },
            );
            self.scoped_order.push(id.to_owned());
            debug!("injected scoped style {id:?} ({} bytes)", css.len());
            instance
        };

        self.reconcile(doc, id)?;
        Ok(StyleRemover {
            kind: StyleKind::Scoped,
            id: id.to_owned(),
            instance,
        })
    }

    /// Dispose the style a remover points at. Infallible and idempotent: a
    /// second call, or a call whose instance stamp no longer matches the
    /// stored style, does nothing.
    pub fn remove_style(&mut self, doc: &mut Document, remover: &StyleRemover) {
        match remover.kind {
            StyleKind::Global => {
                let Some(global) = self.globals.get(&remover.id) else {
                    debug!("stale remover for global style {:?}; ignoring", remover.id);
                    return;
                };
                if global.instance != remover.instance {
                    debug!("stale remover for global style {:?}; ignoring", remover.id);
                    return;
                }
                let node = global.node;
                self.globals.remove(&remover.id);
                doc.remove_node(node);
                debug!("removed global style {:?}", remover.id);
            }
            StyleKind::Scoped => {
                let Some(style) = self.scoped.get(&remover.id) else {
                    debug!("stale remover for scoped style {:?}; ignoring", remover.id);
                    return;
                };
                if style.instance != remover.instance {
                    debug!("stale remover for scoped style {:?}; ignoring", remover.id);
                    return;
                }
                let sheet = style.sheet;
                self.scoped.remove(&remover.id);
                self.scoped_order.retain(|entry| entry != &remover.id);
                self.detach_everywhere(doc, sheet);
                doc.remove_stylesheet(sheet);
                debug!("removed scoped style {:?}", remover.id);
            }
        }
    }
}
