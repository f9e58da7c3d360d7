//! Embedded-mode aggregation: all fragments merge into one shared sheet that
//! every component carries at the lowest-priority slot, so host page styles
//! always win over component defaults.

use anyhow::{Result, bail};
use dom::Document;
use log::{debug, info};

use crate::StyleRuntime;

impl StyleRuntime {
    /// Add one embedded CSS fragment. Exact-duplicate fragments are dropped;
    /// new ones append, the shared sheet is rebuilt as the newline-joined
    /// concatenation of all fragments in submission order, and every
    /// registered component is ensured to carry the sheet. The sheet itself
    /// is created on first use.
    pub fn add_embedded_fragment(&mut self, doc: &mut Document, css: &str) -> Result<()> {
        if !self.caps.constructable_stylesheets {
            bail!("cannot aggregate embedded styles: constructible stylesheets are unsupported");
        }
        if self.embedded_fragments.iter().any(|existing| existing == css) {
            debug!("embedded fragment already aggregated ({} bytes); skipping", css.len());
            return Ok(());
        }
        self.embedded_fragments.push(css.to_owned());

        let sheet = match self.embedded_sheet {
            Some(sheet) => sheet,
            None => {
                let sheet = doc.create_stylesheet()?;
                self.embedded_sheet = Some(sheet);
                sheet
            }
        };
        let merged = self.embedded_fragments.join("\n");
        doc.replace_sheet_text(sheet, &merged)?;
        info!(
            "rebuilt embedded sheet from {} fragments ({} bytes)",
            self.embedded_fragments.len(),
            merged.len()
        );

        for element in self.components.clone() {
            self.prepend_sheet(doc, element, sheet);
        }
        Ok(())
    }
}
