//! [`StyleHost`] implementation for [`Document`].

use style_observer_core::{ComputedStyle, StyleHost, TransitionListener};
use tracing::warn;

use super::document::{Document, ElementId};

/// Live computed-style view of one element.
#[derive(Debug, Clone, Copy)]
pub struct ComputedStyleView<'a> {
    document: &'a Document,
    element: ElementId,
}

impl ComputedStyle for ComputedStyleView<'_> {
    fn property_value(&self, name: &str) -> String {
        self.document
            .computed_value(self.element, name)
            .unwrap_or_else(|err| {
                warn!(error = %err, property = %name, "computed style read failed");
                String::new()
            })
    }
}

impl StyleHost for Document {
    type Element = ElementId;
    type Computed<'a> = ComputedStyleView<'a>;

    fn set_style_property(&self, element: &ElementId, name: &str, value: &str) {
        if let Err(err) = self.set_property(*element, name, value) {
            warn!(error = %err, property = %name, "style write failed");
        }
    }

    fn remove_style_property(&self, element: &ElementId, name: &str) {
        if let Err(err) = self.remove_property(*element, name) {
            warn!(error = %err, property = %name, "style removal failed");
        }
    }

    fn computed_style<'a>(&'a self, element: &ElementId) -> ComputedStyleView<'a> {
        ComputedStyleView {
            document: self,
            element: *element,
        }
    }

    fn add_transition_start_listener(
        &self,
        element: &ElementId,
        listener: TransitionListener<ElementId>,
    ) -> anyhow::Result<()> {
        Document::add_transition_start_listener(self, *element, listener)?;
        Ok(())
    }

    fn remove_transition_start_listener(
        &self,
        element: &ElementId,
        listener: &TransitionListener<ElementId>,
    ) {
        if let Err(err) = Document::remove_transition_start_listener(self, *element, listener) {
            warn!(error = %err, "listener removal failed");
        }
    }
}
