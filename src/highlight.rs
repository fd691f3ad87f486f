/*!
 * Keeps at most one content node marked as highlighted.
 *
 * The manager remembers the single node it marked. Switching always unmarks
 * that node before resolving and marking the next one, so no sequence of
 * calls can leave two nodes marked.
 */

use log::{debug, warn};

use crate::content::{ContentContainer, ElementRef};
use crate::subtitle_processor::Cue;

/// Tracks the highlighted node for one engine instance
#[derive(Debug, Clone)]
pub struct HighlightManager {
    /// Attribute carrying cue ids
    id_attribute: String,

    /// Prefix tried in front of the id before the bare id
    id_prefix: String,

    /// Marker class
    class: String,

    /// Currently marked node
    current: Option<ElementRef>,
}

impl HighlightManager {
    pub fn new(id_attribute: &str, id_prefix: &str, class: &str) -> Self {
        Self {
            id_attribute: id_attribute.to_string(),
            id_prefix: id_prefix.to_string(),
            class: class.to_string(),
            current: None,
        }
    }

    /// The node currently carrying the marker
    pub fn current(&self) -> Option<ElementRef> {
        self.current
    }

    /// Move the marker to the node for `cue`, or just clear it for `None`
    ///
    /// Returns the newly marked node. A cue without a matching node leaves
    /// nothing highlighted.
    pub fn set_active(&mut self, container: &dyn ContentContainer, cue: Option<&Cue>) -> Option<ElementRef> {
        self.clear(container);

        let cue = cue?;
        match self.resolve(container, &cue.id) {
            Some(element) => {
                container.add_class(element, &self.class);
                self.current = Some(element);
                debug!("Highlighted cue {} ({:?})", cue.id, element);
                Some(element)
            }
            None => {
                warn!(
                    "No content node with {}=\"{}{}\" or \"{}\", cue {} left unhighlighted",
                    self.id_attribute, self.id_prefix, cue.id, cue.id, cue.id
                );
                None
            }
        }
    }

    /// Remove the marker from the held node, if any
    pub fn clear(&mut self, container: &dyn ContentContainer) {
        if let Some(previous) = self.current.take() {
            container.remove_class(previous, &self.class);
        }
    }

    /// Find the node for a cue id, trying the prefixed form first
    pub fn resolve(&self, container: &dyn ContentContainer, cue_id: &str) -> Option<ElementRef> {
        if !self.id_prefix.is_empty() {
            let prefixed = format!("{}{}", self.id_prefix, cue_id);
            if let Some(element) = container.query_by_attribute(&self.id_attribute, &prefixed) {
                return Some(element);
            }
        }
        container.query_by_attribute(&self.id_attribute, cue_id)
    }

    /// Cue id encoded in an attribute value, with the prefix removed
    pub fn cue_id_from_attribute<'a>(&self, value: &'a str) -> &'a str {
        if self.id_prefix.is_empty() {
            return value;
        }
        value.strip_prefix(self.id_prefix.as_str()).unwrap_or(value)
    }
}
