/*!
 * Boundary to the rendered chapter content (a DOM subtree or equivalent).
 *
 * Nodes that take part in synchronization carry an id attribute matching a
 * cue id. The engine addresses nodes through `ElementRef` handles it never
 * owns, toggles a marker class on them, and asks the container to scroll.
 */

use std::sync::Arc;
use serde::{Deserialize, Serialize};

/// Non-owning handle to a node inside the content container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub usize);

/// Scroll animation style
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Where the element should land in the visible area
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollAlign {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

/// Options passed to the container's scroll primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollAlign,
}

/// Handler attached to the container's click events, receiving the click target
///
/// Containers detach handlers by pointer identity, like `SignalHandler`.
pub type ClickHandler = Arc<dyn Fn(ElementRef) + Send + Sync>;

/// Host content container
///
/// Methods run while the engine holds its controller lock, so engine queries
/// made from inside them return defaults (see `SyncEngine`).
pub trait ContentContainer: Send + Sync {
    /// First node whose attribute `name` equals `value`
    fn query_by_attribute(&self, name: &str, value: &str) -> Option<ElementRef>;

    /// `from` itself or its nearest ancestor carrying attribute `name`
    fn closest_with_attribute(&self, from: ElementRef, name: &str) -> Option<ElementRef>;

    /// Value of attribute `name` on `element`
    fn attribute(&self, element: ElementRef, name: &str) -> Option<String>;

    fn add_class(&self, element: ElementRef, class: &str);

    fn remove_class(&self, element: ElementRef, class: &str);

    fn has_class(&self, element: ElementRef, class: &str) -> bool;

    /// Whether `element` is inside the visible bounds of the container
    fn is_in_view(&self, element: ElementRef) -> bool;

    /// Start bringing `element` into view; does not wait for the animation
    fn scroll_into_view(&self, element: ElementRef, options: ScrollOptions);

    fn add_click_listener(&self, handler: ClickHandler);

    fn remove_click_listener(&self, handler: &ClickHandler);
}
