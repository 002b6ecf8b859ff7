use crate::dom::geometry::{BoundingBox, Viewport};
use crate::dom::overlay::OverlayBox;
use crate::error::Result;
use std::fmt::Debug;

/// The page the marker reads from and draws onto.
///
/// A host exposes the live element tree, geometry, computed style and
/// hit-testing, and accepts overlay nodes. The marker never creates or
/// destroys page elements; the only nodes it touches are its own overlays.
///
/// Query methods return [`BrowserError::HostQuery`](crate::BrowserError::HostQuery)
/// when the underlying page APIs are unavailable.
pub trait PageHost {
    /// Opaque reference to an element in the page
    type Node: Clone + PartialEq + Debug;

    /// Handle to an overlay the host has drawn
    type Overlay: Debug;

    /// Current viewport size
    fn viewport(&self) -> Result<Viewport>;

    /// Every element in the document, in document order
    fn elements(&self) -> Result<Vec<Self::Node>>;

    /// Tag name exactly as the DOM reports it (`BUTTON`, or `svg` for
    /// foreign elements)
    fn tag_name(&self, node: &Self::Node) -> String;

    /// Rendered fragments of the element, in source order
    fn client_rects(&self, node: &Self::Node) -> Result<Vec<BoundingBox>>;

    /// Topmost element at a viewport point
    fn element_from_point(&self, x: f64, y: f64) -> Result<Option<Self::Node>>;

    /// Whether `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Resolved `cursor` style
    fn cursor(&self, node: &Self::Node) -> Result<String>;

    /// Whether a handler is set on the legacy `onclick` property.
    ///
    /// Listeners registered through `addEventListener` are not visible here.
    /// Hosts able to see them may report them, which broadens what the
    /// marker treats as interactive.
    fn has_click_handler(&self, node: &Self::Node) -> bool;

    /// Raw text content of the element and its descendants
    fn text_content(&self, node: &Self::Node) -> String;

    /// Attribute value, if present
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Draw an overlay onto the page body
    fn append_overlay(&mut self, overlay: &OverlayBox) -> Result<Self::Overlay>;

    /// Remove an overlay previously returned by [`PageHost::append_overlay`].
    /// Removing one that is already gone succeeds.
    fn remove_overlay(&mut self, overlay: &Self::Overlay) -> Result<()>;
}
