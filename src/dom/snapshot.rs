use crate::dom::geometry::{BoundingBox, Viewport};
use crate::dom::host::PageHost;
use crate::dom::overlay::OverlayBox;
use crate::error::{BrowserError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Position of an element in a [`PageSnapshot`], in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Handle to an overlay drawn on a [`PageSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotOverlay(usize);

/// One element as captured from a page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotNode {
    /// Tag name as the DOM reports it
    pub tag_name: String,

    /// Parent element, `None` for the document element
    #[serde(default)]
    pub parent: Option<NodeId>,

    /// Client rects in source order
    #[serde(default)]
    pub rects: Vec<BoundingBox>,

    /// Resolved `cursor` style
    #[serde(default = "default_cursor")]
    pub cursor: String,

    /// Whether the legacy `onclick` property is set
    #[serde(default)]
    pub has_onclick: bool,

    /// Raw text content
    #[serde(default)]
    pub text_content: String,

    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Whether the element can be the target of a hit-test
    /// (`pointer-events` other than `none`, not `visibility: hidden`)
    #[serde(default = "default_hit_testable")]
    pub hit_testable: bool,
}

// Probe coordinates travel through JSON and may lose the last bit
fn same_point(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn default_cursor() -> String {
    "auto".to_string()
}

fn default_hit_testable() -> bool {
    true
}

impl SnapshotNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            parent: None,
            rects: Vec::new(),
            cursor: default_cursor(),
            has_onclick: false,
            text_content: String::new(),
            attributes: HashMap::new(),
            hit_testable: true,
        }
    }

    /// Builder method: set parent
    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder method: add a client rect
    pub fn with_rect(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.rects.push(BoundingBox::new(left, top, width, height));
        self
    }

    /// Builder method: set cursor
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    /// Builder method: set the legacy click handler flag
    pub fn with_onclick(mut self, has_onclick: bool) -> Self {
        self.has_onclick = has_onclick;
        self
    }

    /// Builder method: set text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = text.into();
        self
    }

    /// Builder method: add an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: set hit-testability
    pub fn with_hit_testable(mut self, hit_testable: bool) -> Self {
        self.hit_testable = hit_testable;
        self
    }
}

/// Recorded hit-test: the element the live page reported at a point
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HitProbe {
    pub x: f64,
    pub y: f64,
    pub hit: Option<NodeId>,
}

/// In-memory page: elements, their geometry and style, and the overlays
/// drawn over them.
///
/// Hit-tests answer from recorded probes when one exists for the exact
/// point. Otherwise the topmost element is the last hit-testable element in
/// document order whose rects contain the point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub viewport: Viewport,

    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,

    #[serde(default)]
    pub probes: Vec<HitProbe>,

    #[serde(skip)]
    overlays: Vec<Option<OverlayBox>>,
}

impl PageSnapshot {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            nodes: Vec::new(),
            probes: Vec::new(),
            overlays: Vec::new(),
        }
    }

    /// Parse the JSON produced by the page collector script and check that
    /// every node reference points inside the snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        let out_of_range = |id: &NodeId| id.0 >= len;

        if let Some(node) = self.nodes.iter().find(|n| n.parent.as_ref().is_some_and(out_of_range)) {
            return Err(BrowserError::HostQuery(format!(
                "Snapshot node <{}> has a parent outside the document",
                node.tag_name
            )));
        }
        if self.probes.iter().any(|p| p.hit.as_ref().is_some_and(out_of_range)) {
            return Err(BrowserError::HostQuery(
                "Snapshot hit-test refers to an unknown element".to_string(),
            ));
        }
        Ok(())
    }

    /// Append an element and return its id
    pub fn push(&mut self, node: SnapshotNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Record what the live page reported at a point
    pub fn record_probe(&mut self, x: f64, y: f64, hit: Option<NodeId>) {
        self.probes.push(HitProbe { x, y, hit });
    }

    pub fn node(&self, id: NodeId) -> Option<&SnapshotNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Overlays currently drawn, in drawing order
    pub fn overlays(&self) -> impl Iterator<Item = &OverlayBox> {
        self.overlays.iter().flatten()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays().count()
    }

    fn require(&self, id: NodeId) -> Result<&SnapshotNode> {
        self.node(id)
            .ok_or_else(|| BrowserError::HostQuery(format!("Unknown element {}", id.0)))
    }

    fn painted_at(&self, x: f64, y: f64) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| node.hit_testable && node.rects.iter().any(|r| r.contains_point(x, y)))
            .map(|(i, _)| NodeId(i))
    }
}

impl PageHost for PageSnapshot {
    type Node = NodeId;
    type Overlay = SnapshotOverlay;

    fn viewport(&self) -> Result<Viewport> {
        Ok(self.viewport)
    }

    fn elements(&self) -> Result<Vec<NodeId>> {
        Ok((0..self.nodes.len()).map(NodeId).collect())
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.node(*node).map(|n| n.tag_name.clone()).unwrap_or_default()
    }

    fn client_rects(&self, node: &NodeId) -> Result<Vec<BoundingBox>> {
        Ok(self.require(*node)?.rects.clone())
    }

    fn element_from_point(&self, x: f64, y: f64) -> Result<Option<NodeId>> {
        if let Some(probe) = self.probes.iter().find(|p| same_point(p.x, x) && same_point(p.y, y)) {
            return Ok(probe.hit);
        }
        Ok(self.painted_at(x, y))
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(*node);
        // Parent chains are bounded by the node count; a malformed cycle stops there
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == *ancestor => return true,
                Some(id) => current = self.node(id).and_then(|n| n.parent),
                None => return false,
            }
        }
        false
    }

    fn cursor(&self, node: &NodeId) -> Result<String> {
        Ok(self.require(*node)?.cursor.clone())
    }

    fn has_click_handler(&self, node: &NodeId) -> bool {
        self.node(*node).is_some_and(|n| n.has_onclick)
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.node(*node).map(|n| n.text_content.clone()).unwrap_or_default()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.node(*node).and_then(|n| n.attributes.get(name).cloned())
    }

    fn append_overlay(&mut self, overlay: &OverlayBox) -> Result<SnapshotOverlay> {
        self.overlays.push(Some(overlay.clone()));
        Ok(SnapshotOverlay(self.overlays.len() - 1))
    }

    fn remove_overlay(&mut self, overlay: &SnapshotOverlay) -> Result<()> {
        if let Some(slot) = self.overlays.get_mut(overlay.0) {
            *slot = None;
        }
        Ok(())
    }
}
