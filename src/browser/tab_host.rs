use crate::dom::{BoundingBox, NodeId, OverlayBox, PageHost, PageSnapshot, Viewport};
use crate::error::{BrowserError, Result};
use headless_chrome::Tab;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Attribute carried by every overlay node drawn in a live page
pub const OVERLAY_ATTRIBUTE: &str = "data-browser-marks";

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Overlay drawn in a live tab, identified by its attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOverlay(u64);

impl TabOverlay {
    fn next() -> Self {
        Self(NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A live Chrome tab as a [`PageHost`].
///
/// Element queries answer from a snapshot taken by one collector script,
/// which also records the page's own hit-test at the center of every client
/// rect. Overlays are drawn and removed in the live page.
pub struct TabHost {
    tab: Arc<Tab>,
    snapshot: PageSnapshot,
}

impl TabHost {
    /// Host for drawing and removing overlays only; it reports an empty
    /// document
    pub fn new(tab: Arc<Tab>) -> Self {
        Self {
            tab,
            snapshot: PageSnapshot::new(Viewport::new(0.0, 0.0)),
        }
    }

    /// Capture the tab's elements, geometry and style
    pub fn capture(tab: Arc<Tab>) -> Result<Self> {
        let json = evaluate_string(&tab, include_str!("collect_page.js"))?;
        let snapshot = PageSnapshot::from_json(&json)?;
        log::debug!(
            "Captured {} elements in a {}x{} viewport",
            snapshot.len(),
            snapshot.viewport.width,
            snapshot.viewport.height
        );
        Ok(Self { tab, snapshot })
    }

    pub fn snapshot(&self) -> &PageSnapshot {
        &self.snapshot
    }

    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    fn run(&self, js: &str) -> Result<()> {
        self.tab
            .evaluate(js, false)
            .map_err(|e| BrowserError::EvaluationFailed(format!("Overlay script failed: {}", e)))?;
        Ok(())
    }
}

/// Evaluate a script that returns a string
fn evaluate_string(tab: &Tab, js: &str) -> Result<String> {
    let result = tab
        .evaluate(js, false)
        .map_err(|e| BrowserError::HostQuery(format!("Failed to run page collector: {}", e)))?;

    let value = result
        .value
        .ok_or_else(|| BrowserError::HostQuery("No value returned from page collector".to_string()))?;

    serde_json::from_value(value)
        .map_err(|e| BrowserError::HostQuery(format!("Page collector returned a non-string value: {}", e)))
}

/// Script that appends one overlay to the document body
pub fn append_overlay_script(id: u64, overlay: &OverlayBox) -> Result<String> {
    Ok(format!(
        r#"(function() {{
            const box = document.createElement("div");
            box.setAttribute({attr}, "{id}");
            box.style.cssText = {outline};
            const label = document.createElement("span");
            label.textContent = {label};
            label.style.cssText = {label_style};
            box.appendChild(label);
            document.body.appendChild(box);
            return true;
        }})()"#,
        attr = serde_json::to_string(OVERLAY_ATTRIBUTE)?,
        id = id,
        outline = serde_json::to_string(&overlay.outline_style())?,
        label = serde_json::to_string(&overlay.label())?,
        label_style = serde_json::to_string(&overlay.label_style())?,
    ))
}

/// Script that removes the overlay nodes carrying an id
pub fn remove_overlay_script(id: u64) -> String {
    format!(
        r#"(function() {{
            document.querySelectorAll('[{attr}="{id}"]').forEach(node => node.remove());
            return true;
        }})()"#,
        attr = OVERLAY_ATTRIBUTE,
        id = id,
    )
}

impl PageHost for TabHost {
    type Node = NodeId;
    type Overlay = TabOverlay;

    fn viewport(&self) -> Result<Viewport> {
        self.snapshot.viewport()
    }

    fn elements(&self) -> Result<Vec<NodeId>> {
        self.snapshot.elements()
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.snapshot.tag_name(node)
    }

    fn client_rects(&self, node: &NodeId) -> Result<Vec<BoundingBox>> {
        self.snapshot.client_rects(node)
    }

    fn element_from_point(&self, x: f64, y: f64) -> Result<Option<NodeId>> {
        self.snapshot.element_from_point(x, y)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.snapshot.contains(ancestor, node)
    }

    fn cursor(&self, node: &NodeId) -> Result<String> {
        self.snapshot.cursor(node)
    }

    fn has_click_handler(&self, node: &NodeId) -> bool {
        self.snapshot.has_click_handler(node)
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.snapshot.text_content(node)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.snapshot.attribute(node, name)
    }

    fn append_overlay(&mut self, overlay: &OverlayBox) -> Result<TabOverlay> {
        let handle = TabOverlay::next();
        self.run(&append_overlay_script(handle.id(), overlay)?)?;
        Ok(handle)
    }

    fn remove_overlay(&mut self, overlay: &TabOverlay) -> Result<()> {
        self.run(&remove_overlay_script(overlay.id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MarkColor;

    #[test]
    fn test_append_script_escapes_values() {
        let overlay = OverlayBox::new(12, BoundingBox::new(1.0, 2.0, 30.0, 40.0), MarkColor::new(0x00ff00));
        let js = append_overlay_script(7, &overlay).unwrap();

        assert!(js.contains(r#"box.setAttribute("data-browser-marks", "7")"#));
        assert!(js.contains(r#"label.textContent = "12""#));
        assert!(js.contains("2px dashed #00ff00"));
        assert!(js.contains("document.body.appendChild(box)"));
    }

    #[test]
    fn test_remove_script_targets_one_id() {
        let js = remove_overlay_script(42);
        assert!(js.contains(r#"[data-browser-marks="42"]"#));
        assert!(js.contains("node.remove()"));
    }

    #[test]
    fn test_overlay_ids_are_unique() {
        let first = TabOverlay::next();
        let second = TabOverlay::next();
        assert_ne!(first, second);
    }

    #[test]
    fn test_collector_skips_overlays() {
        let js = include_str!("collect_page.js");
        assert!(js.contains(OVERLAY_ATTRIBUTE));
        assert!(js.contains("elementFromPoint"));
    }
}
