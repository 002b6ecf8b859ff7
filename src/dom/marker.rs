use crate::dom::classify::{is_interactive, normalize_text};
use crate::dom::dedup::remove_nested;
use crate::dom::element::{Candidate, Descriptor};
use crate::dom::geometry::resolve_rects;
use crate::dom::host::PageHost;
use crate::dom::overlay::{MarkColor, OverlayBox, OverlayRegistry};
use crate::error::Result;

/// Marks the interactive elements of a page and owns the overlays it draws.
///
/// A marker keeps the overlays of its last [`Marker::mark`] until the next
/// mark or [`Marker::unmark`]. Calls must not interleave, which `&mut self`
/// enforces.
#[derive(Debug)]
pub struct Marker<O> {
    overlays: OverlayRegistry<O>,
}

impl<O> Default for Marker<O> {
    fn default() -> Self {
        Self {
            overlays: OverlayRegistry::new(),
        }
    }
}

impl<O> Marker<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of overlays currently drawn by this marker
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Remove every overlay this marker has drawn. Safe to call when nothing
    /// is drawn.
    pub fn unmark<H>(&mut self, host: &mut H) -> Result<()>
    where
        H: PageHost<Overlay = O> + ?Sized,
    {
        self.overlays.clear(host)
    }

    /// Find the page's visible interactive elements, draw a numbered overlay
    /// over each of their rectangles and describe them.
    ///
    /// Previous overlays are removed first. Descriptors come out in the
    /// order overlays are drawn: candidates in document order, then each
    /// candidate's rectangles in source order.
    pub fn mark<H>(&mut self, host: &mut H) -> Result<Vec<Descriptor>>
    where
        H: PageHost<Overlay = O> + ?Sized,
    {
        self.unmark(host)?;

        let candidates = collect_candidates(&*host)?;
        let found = candidates.len();
        let candidates = remove_nested(&*host, candidates);
        log::debug!("Marking {} elements ({} nested matches dropped)", candidates.len(), found - candidates.len());

        for (index, candidate) in candidates.iter().enumerate() {
            let color = MarkColor::random();
            for rect in &candidate.rects {
                let overlay = host.append_overlay(&OverlayBox::new(index, *rect, color))?;
                self.overlays.record(overlay);
            }
        }

        Ok(candidates.iter().flat_map(|c| c.descriptors()).collect())
    }
}

/// Walk the document and keep every element that has a visible rectangle
/// and is interactive
pub fn collect_candidates<H: PageHost + ?Sized>(host: &H) -> Result<Vec<Candidate<H::Node>>> {
    let viewport = host.viewport()?;
    let mut candidates = Vec::new();

    for node in host.elements()? {
        let rects = resolve_rects(host, &node, &viewport)?;
        if rects.is_empty() {
            continue;
        }

        let tag_name = host.tag_name(&node);
        let cursor = host.cursor(&node)?;
        if !is_interactive(&tag_name, host.has_click_handler(&node), &cursor) {
            continue;
        }

        let text = normalize_text(&host.text_content(&node));
        let aria_label = host.attribute(&node, "aria-label").unwrap_or_default();
        candidates.push(
            Candidate::new(node, rects, &tag_name)
                .with_text(text)
                .with_aria_label(aria_label),
        );
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::geometry::Viewport;
    use crate::dom::snapshot::flaky::FlakyPage;
    use crate::dom::snapshot::{NodeId, PageSnapshot, SnapshotNode, SnapshotOverlay};

    fn page() -> PageSnapshot {
        let mut page = PageSnapshot::new(Viewport::new(800.0, 600.0));
        page.push(SnapshotNode::new("HTML").with_rect(0.0, 0.0, 800.0, 600.0));
        page
    }

    #[test]
    fn test_button_with_span_yields_one_descriptor() {
        let mut page = page();
        let body = page.push(SnapshotNode::new("BODY").with_rect(0.0, 0.0, 800.0, 600.0));
        let button = page.push(
            SnapshotNode::new("BUTTON")
                .with_parent(body)
                .with_rect(10.0, 10.0, 120.0, 40.0)
                .with_cursor("pointer")
                .with_text("  Submit  "),
        );
        page.push(
            SnapshotNode::new("SPAN")
                .with_parent(button)
                .with_rect(20.0, 20.0, 100.0, 20.0)
                .with_cursor("pointer")
                .with_text("Submit"),
        );

        let mut marker = Marker::<SnapshotOverlay>::new();
        let descriptors = marker.mark(&mut page).unwrap();

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].element_type, "button");
        assert_eq!(descriptors[0].text, "Submit");
        assert_eq!((descriptors[0].x, descriptors[0].y), (70.0, 30.0));
    }

    #[test]
    fn test_zero_size_link_is_not_marked() {
        let mut page = page();
        page.push(SnapshotNode::new("A").with_parent(NodeId(0)));
        page.push(
            SnapshotNode::new("A")
                .with_parent(NodeId(0))
                .with_rect(50.0, 50.0, 0.0, 0.0),
        );

        let mut marker = Marker::new();
        assert!(marker.mark(&mut page).unwrap().is_empty());
        assert_eq!(page.overlay_count(), 0);
    }

    #[test]
    fn test_pointer_div_is_marked() {
        let mut page = page();
        page.push(SnapshotNode::new("DIV").with_rect(100.0, 100.0, 50.0, 50.0).with_cursor("pointer"));
        page.push(SnapshotNode::new("DIV").with_rect(300.0, 100.0, 50.0, 50.0));

        let mut marker = Marker::new();
        let descriptors = marker.mark(&mut page).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].element_type, "div");
        assert_eq!((descriptors[0].x, descriptors[0].y), (125.0, 125.0));
    }

    #[test]
    fn test_onclick_span_is_marked() {
        let mut page = page();
        page.push(SnapshotNode::new("SPAN").with_rect(0.0, 0.0, 40.0, 20.0).with_onclick(true));

        let mut marker = Marker::new();
        let descriptors = marker.mark(&mut page).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].element_type, "span");
    }

    #[test]
    fn test_occluded_element_is_not_marked() {
        let mut page = page();
        page.push(SnapshotNode::new("BUTTON").with_rect(10.0, 10.0, 100.0, 40.0));
        // A modal painted later covers the button's center
        page.push(SnapshotNode::new("DIV").with_rect(0.0, 0.0, 400.0, 400.0));

        let mut marker = Marker::new();
        assert!(marker.mark(&mut page).unwrap().is_empty());
    }

    #[test]
    fn test_mark_twice_does_not_leak() {
        let mut page = page();
        page.push(SnapshotNode::new("INPUT").with_rect(10.0, 10.0, 200.0, 30.0));
        page.push(SnapshotNode::new("A").with_rect(10.0, 60.0, 80.0, 20.0));

        let mut marker = Marker::new();
        marker.mark(&mut page).unwrap();
        let second = marker.mark(&mut page).unwrap();

        assert_eq!(second.len(), 2);
        assert_eq!(page.overlay_count(), second.len());
        assert_eq!(marker.overlay_count(), second.len());
    }

    #[test]
    fn test_unmark_is_idempotent() {
        let mut page = page();
        page.push(SnapshotNode::new("SELECT").with_rect(10.0, 10.0, 200.0, 30.0));

        let mut marker = Marker::new();
        marker.unmark(&mut page).unwrap();
        marker.mark(&mut page).unwrap();
        assert_eq!(page.overlay_count(), 1);

        marker.unmark(&mut page).unwrap();
        marker.unmark(&mut page).unwrap();
        assert_eq!(page.overlay_count(), 0);
        assert_eq!(marker.overlay_count(), 0);
    }

    fn one_button_page() -> PageSnapshot {
        let mut page = page();
        page.push(SnapshotNode::new("BUTTON").with_rect(10.0, 10.0, 100.0, 30.0));
        page
    }

    #[test]
    fn test_failed_removal_is_retried_by_next_unmark() {
        let mut host = FlakyPage::new(one_button_page());
        let mut marker = Marker::new();
        marker.mark(&mut host).unwrap();

        host.failing_removals = 1;
        assert!(marker.unmark(&mut host).is_err());
        assert_eq!(host.page.overlay_count(), 1);
        assert_eq!(marker.overlay_count(), 1);

        marker.unmark(&mut host).unwrap();
        assert_eq!(host.page.overlay_count(), 0);
        assert_eq!(marker.overlay_count(), 0);
    }

    #[test]
    fn test_remark_after_failed_unmark_does_not_leak() {
        let mut host = FlakyPage::new(one_button_page());
        let mut marker = Marker::new();
        marker.mark(&mut host).unwrap();

        host.failing_removals = 1;
        assert!(marker.unmark(&mut host).is_err());

        let descriptors = marker.mark(&mut host).unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(host.page.overlay_count(), 1);
        assert_eq!(marker.overlay_count(), 1);
    }

    #[test]
    fn test_mark_fails_while_old_overlays_cannot_be_removed() {
        let mut host = FlakyPage::new(one_button_page());
        let mut marker = Marker::new();
        marker.mark(&mut host).unwrap();

        host.failing_removals = 1;
        assert!(marker.mark(&mut host).is_err());
        // Nothing new drawn; the stale overlay is still tracked
        assert_eq!(host.page.overlay_count(), 1);
        assert_eq!(marker.overlay_count(), 1);

        marker.mark(&mut host).unwrap();
        assert_eq!(host.page.overlay_count(), 1);
    }

    #[test]
    fn test_failed_append_keeps_drawn_overlays_tracked() {
        let mut page = page();
        page.push(SnapshotNode::new("BUTTON").with_rect(10.0, 10.0, 100.0, 30.0));
        page.push(SnapshotNode::new("A").with_rect(10.0, 60.0, 80.0, 20.0));
        page.push(SnapshotNode::new("INPUT").with_rect(10.0, 100.0, 200.0, 30.0));
        let mut host = FlakyPage::new(page).allow_appends(2);

        let mut marker = Marker::new();
        assert!(marker.mark(&mut host).is_err());
        assert_eq!(host.page.overlay_count(), 2);
        assert_eq!(marker.overlay_count(), 2);

        marker.unmark(&mut host).unwrap();
        assert_eq!(host.page.overlay_count(), 0);
        assert_eq!(marker.overlay_count(), 0);
    }

    #[test]
    fn test_aria_label_defaults_to_empty() {
        let mut page = page();
        page.push(SnapshotNode::new("BUTTON").with_rect(0.0, 0.0, 40.0, 40.0).with_attribute("aria-label", "Close"));
        page.push(SnapshotNode::new("BUTTON").with_rect(100.0, 0.0, 40.0, 40.0));

        let mut marker = Marker::new();
        let descriptors = marker.mark(&mut page).unwrap();
        assert_eq!(descriptors[0].aria_label, "Close");
        assert_eq!(descriptors[1].aria_label, "");
    }
}
