use crate::dom::host::PageHost;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Smallest clipped area, in square CSS pixels, that still counts as visible
pub const MIN_VISIBLE_AREA: f64 = 20.0;

/// Visible area of the page used to clip element fragments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Combine the document's client size with the window's inner size,
    /// taking the larger of each dimension.
    pub fn from_sizes(client: (f64, f64), inner: (f64, f64)) -> Self {
        Self {
            width: client.0.max(inner.0),
            height: client.1.max(inner.1),
        }
    }

    /// Whether a point lies within `[0, width] x [0, height]`
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

/// Rectangle in viewport-fixed coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Whether a point falls inside the box, edges included
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Intersect with the viewport. The result may have a non-positive
    /// width or height when the box lies entirely outside.
    pub fn clip_to(&self, viewport: &Viewport) -> BoundingBox {
        let left = self.left.max(0.0);
        let top = self.top.max(0.0);
        BoundingBox {
            left,
            top,
            width: viewport.width.min(self.right()) - left,
            height: viewport.height.min(self.bottom()) - top,
        }
    }

    /// Whether the box is large enough to be marked
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.area() >= MIN_VISIBLE_AREA
    }
}

/// Resolve the on-screen rectangles of one element.
///
/// Each client rect is kept only when the topmost element at its center is
/// the element itself or one of its descendants. Survivors are clipped to
/// the viewport and dropped when their clipped area falls under
/// [`MIN_VISIBLE_AREA`]. Rects keep the order the host reports them in.
pub fn resolve_rects<H: PageHost + ?Sized>(
    host: &H,
    node: &H::Node,
    viewport: &Viewport,
) -> Result<Vec<BoundingBox>> {
    let mut visible = Vec::new();

    for fragment in host.client_rects(node)? {
        let (cx, cy) = fragment.center();
        let unoccluded = match host.element_from_point(cx, cy)? {
            Some(topmost) => host.contains(node, &topmost),
            None => false,
        };
        if !unoccluded {
            continue;
        }

        let clipped = fragment.clip_to(viewport);
        if clipped.is_visible() {
            visible.push(clipped);
        }
    }

    Ok(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_takes_larger_dimension() {
        let vp = Viewport::from_sizes((1024.0, 600.0), (1000.0, 768.0));
        assert_eq!(vp, Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn test_clip_inside_viewport_is_unchanged() {
        let vp = Viewport::new(800.0, 600.0);
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bbox.clip_to(&vp), bbox);
    }

    #[test]
    fn test_clip_negative_origin() {
        let vp = Viewport::new(800.0, 600.0);
        let clipped = BoundingBox::new(-30.0, -10.0, 100.0, 50.0).clip_to(&vp);
        assert_eq!(clipped, BoundingBox::new(0.0, 0.0, 70.0, 40.0));
    }

    #[test]
    fn test_clip_overflowing_right_and_bottom() {
        let vp = Viewport::new(800.0, 600.0);
        let clipped = BoundingBox::new(750.0, 580.0, 100.0, 100.0).clip_to(&vp);
        assert_eq!(clipped, BoundingBox::new(750.0, 580.0, 50.0, 20.0));
    }

    #[test]
    fn test_box_outside_viewport_is_not_visible() {
        let vp = Viewport::new(800.0, 600.0);

        // Both dimensions go negative, so their product is positive
        let clipped = BoundingBox::new(900.0, 700.0, 50.0, 50.0).clip_to(&vp);
        assert!(clipped.area() > 0.0);
        assert!(!clipped.is_visible());
    }

    #[test]
    fn test_area_floor() {
        assert!(BoundingBox::new(0.0, 0.0, 4.0, 5.0).is_visible());
        assert!(!BoundingBox::new(0.0, 0.0, 4.0, 4.9).is_visible());
        assert!(!BoundingBox::new(0.0, 0.0, 0.0, 0.0).is_visible());
    }

    #[test]
    fn test_center_and_contains() {
        let bbox = BoundingBox::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(bbox.center(), (60.0, 45.0));
        assert!(bbox.contains_point(10.0, 20.0));
        assert!(bbox.contains_point(110.0, 70.0));
        assert!(!bbox.contains_point(111.0, 45.0));
    }
}
