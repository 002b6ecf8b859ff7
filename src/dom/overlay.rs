use crate::dom::geometry::BoundingBox;
use crate::dom::host::PageHost;
use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stacking order given to overlays so they paint above page content
pub const OVERLAY_Z_INDEX: i64 = 2_147_483_647;

/// Offset of the index label above the outline's top edge, in px
pub const LABEL_OFFSET_PX: i32 = -19;

/// 24-bit outline color, rendered as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkColor(u32);

impl MarkColor {
    pub fn new(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    /// Pick a random color. Colors are cosmetic and unseeded.
    pub fn random() -> Self {
        Self::new(rand::thread_rng().gen_range(0..0x00ff_ffff))
    }

    pub fn rgb(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MarkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// One overlay to draw: a dashed outline over a rectangle with the owning
/// candidate's index as its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayBox {
    /// Position of the candidate in the marked list
    pub index: usize,

    /// Clipped rectangle the outline covers
    pub rect: BoundingBox,

    pub color: MarkColor,
}

impl OverlayBox {
    pub fn new(index: usize, rect: BoundingBox, color: MarkColor) -> Self {
        Self { index, rect, color }
    }

    /// Inline style of the outline box
    pub fn outline_style(&self) -> String {
        format!(
            "outline: 2px dashed {}; position: fixed; left: {}px; top: {}px; width: {}px; height: {}px; \
             pointer-events: none; box-sizing: border-box; z-index: {};",
            self.color, self.rect.left, self.rect.top, self.rect.width, self.rect.height, OVERLAY_Z_INDEX
        )
    }

    /// Inline style of the index label
    pub fn label_style(&self) -> String {
        format!(
            "position: absolute; top: {}px; left: 0px; background: {}; color: white; \
             padding: 2px 4px; font-size: 12px; border-radius: 2px;",
            LABEL_OFFSET_PX, self.color
        )
    }

    /// Text shown in the label
    pub fn label(&self) -> String {
        self.index.to_string()
    }
}

/// Overlays currently drawn on the page, in drawing order
#[derive(Debug)]
pub struct OverlayRegistry<O> {
    drawn: Vec<O>,
}

impl<O> Default for OverlayRegistry<O> {
    fn default() -> Self {
        Self { drawn: Vec::new() }
    }
}

impl<O> OverlayRegistry<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an overlay the host has drawn
    pub fn record(&mut self, overlay: O) {
        self.drawn.push(overlay);
    }

    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &O> {
        self.drawn.iter()
    }

    /// Remove every recorded overlay from the page.
    ///
    /// Every overlay is attempted. Those whose removal failed stay recorded,
    /// in drawing order, so a later clear retries them; the first failure is
    /// returned.
    pub fn clear<H>(&mut self, host: &mut H) -> Result<()>
    where
        H: PageHost<Overlay = O> + ?Sized,
    {
        let mut first_error = None;
        let mut remaining = Vec::new();

        for overlay in self.drawn.drain(..) {
            if let Err(e) = host.remove_overlay(&overlay) {
                log::warn!("Failed to remove overlay: {}", e);
                first_error.get_or_insert(e);
                remaining.push(overlay);
            }
        }
        self.drawn = remaining;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_format() {
        assert_eq!(MarkColor::new(0).to_string(), "#000000");
        assert_eq!(MarkColor::new(0xabc).to_string(), "#000abc");
        assert_eq!(MarkColor::new(0xff8800).to_string(), "#ff8800");
        assert_eq!(MarkColor::new(0x1ff8800).rgb(), 0xff8800);
    }

    #[test]
    fn test_random_color_is_six_hex_digits() {
        for _ in 0..32 {
            let color = MarkColor::random().to_string();
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_overlay_styles() {
        let overlay = OverlayBox::new(3, BoundingBox::new(10.0, 20.0, 30.0, 40.0), MarkColor::new(0x123456));

        let outline = overlay.outline_style();
        assert!(outline.contains("outline: 2px dashed #123456"));
        assert!(outline.contains("position: fixed"));
        assert!(outline.contains("left: 10px"));
        assert!(outline.contains("height: 40px"));
        assert!(outline.contains("pointer-events: none"));
        assert!(outline.contains("z-index: 2147483647"));

        let label = overlay.label_style();
        assert!(label.contains("top: -19px"));
        assert!(label.contains("background: #123456"));
        assert_eq!(overlay.label(), "3");
    }

    #[test]
    fn test_clear_keeps_overlays_whose_removal_failed() {
        use crate::dom::geometry::Viewport;
        use crate::dom::snapshot::PageSnapshot;
        use crate::dom::snapshot::flaky::FlakyPage;

        let mut host = FlakyPage::new(PageSnapshot::new(Viewport::new(800.0, 600.0))).fail_removals(2);
        let mut registry = OverlayRegistry::new();
        for index in 0..3 {
            let overlay = OverlayBox::new(index, BoundingBox::new(0.0, 0.0, 10.0, 10.0), MarkColor::new(0));
            registry.record(host.append_overlay(&overlay).unwrap());
        }
        let first_two: Vec<_> = registry.iter().take(2).cloned().collect();

        assert!(registry.clear(&mut host).is_err());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.iter().cloned().collect::<Vec<_>>(), first_two);
        assert_eq!(host.page.overlay_count(), 2);

        registry.clear(&mut host).unwrap();
        assert!(registry.is_empty());
        assert_eq!(host.page.overlay_count(), 0);
    }
}
