//! Interactive element discovery and marking
//!
//! This module finds the elements of a page that are both visible and
//! interactive, draws a numbered overlay over each and describes them:
//! - PageHost: the page the marker reads from and draws onto
//! - geometry: clipping and occlusion of element fragments
//! - classify: interactivity rules
//! - dedup: removal of candidates nested inside other candidates
//! - Marker: the pipeline and the overlays it owns
//! - PageSnapshot: an in-memory page host

pub mod classify;
pub mod dedup;
pub mod element;
pub mod geometry;
pub mod host;
pub mod marker;
pub mod overlay;
pub mod snapshot;

pub use element::{Candidate, Descriptor};
pub use geometry::{BoundingBox, MIN_VISIBLE_AREA, Viewport};
pub use host::PageHost;
pub use marker::{Marker, collect_candidates};
pub use overlay::{MarkColor, OverlayBox, OverlayRegistry};
pub use snapshot::{HitProbe, NodeId, PageSnapshot, SnapshotNode};

use crate::error::Result;

/// Mark a page once with a fresh marker, returning the descriptors and the
/// marker that now owns the drawn overlays
pub fn mark_page<H: PageHost + ?Sized>(host: &mut H) -> Result<(Vec<Descriptor>, Marker<H::Overlay>)> {
    let mut marker = Marker::new();
    let descriptors = marker.mark(host)?;
    Ok((descriptors, marker))
}
