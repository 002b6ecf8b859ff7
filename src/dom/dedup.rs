use crate::dom::element::Candidate;
use crate::dom::host::PageHost;

/// Drop every candidate whose element descends from another candidate's
/// element, keeping document order.
///
/// This is a tree filter, not a geometric one: a `<span>` inside a
/// `<button>` is dropped even when their boxes differ. Each candidate is
/// checked against all others.
pub fn remove_nested<H: PageHost + ?Sized>(
    host: &H,
    candidates: Vec<Candidate<H::Node>>,
) -> Vec<Candidate<H::Node>> {
    let nested: Vec<bool> = candidates
        .iter()
        .enumerate()
        .map(|(i, item)| {
            candidates
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && host.contains(&other.node, &item.node))
        })
        .collect();

    candidates
        .into_iter()
        .zip(nested)
        .filter_map(|(candidate, nested)| (!nested).then_some(candidate))
        .collect()
}
