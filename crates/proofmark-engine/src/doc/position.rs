//! Mapping between the two coordinate systems the engine has to bridge:
//! flat character offsets into the plain-text projection (what the analysis
//! collaborator reports) and structured document positions (what marks and
//! mutations operate on).

use crate::doc::Document;

/// A resolved position range in the document's own addressing scheme.
/// Derived state: recompute after any document mutation, never store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PosRange {
    pub from: usize,
    pub to: usize,
}

/// Convert a half-open character range `[start_char, end_char)` of the
/// plain-text projection into a document position range.
///
/// Walks text leaves in document order, accumulating a running character
/// counter. The start endpoint resolves inside a leaf's `[c, c+len)`
/// interval; the end endpoint resolves inside `(c, c+len]` so ranges ending
/// exactly at a leaf boundary stay resolvable.
///
/// Returns `None` when either endpoint cannot be resolved, which callers
/// must treat as "suggestion no longer applicable", not as a failure: stale
/// offsets referring to removed text land here routinely.
pub fn map_text_range(doc: &Document, start_char: usize, end_char: usize) -> Option<PosRange> {
    let mut counter = 0;
    let mut from = None;
    let mut to = None;

    for leaf in doc.leaves() {
        let start = counter;
        let end = counter + leaf.len;

        if from.is_none() && start_char >= start && start_char < end {
            from = Some(leaf.pos + (start_char - start));
        }
        if to.is_none() && end_char > start && end_char <= end {
            to = Some(leaf.pos + (end_char - start));
        }

        counter = end;
        if from.is_some() && to.is_some() {
            break;
        }
    }

    match (from, to) {
        (Some(from), Some(to)) => Some(PosRange { from, to }),
        _ => None,
    }
}
