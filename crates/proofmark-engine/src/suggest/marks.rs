//! Mark lifecycle: keeping the document's suggestion marks an exact
//! projection of the pending suggestion set.
//!
//! The whole pass is synchronous and runs to completion; a partially marked
//! document is never observable between steps.

use tracing::{debug, warn};

use crate::doc::{Document, PosRange, SuggestionTag, map_text_range};
use crate::suggest::Suggestion;

/// Per-suggestion outcome of a mark pass. Skips are recovered-local
/// conditions, never surfaced as failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    Applied,
    /// Character offsets no longer resolve to a document range.
    SkippedUnmapped,
    /// The live text at the mapped range differs from `original_text`;
    /// the document drifted since analysis was requested.
    SkippedMismatch { live_text: String },
}

/// Report of one [`apply_marks`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedMarksReport {
    /// Outcome per input suggestion, in input order.
    pub outcomes: Vec<(String, MarkOutcome)>,
    /// Whether the clearance verification found lingering marks that needed
    /// the targeted second pass.
    pub clearance_second_pass: bool,
}

impl AppliedMarksReport {
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == MarkOutcome::Applied)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    pub fn outcome(&self, id: &str) -> Option<&MarkOutcome> {
        self.outcomes
            .iter()
            .find(|(outcome_id, _)| outcome_id == id)
            .map(|(_, o)| o)
    }
}

/// Replace the document's suggestion marks with marks for `suggestions`.
///
/// Steps, each a discrete transactional mutation:
///
/// 1. Clear every existing suggestion mark across the whole document,
///    unconditionally, so no stale mark survives a generation change.
/// 2. Verify clearance; strip any lingering mark leaf-by-leaf.
/// 3. For each suggestion in input order: resolve its range, verify the live
///    text against `original_text`, and set the mark. A failure for one
///    suggestion never aborts the others; it is recorded in the report.
/// 4. Coalesce split marks so every applied suggestion resolves to one
///    contiguous range.
/// 5. Collapse the caret to a neutral position outside all marked ranges.
///
/// The operation is idempotent: the same suggestion set against an unchanged
/// document yields the same mark configuration. Callers wanting to avoid the
/// redundant work can memoize on [`mark_set_key`]; that is a performance
/// guard only.
pub fn apply_marks(doc: &mut Document, suggestions: &[Suggestion]) -> AppliedMarksReport {
    let mut report = AppliedMarksReport::default();

    let end = doc.end_pos();
    doc.clear_suggestion_marks(0, end);

    // Some engines resist bulk-unset across certain boundaries; re-scan and
    // strip whatever survived, one leaf at a time. Re-query after each strip
    // because normalization shifts leaf indices.
    if !doc.marked_leaves().is_empty() {
        report.clearance_second_pass = true;
        warn!("lingering suggestion marks after bulk clear, stripping per leaf");
        while let Some((leaf, _)) = doc.marked_leaves().first().cloned() {
            doc.strip_suggestion_mark(leaf);
        }
    }

    for suggestion in suggestions {
        let outcome = apply_one(doc, suggestion);
        report.outcomes.push((suggestion.id.clone(), outcome));
    }

    // Split-mark post-pass: a range crossing formatting boundaries comes out
    // as several touching fragments; re-apply one mark across their union so
    // accept/reject sees a single coherent range.
    for (id, outcome) in &report.outcomes {
        if *outcome != MarkOutcome::Applied {
            continue;
        }
        let fragments = suggestion_fragments(doc, id);
        if fragments.len() > 1
            && let Some(range) = merge_touching(&fragments)
            && let Some(tag) = doc.suggestion_at(range.from)
        {
            doc.set_suggestion_mark(range.from, range.to, &tag);
        }
    }

    doc.normalize_selection();
    report
}

fn apply_one(doc: &mut Document, suggestion: &Suggestion) -> MarkOutcome {
    let Some(range) = map_text_range(doc, suggestion.start_index, suggestion.end_index) else {
        debug!(
            id = %suggestion.id,
            start = suggestion.start_index,
            end = suggestion.end_index,
            "suggestion offsets no longer resolve, skipping"
        );
        return MarkOutcome::SkippedUnmapped;
    };

    let live_text = doc.text_between(range.from, range.to);
    if live_text != suggestion.original_text {
        debug!(
            id = %suggestion.id,
            expected = %suggestion.original_text,
            found = %live_text,
            "live text mismatch, skipping"
        );
        return MarkOutcome::SkippedMismatch { live_text };
    }

    let tag = SuggestionTag::new(&suggestion.id, suggestion.kind);
    doc.set_suggestion_mark(range.from, range.to, &tag);
    MarkOutcome::Applied
}

/// Raw mark fragments for a suggestion id, in document order.
fn suggestion_fragments(doc: &Document, id: &str) -> Vec<PosRange> {
    doc.marked_leaves()
        .into_iter()
        .filter(|(_, tag)| tag.id == id)
        .map(|(leaf, _)| PosRange {
            from: leaf.pos,
            to: leaf.pos + leaf.len,
        })
        .collect()
}

/// Union of the first run of touching or overlapping fragments. Returns
/// `None` for an empty fragment list.
fn merge_touching(fragments: &[PosRange]) -> Option<PosRange> {
    let mut iter = fragments.iter();
    let first = iter.next()?;
    let mut merged = *first;
    for fragment in iter {
        if fragment.from <= merged.to {
            merged.to = merged.to.max(fragment.to);
        } else {
            // Disjoint fragment group; only possible after external edits.
            warn!(
                gap_start = merged.to,
                gap_end = fragment.from,
                "disjoint mark fragments for one suggestion, using first group"
            );
            break;
        }
    }
    Some(merged)
}

/// Resolve a suggestion's current range by locating its mark in the
/// document, merging split instances. This is how accept/reject finds the
/// text to operate on: never by re-mapping original offsets, which prior
/// edits may have invalidated.
pub fn locate_suggestion_range(doc: &Document, id: &str) -> Option<PosRange> {
    let fragments = suggestion_fragments(doc, id);
    merge_touching(&fragments)
}

/// Stable key over a suggestion set, for callers memoizing [`apply_marks`].
pub fn mark_set_key(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .map(|s| format!("{}-{}-{}", s.id, s.start_index, s.end_index))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Block, FormatSet, TextSpan};
    use crate::suggest::SuggestionKind;
    use pretty_assertions::assert_eq;

    fn grammar(id: &str, start: usize, end: usize, original: &str, fix: &str) -> Suggestion {
        Suggestion::new(SuggestionKind::Grammar, start, end, original, fix).with_id(id)
    }

    #[test]
    fn applies_marks_for_matching_suggestions() {
        let mut doc = Document::from_text("This are a test.");
        let report = apply_marks(&mut doc, &[grammar("s1", 0, 8, "This are", "These are")]);

        assert_eq!(report.applied(), 1);
        assert!(!report.clearance_second_pass);
        let range = locate_suggestion_range(&doc, "s1").expect("mark should exist");
        assert_eq!(doc.text_between(range.from, range.to), "This are");
    }

    #[test]
    fn mismatch_skips_one_without_blocking_others() {
        let mut doc = Document::from_text("This are a test.");
        let suggestions = vec![
            grammar("good-1", 0, 8, "This are", "These are"),
            grammar("bad", 9, 13, "WRONG", "whatever"),
            grammar("good-2", 11, 15, "test", "check"),
        ];
        let report = apply_marks(&mut doc, &suggestions);

        assert_eq!(report.applied(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(matches!(
            report.outcome("bad"),
            Some(MarkOutcome::SkippedMismatch { live_text }) if live_text == "a te"
        ));
        assert!(locate_suggestion_range(&doc, "good-1").is_some());
        assert!(locate_suggestion_range(&doc, "bad").is_none());
        assert!(locate_suggestion_range(&doc, "good-2").is_some());
    }

    #[test]
    fn unresolvable_offsets_are_reported_not_fatal() {
        let mut doc = Document::from_text("short");
        let report = apply_marks(&mut doc, &[grammar("stale", 40, 50, "gone", "x")]);
        assert_eq!(report.outcome("stale"), Some(&MarkOutcome::SkippedUnmapped));
        assert!(doc.marked_leaves().is_empty());
    }

    #[test]
    fn apply_is_idempotent() {
        let mut doc = Document::from_text("This are a test.");
        let suggestions = vec![
            grammar("s1", 0, 8, "This are", "These are"),
            grammar("s2", 11, 15, "test", "check"),
        ];

        let first = apply_marks(&mut doc, &suggestions);
        let marks_after_first = doc.marked_leaves();
        let second = apply_marks(&mut doc, &suggestions);
        let marks_after_second = doc.marked_leaves();

        assert_eq!(first.outcomes, second.outcomes);
        assert_eq!(marks_after_first, marks_after_second);
    }

    #[test]
    fn generation_change_clears_stale_marks() {
        let mut doc = Document::from_text("This are a test.");
        apply_marks(&mut doc, &[grammar("old", 0, 8, "This are", "These are")]);
        assert!(locate_suggestion_range(&doc, "old").is_some());

        apply_marks(&mut doc, &[grammar("new", 11, 15, "test", "check")]);
        assert!(locate_suggestion_range(&doc, "old").is_none());
        assert!(locate_suggestion_range(&doc, "new").is_some());
    }

    #[test]
    fn empty_set_clears_everything() {
        let mut doc = Document::from_text("This are a test.");
        apply_marks(&mut doc, &[grammar("s1", 0, 8, "This are", "These are")]);
        let report = apply_marks(&mut doc, &[]);
        assert!(report.outcomes.is_empty());
        assert!(doc.marked_leaves().is_empty());
    }

    #[test]
    fn split_mark_resolves_to_one_range() {
        // "This has bold text inside": "bold text" is a separate bold span,
        // so a mark over "has bold text in" splits into three fragments.
        let mut doc = Document::from_blocks(vec![Block::Paragraph {
            spans: vec![
                TextSpan::plain("This has "),
                TextSpan::formatted("bold text", FormatSet::bold()),
                TextSpan::plain(" inside"),
            ],
        }]);
        let suggestion = Suggestion::new(
            SuggestionKind::Readability,
            5,
            21,
            "has bold text in",
            "contains styled text in",
        )
        .with_id("split");

        let report = apply_marks(&mut doc, &[suggestion]);
        assert_eq!(report.applied(), 1);

        let fragments: Vec<_> = doc
            .marked_leaves()
            .into_iter()
            .filter(|(_, tag)| tag.id == "split")
            .collect();
        assert!(fragments.len() > 1, "formatting boundary splits the mark");

        let range = locate_suggestion_range(&doc, "split").expect("coalesced range");
        assert_eq!(doc.text_between(range.from, range.to), "has bold text in");
    }

    #[test]
    fn caret_lands_outside_marked_ranges() {
        let mut doc = Document::from_text("This are a test.");
        doc.set_selection(3..3);
        apply_marks(&mut doc, &[grammar("s1", 0, 8, "This are", "These are")]);

        let caret = doc.selection().start;
        let range = locate_suggestion_range(&doc, "s1").unwrap();
        assert!(caret < range.from || caret >= range.to);
    }

    #[test]
    fn mark_set_key_tracks_ids_and_offsets() {
        let a = vec![grammar("s1", 0, 8, "This are", "These are")];
        let mut b = a.clone();
        assert_eq!(mark_set_key(&a), mark_set_key(&b));
        b[0].end_index = 9;
        assert_ne!(mark_set_key(&a), mark_set_key(&b));
    }
}
