//! Accept/reject controller: the one-way `pending -> accepted | rejected`
//! state machine, mutating text and marks consistently.

use tracing::debug;

use crate::doc::{DocError, Document, PosRange};
use crate::suggest::marks::locate_suggestion_range;
use crate::suggest::{SuggestionStatus, SuggestionStore};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The id is not in the store at all.
    #[error("unknown suggestion {0}")]
    UnknownSuggestion(String),
    /// The suggestion was already accepted or rejected; terminal states
    /// admit no further transitions.
    #[error("suggestion {0} is already resolved")]
    AlreadyResolved(String),
    /// No mark carrying the id exists in the document: the underlying text
    /// was modified by another edit. No mutation happened.
    #[error("no mark found for suggestion {0}")]
    MarkNotFound(String),
    #[error(transparent)]
    Document(#[from] DocError),
}

/// What a successful accept/reject did, so the driving layer knows whether
/// to treat it as a fresh text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    /// Range the mark covered at resolution time.
    pub range: PosRange,
    /// True for accept: the document text mutated, which invalidates every
    /// other pending suggestion's precomputed offsets. The coordinator must
    /// re-trigger its debounce cycle off this.
    pub text_changed: bool,
}

/// Accept a suggestion: replace the covered text with `suggestion_text`,
/// remove the mark, transition the status.
///
/// The range comes from locating the mark, not from re-mapping the original
/// character offsets; prior edits or prior accepts may have shifted
/// positions. Nothing is mutated unless every precondition holds.
pub fn accept(
    doc: &mut Document,
    store: &mut SuggestionStore,
    id: &str,
) -> Result<ReviewOutcome, ReviewError> {
    let suggestion = store
        .get(id)
        .ok_or_else(|| ReviewError::UnknownSuggestion(id.to_string()))?;
    if store.status(id) != Some(SuggestionStatus::Pending) {
        return Err(ReviewError::AlreadyResolved(id.to_string()));
    }
    let replacement = suggestion.suggestion_text.clone();

    let range =
        locate_suggestion_range(doc, id).ok_or_else(|| ReviewError::MarkNotFound(id.to_string()))?;

    doc.clear_suggestion_marks(range.from, range.to);
    doc.replace_range(range.from, range.to, &replacement)?;
    store.set_status(id, SuggestionStatus::Accepted);
    debug!(id, from = range.from, to = range.to, "suggestion accepted");

    Ok(ReviewOutcome {
        range,
        text_changed: true,
    })
}

/// Reject a suggestion: strip the mark, leave the text untouched,
/// transition the status.
pub fn reject(
    doc: &mut Document,
    store: &mut SuggestionStore,
    id: &str,
) -> Result<ReviewOutcome, ReviewError> {
    if store.get(id).is_none() {
        return Err(ReviewError::UnknownSuggestion(id.to_string()));
    }
    if store.status(id) != Some(SuggestionStatus::Pending) {
        return Err(ReviewError::AlreadyResolved(id.to_string()));
    }

    let range =
        locate_suggestion_range(doc, id).ok_or_else(|| ReviewError::MarkNotFound(id.to_string()))?;

    doc.clear_suggestion_marks(range.from, range.to);
    store.set_status(id, SuggestionStatus::Rejected);
    debug!(id, from = range.from, to = range.to, "suggestion rejected");

    Ok(ReviewOutcome {
        range,
        text_changed: false,
    })
}
