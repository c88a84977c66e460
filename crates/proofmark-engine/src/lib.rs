/*!
 * # proofmark-engine
 *
 * Synchronous core of the suggestion engine: a structured rich-text
 * document model with position mapping between flat character offsets and
 * tree positions, the suggestion mark lifecycle, the keyed suggestion
 * store, and the accept/reject controller.
 *
 * Everything in this crate is single-owner and synchronous; the async
 * coordination lives in `proofmark-session`.
 */

pub mod doc;
pub mod suggest;

// Re-export key types for easier usage
pub use doc::{Block, DocError, Document, FormatSet, Leaf, PosRange, SuggestionTag, TextSpan};
pub use suggest::{
    AppliedMarksReport, MarkOutcome, ReviewError, ReviewOutcome, StatusTally, Suggestion,
    SuggestionKind, SuggestionStatus, SuggestionStore, accept, apply_marks,
    locate_suggestion_range, mark_set_key, parse_suggestions, reject,
};
