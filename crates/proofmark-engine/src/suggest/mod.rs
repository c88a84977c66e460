/*!
 * # Suggestion module
 *
 * Everything above the document model: the suggestion records and their
 * wire format, the in-memory store with its one-way status map, the mark
 * lifecycle pass that projects pending suggestions onto document marks,
 * and the accept/reject controller.
 *
 * Invariant maintained across this module: the set of suggestion marks in
 * the document is always a projection of the store's pending entries. The
 * store never touches the document itself; [`marks::apply_marks`] is the
 * single place that reconciles the two, and the controller
 * ([`review::accept`] / [`review::reject`]) keeps them in lockstep for
 * individual transitions.
 */

pub mod marks;
pub mod review;
pub mod store;
pub mod suggestion;

pub use marks::{AppliedMarksReport, MarkOutcome, apply_marks, locate_suggestion_range, mark_set_key};
pub use review::{ReviewError, ReviewOutcome, accept, reject};
pub use store::{StatusTally, SuggestionStore};
pub use suggestion::{Suggestion, SuggestionKind, SuggestionStatus, parse_suggestions};
