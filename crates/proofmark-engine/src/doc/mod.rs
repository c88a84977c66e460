/*!
 * # Structured document module
 *
 * The document model the suggestion engine runs against: a tree of block
 * nodes (paragraphs, headings) holding text leaves with inline formatting
 * and suggestion marks.
 *
 * Two coordinate systems meet here:
 *
 * - **Flat character offsets** into the plain-text projection
 *   ([`Document::text`]), which is how the analysis collaborator reports
 *   suggestion ranges.
 * - **Document positions**, monotonically increasing integers assigned to
 *   every traversable point including block boundaries, which is what marks
 *   and mutations operate on.
 *
 * [`position::map_text_range`] bridges the two by walking text leaves in
 * document order. Positions are derived state: any mutation invalidates
 * them, so they are recomputed on demand and never persisted.
 *
 * All mutations ([`Document::set_suggestion_mark`],
 * [`Document::clear_suggestion_marks`], [`Document::replace_range`]) are
 * synchronous transactional steps that renormalize the span tree and bump
 * the document version.
 */

pub mod document;
pub mod node;
pub mod position;

pub use document::{DocError, Document};
pub use node::{Block, FormatSet, Leaf, SuggestionTag, TextSpan};
pub use position::{PosRange, map_text_range};
