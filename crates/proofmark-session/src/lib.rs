/*!
 * # proofmark-session
 *
 * Async shell around [`proofmark_engine`]: the analysis collaborator
 * contract, an exponential-backoff retry policy for transient failures,
 * and the debounced analysis session that keeps suggestion marks in sync
 * with a constantly changing document.
 *
 * Scheduling model: single-owner, event-driven. The session's document and
 * store are mutated only inside short synchronous critical sections; the
 * only genuine suspension point is the analysis call itself. Interleaved
 * requests are serialized by a generation tag, giving last-writer-wins
 * semantics keyed on request recency, not response arrival order.
 */

pub mod analyzer;
pub mod retry;
pub mod session;

pub use analyzer::{AnalysisError, AnalysisSettings, AnalyzeFuture, Analyzer};
pub use retry::{RetryPolicy, retry_transient};
pub use session::{AnalysisSession, Phase, SessionConfig, SessionSnapshot, SessionStats};
