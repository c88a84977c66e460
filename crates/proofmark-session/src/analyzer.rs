//! The analysis collaborator contract. The actual network call lives with
//! the caller; the session only needs an async function from text and
//! settings to suggestions, plus an error taxonomy it can route on.

use std::future::Future;
use std::pin::Pin;

use proofmark_engine::Suggestion;
use serde::{Deserialize, Serialize};

/// Classified analysis failure. Only `Transport` is transient; auth and
/// rate-limit failures must never be retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl AnalysisError {
    pub fn is_transient(&self) -> bool {
        matches!(self, AnalysisError::Transport(_))
    }
}

/// Per-user analysis settings forwarded with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSettings {
    pub brand_tone: String,
    pub reading_level: u8,
    pub banned_words: Vec<String>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            brand_tone: "friendly".to_string(),
            reading_level: 8,
            banned_words: Vec::new(),
        }
    }
}

pub type AnalyzeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Suggestion>, AnalysisError>> + Send + 'a>>;

/// External analysis collaborator. Implementations wrap whatever transport
/// performs the actual AI call; the session never assumes more than this.
///
/// Cancellation is cooperative: the session drops or aborts the future as a
/// best-effort resource saving, and discards late results by generation tag
/// regardless, so implementations need no cancellation support of their own.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, text: String, settings: AnalysisSettings) -> AnalyzeFuture<'_>;
}

impl<A: Analyzer + ?Sized> Analyzer for std::sync::Arc<A> {
    fn analyze(&self, text: String, settings: AnalysisSettings) -> AnalyzeFuture<'_> {
        (**self).analyze(text, settings)
    }
}
