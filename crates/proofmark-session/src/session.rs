//! Debounced analysis coordination.
//!
//! One [`AnalysisSession`] owns a document and its suggestion store and
//! mediates between user edits and the analysis collaborator: text changes
//! arm a trailing-edge debounce timer, timer expiry dispatches an analysis
//! request tagged with a fresh generation number, and results are applied
//! only while their tag is still current. Everything that mutates the
//! document or the store happens inside one synchronous critical section,
//! so mark application is never interleaved with an accept/reject.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use proofmark_engine::{
    Document, ReviewError, Suggestion, SuggestionStore, apply_marks, mark_set_key,
    suggest::review,
};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::analyzer::{AnalysisError, AnalysisSettings, Analyzer};

/// Session tuning knobs. Defaults match the reference behavior: two seconds
/// of quiescence before analysis, nothing analyzed under ten characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub debounce: Duration,
    pub min_analysis_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2000),
            min_analysis_len: 10,
        }
    }
}

/// Coordinator state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Debounce timer armed, waiting for quiescence.
    Waiting,
    /// Request dispatched, response outstanding.
    InFlight,
    /// Shut down with a request still outstanding; its result will be
    /// discarded by tag comparison when it lands.
    Cancelled,
}

/// Diagnostics counters; not part of any control flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionStats {
    pub requests_dispatched: u64,
    pub stale_discards: u64,
    pub last_completed_at: Option<Instant>,
}

/// Immutable view handed to UI surfaces.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// Current suggestion records, in analysis response order.
    pub suggestions: Vec<Suggestion>,
    pub is_loading: bool,
    /// Last current-generation analysis failure, cleared on the next
    /// successful pass. Stale-generation failures never surface here.
    pub error: Option<AnalysisError>,
    pub phase: Phase,
    pub stats: SessionStats,
}

struct State {
    document: Document,
    store: SuggestionStore,
    phase: Phase,
    is_loading: bool,
    error: Option<AnalysisError>,
    /// Memoized [`mark_set_key`] of the currently applied set; performance
    /// guard only, apply_marks is idempotent regardless.
    applied_key: Option<String>,
    stats: SessionStats,
    /// The armed debounce timer or, after it fires, the in-flight request
    /// task, keyed by its spawn epoch so a completing request can tell
    /// whether the slot still belongs to it. Aborting is best-effort
    /// resource saving; correctness always rests on the generation tag.
    task: Option<(u64, JoinHandle<()>)>,
    /// Bumped per spawned timer task; identifies the slot owner.
    epoch: u64,
    shut_down: bool,
}

struct Inner<A> {
    analyzer: A,
    settings: AnalysisSettings,
    config: SessionConfig,
    /// Monotonic request generation counter. Each dispatch captures the
    /// post-increment value as its tag; a result is applied only while its
    /// tag equals the live counter.
    generation: AtomicU64,
    state: Mutex<State>,
}

impl<A> Inner<A> {
    fn state(&self) -> MutexGuard<'_, State> {
        // Recover rather than propagate poisoning: state mutations are
        // small synchronous sections and the data stays consistent.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle on one document's analysis session. Cheap to clone; all clones
/// share the same state.
pub struct AnalysisSession<A: Analyzer + 'static> {
    inner: Arc<Inner<A>>,
}

impl<A: Analyzer + 'static> Clone for AnalysisSession<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Analyzer + 'static> AnalysisSession<A> {
    pub fn new(analyzer: A, document: Document, settings: AnalysisSettings) -> Self {
        Self::with_config(analyzer, document, settings, SessionConfig::default())
    }

    pub fn with_config(
        analyzer: A,
        document: Document,
        settings: AnalysisSettings,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                analyzer,
                settings,
                config,
                generation: AtomicU64::new(0),
                state: Mutex::new(State {
                    document,
                    store: SuggestionStore::new(),
                    phase: Phase::Idle,
                    is_loading: false,
                    error: None,
                    applied_key: None,
                    stats: SessionStats::default(),
                    task: None,
                    epoch: 0,
                    shut_down: false,
                }),
            }),
        }
    }

    /// Apply a user edit to the document and treat it as a text-change
    /// event: the debounce timer resets and a new analysis cycle begins
    /// after quiescence.
    pub fn edit<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let (result, text) = {
            let mut st = self.inner.state();
            let result = f(&mut st.document);
            // The document changed, so the mark-set memo no longer describes
            // it; the next result pass must re-apply even for identical sets.
            st.applied_key = None;
            (result, st.document.text())
        };
        self.schedule_analysis(text);
        result
    }

    /// Re-arm the debounce cycle for the current text without editing,
    /// e.g. when the session is first attached to a document.
    pub fn refresh(&self) {
        let text = self.inner.state().document.text();
        self.schedule_analysis(text);
    }

    pub fn document_text(&self) -> String {
        self.inner.state().document.text()
    }

    pub fn phase(&self) -> Phase {
        self.inner.state().phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let st = self.inner.state();
        SessionSnapshot {
            suggestions: st.store.iter().cloned().collect(),
            is_loading: st.is_loading,
            error: st.error.clone(),
            phase: st.phase,
            stats: st.stats,
        }
    }

    /// Resolve a pointer position to the suggestion id whose mark covers
    /// it. UI click/hover surfaces go through this, not position math.
    pub fn suggestion_at(&self, pos: usize) -> Option<String> {
        self.inner.state().document.suggestion_at(pos).map(|t| t.id)
    }

    /// Accept a suggestion: mutates the text, so the result feeds back in
    /// as a fresh text-change event, re-triggering the debounce cycle
    /// against the new text.
    pub fn accept_suggestion(&self, id: &str) -> Result<(), ReviewError> {
        let text = {
            let mut guard = self.inner.state();
            let st = &mut *guard;
            let outcome = review::accept(&mut st.document, &mut st.store, id)?;
            st.applied_key = None;
            debug_assert!(outcome.text_changed);
            st.document.text()
        };
        self.schedule_analysis(text);
        Ok(())
    }

    /// Reject a suggestion: strips the mark only, text untouched, so no
    /// new analysis cycle is needed.
    pub fn reject_suggestion(&self, id: &str) -> Result<(), ReviewError> {
        let mut guard = self.inner.state();
        let st = &mut *guard;
        review::reject(&mut st.document, &mut st.store, id)?;
        st.applied_key = None;
        Ok(())
    }

    /// Tear the session down: cancel any pending timer and invalidate any
    /// in-flight request. The generation bump guarantees late results are
    /// discarded even if the task abort does not land.
    pub fn shutdown(&self) {
        let mut st = self.inner.state();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        if let Some((_, task)) = st.task.take() {
            task.abort();
        }
        st.phase = if st.phase == Phase::InFlight {
            Phase::Cancelled
        } else {
            Phase::Idle
        };
        st.is_loading = false;
        st.shut_down = true;
        debug!("analysis session shut down");
    }

    /// Trailing-edge debounce: every qualifying text change cancels the
    /// armed timer and arms a fresh one. Text under the minimum length
    /// short-circuits: the store and marks clear immediately and any
    /// outstanding request is invalidated, so a shortened document never
    /// flickers stale suggestions.
    fn schedule_analysis(&self, text: String) {
        let mut st = self.inner.state();
        if st.shut_down {
            return;
        }

        if st.phase == Phase::Waiting
            && let Some((_, task)) = st.task.take()
        {
            task.abort();
        }

        if text.chars().count() < self.inner.config.min_analysis_len {
            debug!(len = text.chars().count(), "text too short, skipping analysis");
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            if let Some((_, task)) = st.task.take() {
                task.abort();
            }
            st.store.clear();
            apply_marks(&mut st.document, &[]);
            st.applied_key = None;
            st.is_loading = false;
            st.error = None;
            st.phase = Phase::Idle;
            return;
        }

        st.phase = Phase::Waiting;
        st.epoch += 1;
        let epoch = st.epoch;
        let debounce = self.inner.config.debounce;
        let inner = Arc::clone(&self.inner);
        st.task = Some((
            epoch,
            tokio::spawn(async move {
                tokio::time::sleep(debounce).await;
                dispatch(inner, epoch).await;
            }),
        ));
    }
}

fn owns_slot(st: &State, epoch: u64) -> bool {
    matches!(st.task, Some((slot, _)) if slot == epoch)
}

/// Timer expiry: capture a fresh generation tag, call the collaborator,
/// and apply the result only if the tag is still current when it lands.
///
/// `epoch` identifies this task's claim on the state's task slot. A newer
/// timer armed while the request is in flight takes the slot over; this
/// request then leaves phase and slot alone on completion, so the armed
/// timer stays cancelable by the next edit.
async fn dispatch<A: Analyzer + 'static>(inner: Arc<Inner<A>>, epoch: u64) {
    let tag = inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
    let text = {
        let mut st = inner.state();
        if st.shut_down || !owns_slot(&st, epoch) {
            return;
        }
        st.phase = Phase::InFlight;
        st.is_loading = true;
        st.error = None;
        st.stats.requests_dispatched += 1;
        st.document.text()
    };
    debug!(tag, chars = text.chars().count(), "dispatching analysis");

    let result = inner.analyzer.analyze(text, inner.settings.clone()).await;

    let mut st = inner.state();
    if tag != inner.generation.load(Ordering::SeqCst) {
        st.stats.stale_discards += 1;
        debug!(tag, "discarding stale analysis result");
        return;
    }

    match result {
        Ok(suggestions) => {
            debug!(tag, count = suggestions.len(), "analysis complete");
            st.store.replace_all(suggestions);
            let current: Vec<Suggestion> = st.store.iter().cloned().collect();
            let key = mark_set_key(&current);
            if st.applied_key.as_deref() != Some(key.as_str()) {
                let report = apply_marks(&mut st.document, &current);
                if report.skipped() > 0 {
                    debug!(
                        applied = report.applied(),
                        skipped = report.skipped(),
                        "some suggestions no longer apply"
                    );
                }
                st.applied_key = Some(key);
            }
            st.stats.last_completed_at = Some(Instant::now());
            st.error = None;
        }
        Err(err) => {
            warn!(tag, %err, "analysis failed");
            st.error = Some(err);
        }
    }
    st.is_loading = false;
    if owns_slot(&st, epoch) {
        st.task = None;
        st.phase = Phase::Idle;
    }
}
