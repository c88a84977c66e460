use std::collections::HashMap;

use crate::suggest::{Suggestion, SuggestionStatus};

/// Tallies over the status map, used by diagnostic surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTally {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// In-memory keyed collection of suggestion records plus a parallel status
/// map. Single source of truth for which suggestions exist and their
/// disposition; the mark set in the document is a derived projection of the
/// pending entries, enforced by the mark lifecycle layer, not here.
///
/// No I/O, no interior mutability: the store is owned by whichever session
/// drives it and mutated only from that single-owner context.
#[derive(Debug, Default, Clone)]
pub struct SuggestionStore {
    by_id: HashMap<String, Suggestion>,
    status: HashMap<String, SuggestionStatus>,
    /// Insertion order, so iteration matches analysis response order.
    order: Vec<String>,
}

impl SuggestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replacement: the previous set is dropped and every new
    /// entry starts out pending. Analysis responses land here.
    pub fn replace_all(&mut self, suggestions: Vec<Suggestion>) {
        self.by_id.clear();
        self.status.clear();
        self.order.clear();
        for suggestion in suggestions {
            let id = suggestion.id.clone();
            self.status.insert(id.clone(), SuggestionStatus::Pending);
            if self.by_id.insert(id.clone(), suggestion).is_none() {
                self.order.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.status.clear();
        self.order.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Suggestion> {
        self.by_id.get(id)
    }

    pub fn status(&self, id: &str) -> Option<SuggestionStatus> {
        self.status.get(id).copied()
    }

    /// One-way status transition. Unknown ids are a no-op, not an error:
    /// analysis results may arrive after the document changed underneath
    /// them. Attempts to move a resolved suggestion are ignored too.
    pub fn set_status(&mut self, id: &str, status: SuggestionStatus) {
        match self.status.get_mut(id) {
            Some(current) if *current == SuggestionStatus::Pending => *current = status,
            Some(_) => {
                tracing::debug!(id, "ignoring status transition on resolved suggestion");
            }
            None => {}
        }
    }

    /// All records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Records still pending, in insertion order.
    pub fn pending(&self) -> impl Iterator<Item = &Suggestion> {
        self.iter()
            .filter(|s| self.status(&s.id) == Some(SuggestionStatus::Pending))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn tally(&self) -> StatusTally {
        let mut tally = StatusTally::default();
        for status in self.status.values() {
            match status {
                SuggestionStatus::Pending => tally.pending += 1,
                SuggestionStatus::Accepted => tally.accepted += 1,
                SuggestionStatus::Rejected => tally.rejected += 1,
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::SuggestionKind;

    fn sample(id: &str) -> Suggestion {
        Suggestion::new(SuggestionKind::Grammar, 0, 4, "This", "These").with_id(id)
    }

    #[test]
    fn replace_all_resets_to_pending() {
        let mut store = SuggestionStore::new();
        store.replace_all(vec![sample("a"), sample("b")]);
        store.set_status("a", SuggestionStatus::Accepted);

        store.replace_all(vec![sample("a"), sample("c")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.status("a"), Some(SuggestionStatus::Pending));
        assert_eq!(store.status("b"), None);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut store = SuggestionStore::new();
        store.replace_all(vec![sample("z"), sample("a"), sample("m")]);
        let ids: Vec<&str> = store.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn status_transitions_are_one_way() {
        let mut store = SuggestionStore::new();
        store.replace_all(vec![sample("a")]);

        store.set_status("a", SuggestionStatus::Rejected);
        assert_eq!(store.status("a"), Some(SuggestionStatus::Rejected));

        // No un-reject, no reject-to-accept.
        store.set_status("a", SuggestionStatus::Accepted);
        assert_eq!(store.status("a"), Some(SuggestionStatus::Rejected));
        store.set_status("a", SuggestionStatus::Pending);
        assert_eq!(store.status("a"), Some(SuggestionStatus::Rejected));
    }

    #[test]
    fn unknown_id_is_a_noop() {
        let mut store = SuggestionStore::new();
        store.set_status("ghost", SuggestionStatus::Accepted);
        assert_eq!(store.status("ghost"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn tally_counts_dispositions() {
        let mut store = SuggestionStore::new();
        store.replace_all(vec![sample("a"), sample("b"), sample("c")]);
        store.set_status("a", SuggestionStatus::Accepted);
        store.set_status("b", SuggestionStatus::Rejected);

        let tally = store.tally();
        assert_eq!(tally.pending, 1);
        assert_eq!(tally.accepted, 1);
        assert_eq!(tally.rejected, 1);
        assert_eq!(store.pending().count(), 1);
    }
}
