use std::collections::HashMap;

use crate::api::HistoryRecord;

/// Expand/collapse state for one record's previews. Prompt and response
/// toggle independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expansion {
    pub prompt: bool,
    pub response: bool,
}

/// Client-side cache of the server's prompt history, in server order.
/// After any successful mutation the sequence is either replaced wholesale
/// or has exactly the affected record removed, never partially patched.
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Vec<HistoryRecord>,
    expanded: HashMap<i64, Expansion>,
}

impl HistoryStore {
    pub fn new() -> Self {
        HistoryStore::default()
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&HistoryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Replace the whole cache with a fresh server fetch. Expand state
    /// belongs to the replaced list and resets with it.
    pub fn replace(&mut self, records: Vec<HistoryRecord>) {
        self.records = records;
        self.expanded.clear();
    }

    /// Remove exactly the record matching `id`. Unknown ids are a no-op.
    pub fn remove(&mut self, id: i64) -> bool {
        match self.records.iter().position(|r| r.id == id) {
            Some(index) => {
                self.records.remove(index);
                self.expanded.remove(&id);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.expanded.clear();
    }

    pub fn expansion(&self, id: i64) -> Expansion {
        self.expanded.get(&id).copied().unwrap_or_default()
    }

    pub fn toggle_prompt(&mut self, id: i64) {
        let entry = self.expanded.entry(id).or_default();
        entry.prompt = !entry.prompt;
    }

    pub fn toggle_response(&mut self, id: i64) {
        let entry = self.expanded.entry(id).or_default();
        entry.response = !entry.response;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiType;
    use pretty_assertions::assert_eq;

    fn record(id: i64, prompt: &str) -> HistoryRecord {
        HistoryRecord {
            id,
            prompt: prompt.to_string(),
            response: String::new(),
            api_type: ApiType::Chat,
            timestamp: "2025-05-27T12:00:00".to_string(),
        }
    }

    fn store_with(ids: &[i64]) -> HistoryStore {
        let mut store = HistoryStore::new();
        store.replace(ids.iter().map(|&id| record(id, "p")).collect());
        store
    }

    #[test]
    fn remove_takes_exactly_one_and_keeps_order() {
        let mut store = store_with(&[5, 4, 3, 2]);
        assert!(store.remove(4));
        let ids: Vec<i64> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 3, 2]);
    }

    #[test]
    fn remove_of_unknown_id_is_a_noop() {
        let mut store = store_with(&[2, 1]);
        assert!(!store.remove(99));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replace_swaps_contents_and_resets_expansion() {
        let mut store = store_with(&[1, 2]);
        store.toggle_prompt(1);
        assert!(store.expansion(1).prompt);

        store.replace(vec![record(1, "again"), record(3, "new")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.expansion(1), Expansion::default());
    }

    #[test]
    fn clear_empties_the_cache() {
        let mut store = store_with(&[1, 2, 3]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn expansion_is_per_record_and_per_field() {
        let mut store = store_with(&[1, 2]);
        store.toggle_prompt(1);
        store.toggle_response(2);

        assert!(store.expansion(1).prompt);
        assert!(!store.expansion(1).response);
        assert!(!store.expansion(2).prompt);
        assert!(store.expansion(2).response);

        store.toggle_prompt(1);
        assert!(!store.expansion(1).prompt);
    }

    #[test]
    fn removing_a_record_drops_its_expansion_state() {
        let mut store = store_with(&[1, 2]);
        store.toggle_prompt(1);
        store.remove(1);
        store.replace(vec![record(1, "back"), record(2, "kept")]);
        assert_eq!(store.expansion(1), Expansion::default());
    }

    #[test]
    fn get_finds_by_id() {
        let store = store_with(&[7, 8]);
        assert_eq!(store.get(8).map(|r| r.id), Some(8));
        assert!(store.get(9).is_none());
    }
}
