use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::domain::ConversationEntry;

/// Bounded, shared conversation log. This is the only mutable state
/// shared between requests; everything else on the hot path is
/// immutable after startup.
///
/// The store keeps insertion order and evicts from the front once the
/// cap is exceeded. Clones share the same underlying log.
#[derive(Clone)]
pub struct ConversationStore {
    entries: Arc<Mutex<VecDeque<ConversationEntry>>>,
    cap: usize,
}

impl ConversationStore {
    pub fn new(cap: usize) -> Self {
        Self { entries: Arc::new(Mutex::new(VecDeque::new())), cap }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ConversationEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, entry: ConversationEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.cap {
            entries.pop_front();
        }
    }

    /// Entries in insertion order, optionally restricted to one user.
    pub fn history(&self, user_id: Option<&str>) -> Vec<ConversationEntry> {
        let entries = self.lock();
        match user_id {
            Some(user_id) => entries
                .iter()
                .filter(|entry| entry.user_id.as_deref() == Some(user_id))
                .cloned()
                .collect(),
            None => entries.iter().cloned().collect(),
        }
    }

    /// Drops entries for one user, or everything when no user is
    /// given. Returns how many entries were removed.
    pub fn clear(&self, user_id: Option<&str>) -> usize {
        let mut entries = self.lock();
        match user_id {
            Some(user_id) => {
                let before = entries.len();
                entries.retain(|entry| entry.user_id.as_deref() != Some(user_id));
                before - entries.len()
            }
            None => {
                let removed = entries.len();
                entries.clear();
                removed
            }
        }
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.lock().back().map(|entry| entry.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::config::BotConfig;
    use crate::domain::ConversationEntry;
    use crate::nlp::NlpPipeline;

    use super::ConversationStore;

    fn entry(user_id: Option<&str>, message: &str) -> ConversationEntry {
        let pipeline = NlpPipeline::new(&BotConfig::default());
        ConversationEntry {
            timestamp: Utc::now(),
            user_id: user_id.map(str::to_string),
            message: message.to_string(),
            nlp_result: pipeline.process(message),
        }
    }

    #[test]
    fn history_preserves_insertion_order() {
        let store = ConversationStore::new(50);
        store.append(entry(Some("alice"), "Hello"));
        store.append(entry(Some("alice"), "Where is my order?"));
        store.append(entry(Some("bob"), "Hi"));

        let all = store.history(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].message, "Hello");
        assert_eq!(all[2].message, "Hi");
    }

    #[test]
    fn append_then_query_returns_the_entry_unchanged() {
        let store = ConversationStore::new(50);
        let recorded = entry(Some("alice"), "What is the status of order ORD10001?");

        store.append(recorded.clone());

        // Field-for-field: timestamp, user id, message, and the full
        // analysis (intent, confidence, language, sentiment, entities).
        assert_eq!(store.history(Some("alice")), vec![recorded]);
    }

    #[test]
    fn history_filters_by_user() {
        let store = ConversationStore::new(50);
        store.append(entry(Some("alice"), "Hello"));
        store.append(entry(Some("bob"), "Hi"));
        store.append(entry(None, "anonymous ping"));

        let alice = store.history(Some("alice"));
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].message, "Hello");

        assert!(store.history(Some("carol")).is_empty());
    }

    #[test]
    fn cap_evicts_oldest_entries_first() {
        let store = ConversationStore::new(50);
        for index in 0..55 {
            store.append(entry(Some("alice"), &format!("message {index}")));
        }

        let all = store.history(None);
        assert_eq!(all.len(), 50);
        assert_eq!(all[0].message, "message 5");
        assert_eq!(all[49].message, "message 54");
    }

    #[test]
    fn clear_is_user_scoped() {
        let store = ConversationStore::new(50);
        store.append(entry(Some("alice"), "Hello"));
        store.append(entry(Some("bob"), "Hi"));
        store.append(entry(Some("alice"), "Thanks"));

        let removed = store.clear(Some("alice"));
        assert_eq!(removed, 2);
        assert!(store.history(Some("alice")).is_empty());
        assert_eq!(store.history(Some("bob")).len(), 1);
    }

    #[test]
    fn clear_without_user_drops_everything() {
        let store = ConversationStore::new(50);
        store.append(entry(Some("alice"), "Hello"));
        store.append(entry(None, "ping"));

        assert_eq!(store.clear(None), 2);
        assert!(store.history(None).is_empty());
        assert!(store.latest_timestamp().is_none());
    }

    #[test]
    fn latest_timestamp_tracks_the_newest_entry() {
        let store = ConversationStore::new(50);
        assert!(store.latest_timestamp().is_none());

        store.append(entry(Some("alice"), "Hello"));
        let first = store.latest_timestamp().expect("timestamp should exist");

        store.append(entry(Some("alice"), "Hi again"));
        let second = store.latest_timestamp().expect("timestamp should exist");
        assert!(second >= first);
    }

    #[test]
    fn concurrent_appends_respect_the_cap() {
        let store = ConversationStore::new(50);
        let mut handles = Vec::new();

        for thread_index in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for index in 0..25 {
                    store.append(entry(
                        Some(&format!("user-{thread_index}")),
                        &format!("message {index}"),
                    ));
                }
            }));
        }
        for handle in handles {
            handle.join().expect("writer thread should finish");
        }

        assert_eq!(store.history(None).len(), 50);
    }
}
