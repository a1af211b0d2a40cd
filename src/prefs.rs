//! Favorites and download counters, persisted write-through as JSON records

use crate::constants::{DOWNLOADS_KEY, FAVORITES_KEY};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "storage error: {e}"),
            StoreError::Json(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Durable string storage addressed by key
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store, used when the database can't be opened
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct Preferences {
    /// Insertion ordered, no duplicates
    favorites: Vec<String>,
    download_counts: BTreeMap<String, u64>,
    store: Box<dyn KeyValueStore>,
}

impl Preferences {
    /// Read both records; anything missing or unreadable starts empty.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let stored: Vec<String> = load_record(store.as_ref(), FAVORITES_KEY);
        let mut seen = HashSet::new();
        let favorites = stored.into_iter().filter(|id| seen.insert(id.clone())).collect();
        let download_counts = load_record(store.as_ref(), DOWNLOADS_KEY);

        Self {
            favorites,
            download_counts,
            store,
        }
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    /// Add if absent, remove if present. Returns whether `id` is now a favorite.
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        let now_favorite = if let Some(pos) = self.favorites.iter().position(|f| f == id) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(id.to_string());
            true
        };
        debug!(id, favorite = now_favorite, "Favorite toggled");
        let json = serde_json::to_string(&self.favorites);
        self.write_record(FAVORITES_KEY, json);
        now_favorite
    }

    pub fn download_count(&self, id: &str) -> u64 {
        self.download_counts.get(id).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn download_counts(&self) -> &BTreeMap<String, u64> {
        &self.download_counts
    }

    pub fn total_downloads(&self) -> u64 {
        self.download_counts.values().sum()
    }

    /// Count one more download of `id`; never deduplicated.
    pub fn increment_download(&mut self, id: &str) -> u64 {
        let count = self.download_counts.entry(id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        let count = *count;
        let json = serde_json::to_string(&self.download_counts);
        self.write_record(DOWNLOADS_KEY, json);
        count
    }

    /// Whole-record rewrite. A failed write is logged; memory stays authoritative.
    fn write_record(&mut self, key: &str, json: serde_json::Result<String>) {
        let result = json
            .map_err(StoreError::from)
            .and_then(|json| self.store.write(key, &json));
        if let Err(e) = result {
            warn!(key, error = %e, "Failed to persist preferences");
        }
    }
}

fn load_record<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match store.read(key) {
        Ok(Some(text)) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to parse stored preferences, using defaults");
                T::default()
            }
        },
        Ok(None) => {
            debug!(key, "No stored preferences, using defaults");
            T::default()
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored preferences, using defaults");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Store whose contents stay inspectable after being boxed
    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<HashMap<String, String>>>);

    impl KeyValueStore for SharedStore {
        fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.borrow().get(key).cloned())
        }

        fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    fn seeded(pairs: &[(&str, &str)]) -> SharedStore {
        let store = SharedStore::default();
        for (k, v) in pairs {
            store.0.borrow_mut().insert(k.to_string(), v.to_string());
        }
        store
    }

    #[test]
    fn empty_store_loads_empty() {
        let prefs = Preferences::load(Box::new(MemoryStore::default()));
        assert!(prefs.favorites().is_empty());
        assert_eq!(prefs.download_count("001"), 0);
        assert_eq!(prefs.total_downloads(), 0);
    }

    #[test]
    fn toggle_favorite_twice_restores_original() {
        let store = seeded(&[(FAVORITES_KEY, r#"["007"]"#)]);
        let mut prefs = Preferences::load(Box::new(store.clone()));
        let original = prefs.favorites().to_vec();

        assert!(prefs.toggle_favorite("012"));
        assert!(prefs.is_favorite("012"));
        assert!(!prefs.toggle_favorite("012"));

        assert_eq!(prefs.favorites(), original.as_slice());
        assert_eq!(store.0.borrow()[FAVORITES_KEY], r#"["007"]"#);
    }

    #[test]
    fn favorites_keep_insertion_order() {
        let mut prefs = Preferences::load(Box::new(MemoryStore::default()));
        prefs.toggle_favorite("b");
        prefs.toggle_favorite("a");
        prefs.toggle_favorite("c");
        prefs.toggle_favorite("a");
        assert_eq!(prefs.favorites(), ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn increments_are_not_deduplicated() {
        let store = seeded(&[(DOWNLOADS_KEY, r#"{"001":4}"#)]);
        let mut prefs = Preferences::load(Box::new(store.clone()));

        prefs.increment_download("001");
        prefs.increment_download("002");
        prefs.increment_download("001");
        prefs.increment_download("003");
        prefs.increment_download("001");

        assert_eq!(prefs.download_count("001"), 7);
        assert_eq!(prefs.download_count("002"), 1);
        assert_eq!(prefs.total_downloads(), 9);
        assert_eq!(
            store.0.borrow()[DOWNLOADS_KEY],
            r#"{"001":7,"002":1,"003":1}"#
        );
    }

    #[test]
    fn records_survive_reload() {
        let store = SharedStore::default();
        {
            let mut prefs = Preferences::load(Box::new(store.clone()));
            prefs.toggle_favorite("010");
            prefs.increment_download("010");
        }
        let prefs = Preferences::load(Box::new(store));
        assert!(prefs.is_favorite("010"));
        assert_eq!(prefs.download_count("010"), 1);
    }

    #[test]
    fn corrupt_records_fall_back_to_empty() {
        let store = seeded(&[
            (FAVORITES_KEY, "not json"),
            (DOWNLOADS_KEY, r#"{"001":-2}"#),
        ]);
        let prefs = Preferences::load(Box::new(store));
        assert!(prefs.favorites().is_empty());
        assert!(prefs.download_counts().is_empty());
    }

    #[test]
    fn duplicate_stored_favorites_collapse() {
        let store = seeded(&[(FAVORITES_KEY, r#"["a","b","a"]"#)]);
        let prefs = Preferences::load(Box::new(store));
        assert_eq!(prefs.favorites(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn unknown_ids_are_tolerated() {
        let store = seeded(&[(FAVORITES_KEY, r#"["no-such-sheet"]"#)]);
        let prefs = Preferences::load(Box::new(store));
        assert!(prefs.is_favorite("no-such-sheet"));
    }

    #[test]
    fn failing_store_keeps_memory_state() {
        let mut prefs = Preferences::load(Box::new(BrokenStore));
        assert!(prefs.toggle_favorite("001"));
        assert_eq!(prefs.increment_download("001"), 1);
        assert!(prefs.is_favorite("001"));
    }
}
