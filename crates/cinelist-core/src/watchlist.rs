use crate::calculate::{average, average_runtime};
use crate::error::CoreError;
use crate::models::{WatchedEntry, WatchedSummary, MAX_RATING};
use crate::persisted::PersistedState;
use crate::storage::KeyValueStore;

/// The user's watched movies, persisted on every mutation.
pub struct Watchlist<S> {
    state: PersistedState<Vec<WatchedEntry>, S>,
}

impl<S: KeyValueStore> Watchlist<S> {
    /// Hydrate the list from `store` under `key`.
    pub fn load(store: S, key: &str) -> Result<Self, CoreError> {
        let state = PersistedState::load(store, key, Vec::new())?;
        tracing::debug!(key, entries = state.get().len(), "watchlist loaded");
        Ok(Self { state })
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[WatchedEntry] {
        self.state.get()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries().iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The rating the user gave `id`, if it is on the list.
    pub fn user_rating(&self, id: &str) -> Option<u8> {
        self.get(id).map(|e| e.user_rating)
    }

    /// Append a rated entry.
    ///
    /// Unrated (0) or out-of-range ratings and identifiers already on the
    /// list are rejected without touching state. A failed write leaves the
    /// list as it was.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), CoreError> {
        if entry.user_rating == 0 || entry.user_rating > MAX_RATING {
            return Err(CoreError::InvalidRating(entry.user_rating));
        }
        if self.contains(&entry.id) {
            return Err(CoreError::AlreadyWatched(entry.id));
        }

        tracing::info!(id = %entry.id, title = %entry.title, rating = entry.user_rating, "adding watched movie");
        self.state.update(|list| list.push(entry))
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, CoreError> {
        if !self.contains(id) {
            return Ok(false);
        }
        tracing::info!(id, "removing watched movie");
        self.state.update(|list| list.retain(|e| e.id != id))?;
        Ok(true)
    }

    pub fn summary(&self) -> WatchedSummary {
        let entries = self.entries();
        let imdb: Vec<f64> = entries.iter().filter_map(|e| e.imdb_rating).collect();
        let user: Vec<f64> = entries.iter().map(|e| f64::from(e.user_rating)).collect();
        let runtimes: Vec<f64> = entries
            .iter()
            .map(|e| f64::from(e.runtime_minutes()))
            .collect();

        WatchedSummary {
            count: entries.len(),
            avg_imdb_rating: average(&imdb),
            avg_user_rating: average(&user),
            avg_runtime: average_runtime(&runtimes),
        }
    }

    pub fn store(&self) -> &S {
        self.state.store()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), CoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full").into());
            }
            Ok(())
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
            self.check()?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), CoreError> {
            self.check()?;
            self.inner.remove(key)
        }
    }

    fn entry(id: &str, rating: u8) -> WatchedEntry {
        WatchedEntry {
            id: id.into(),
            title: format!("Movie {id}"),
            year: "2010".into(),
            poster: "N/A".into(),
            runtime: "120 min".into(),
            imdb_rating: Some(8.0),
            user_rating: rating,
            added_at: None,
        }
    }

    fn stored(list: &Watchlist<MemoryStore>) -> Vec<WatchedEntry> {
        let raw = list.store().get("watched").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        serde_json::from_value(json["data"].clone()).unwrap()
    }

    #[test]
    fn test_add_rejects_unrated() {
        let mut list = Watchlist::load(MemoryStore::new(), "watched").unwrap();
        let err = list.add(entry("tt1", 0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRating(0)));
        assert!(list.is_empty());
        assert_eq!(list.store().get("watched").unwrap(), None);
    }

    #[test]
    fn test_add_rejects_out_of_range() {
        let mut list = Watchlist::load(MemoryStore::new(), "watched").unwrap();
        assert!(list.add(entry("tt1", 11)).is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_appends_and_persists() {
        let mut list = Watchlist::load(MemoryStore::new(), "watched").unwrap();
        list.add(entry("tt1", 7)).unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.user_rating("tt1"), Some(7));
        assert_eq!(stored(&list), list.entries());
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut list = Watchlist::load(MemoryStore::new(), "watched").unwrap();
        list.add(entry("tt1", 7)).unwrap();

        let err = list.add(entry("tt1", 3)).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyWatched(ref id) if id == "tt1"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.user_rating("tt1"), Some(7));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut list = Watchlist::load(MemoryStore::new(), "watched").unwrap();
        for id in ["tt1", "tt2", "tt3", "tt4"] {
            list.add(entry(id, 5)).unwrap();
        }

        assert!(list.remove("tt2").unwrap());
        let ids: Vec<&str> = list.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt3", "tt4"]);
        assert_eq!(stored(&list).len(), 3);

        assert!(!list.remove("missing").unwrap());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_summary() {
        let mut list = Watchlist::load(MemoryStore::new(), "watched").unwrap();
        assert_eq!(list.summary(), WatchedSummary::default());

        let mut a = entry("tt1", 8);
        a.runtime = "2h 30m".into();
        let mut b = entry("tt2", 6);
        b.imdb_rating = None;
        list.add(a).unwrap();
        list.add(b).unwrap();

        let summary = list.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.avg_imdb_rating, 8.0);
        assert_eq!(summary.avg_user_rating, 7.0);
        assert_eq!(summary.avg_runtime, 135.0);
    }

    #[test]
    fn test_reload_from_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cinelist.db");

        {
            let mut list = Watchlist::load(SqliteStore::open(&path).unwrap(), "watched").unwrap();
            list.add(entry("tt1", 9)).unwrap();
            list.add(entry("tt2", 4)).unwrap();
        }

        let list = Watchlist::load(SqliteStore::open(&path).unwrap(), "watched").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].id, "tt1");
        assert_eq!(list.user_rating("tt2"), Some(4));
    }

    #[test]
    fn test_imports_browser_list() {
        let store = MemoryStore::new();
        store
            .set(
                "watched",
                r#"[{"imdbID":"tt1375666","Title":"Inception","Year":"2010","Poster":"N/A","runtime":"148 min","imdbRating":8.8,"userRating":10}]"#,
            )
            .unwrap();

        let list = Watchlist::load(store, "watched").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.user_rating("tt1375666"), Some(10));
    }

    #[test]
    fn test_failed_save_rolls_back_add_and_remove() {
        let mut list = Watchlist::load(FlakyStore::default(), "watched").unwrap();

        list.store().fail_writes(true);
        assert!(matches!(list.add(entry("tt1", 7)), Err(CoreError::Io(_))));
        assert!(list.is_empty());
        assert_eq!(list.store().get("watched").unwrap(), None);

        // Once the store recovers the same add goes through.
        list.store().fail_writes(false);
        list.add(entry("tt1", 7)).unwrap();
        assert_eq!(list.user_rating("tt1"), Some(7));

        list.store().fail_writes(true);
        assert!(list.remove("tt1").is_err());
        assert!(list.contains("tt1"));
    }
}
