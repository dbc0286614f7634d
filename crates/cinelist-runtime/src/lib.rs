//! Async glue between the catalog client and the persisted watchlist:
//! fetch-on-change controllers for search and details, plus the
//! [`Runtime`] facade front-ends drive.

pub mod details;
pub mod search;
pub mod state;
pub mod task;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use chrono::Utc;
use cinelist_api::{CatalogError, MovieCatalog, MovieDetail, OmdbClient, SearchPage};
use cinelist_core::config::AppConfig;
use cinelist_core::error::CoreError;
use cinelist_core::models::{WatchedEntry, WatchedSummary};
use cinelist_core::storage::KeyValueStore;
use cinelist_core::watchlist::Watchlist;

pub use details::MovieDetails;
pub use search::{searchable, MovieSearch};
pub use state::FetchState;
pub use task::TaskHandle;

/// Document title when no movie is open.
pub const DEFAULT_TITLE: &str = "Movie Time";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    NotFound(String),

    /// A search or detail request failed; carries the message the
    /// controller published.
    #[error("{0}")]
    Request(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state: the two fetch controllers and the watchlist.
pub struct Runtime<C, S> {
    config: AppConfig,
    search: MovieSearch<C>,
    details: MovieDetails<C>,
    watchlist: Watchlist<S>,
}

impl<C, S> Runtime<C, S>
where
    C: MovieCatalog + 'static,
    S: KeyValueStore,
{
    pub fn new(config: AppConfig, catalog: C, store: S) -> Result<Self, RuntimeError> {
        let catalog = Arc::new(catalog);
        let watchlist = Watchlist::load(store, &config.storage.watched_key)?;
        tracing::info!(
            watched = watchlist.len(),
            key = %config.storage.watched_key,
            "runtime ready"
        );

        Ok(Self {
            search: MovieSearch::new(Arc::clone(&catalog), config.catalog.min_query_len),
            details: MovieDetails::new(catalog),
            watchlist,
            config,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn search(&self) -> &MovieSearch<C> {
        &self.search
    }

    pub fn details(&self) -> &MovieDetails<C> {
        &self.details
    }

    pub fn watchlist(&self) -> &Watchlist<S> {
        &self.watchlist
    }

    pub fn set_query(&mut self, query: &str) {
        self.search.set_query(query);
    }

    /// Open `id`, or close it if it is already open.
    pub fn toggle_movie(&mut self, id: &str) {
        self.details.toggle(id);
    }

    pub fn close_movie(&mut self) {
        self.details.close();
    }

    /// Wait for both controllers to finish whatever they have in flight.
    pub async fn settled(&mut self) {
        self.search.settled().await;
        self.details.settled().await;
    }

    /// Latest search results, or the failure the last search published.
    pub fn search_outcome(&self) -> Result<SearchPage, RuntimeError> {
        let state = self.search.state();
        match state.error {
            Some(message) => Err(RuntimeError::Request(message)),
            None => Ok(state.value),
        }
    }

    /// Open movie details, or the failure loading them published.
    pub fn detail_outcome(&self) -> Result<Option<MovieDetail>, RuntimeError> {
        let state = self.details.state();
        match state.error {
            Some(message) => Err(RuntimeError::Request(message)),
            None => Ok(state.value),
        }
    }

    /// Add the open movie to the watchlist with `rating` and close it.
    pub fn rate_selected(&mut self, rating: u8) -> Result<WatchedEntry, RuntimeError> {
        let detail = self
            .details
            .state()
            .value
            .ok_or_else(|| RuntimeError::NotFound("no movie details loaded".into()))?;

        let entry = watched_entry(&detail, rating);
        self.watchlist.add(entry.clone())?;
        self.details.close();
        Ok(entry)
    }

    pub fn remove_watched(&mut self, id: &str) -> Result<bool, RuntimeError> {
        Ok(self.watchlist.remove(id)?)
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        self.watchlist.entries()
    }

    pub fn summary(&self) -> WatchedSummary {
        self.watchlist.summary()
    }

    /// "Movie | <title>" while details are shown, the default title otherwise.
    pub fn selected_title(&self) -> String {
        match self.details.state().value {
            Some(detail) => format!("Movie | {}", detail.title),
            None => DEFAULT_TITLE.to_string(),
        }
    }
}

/// Build the persisted record for `detail` rated `user_rating`.
pub fn watched_entry(detail: &MovieDetail, user_rating: u8) -> WatchedEntry {
    WatchedEntry {
        id: detail.id.clone(),
        title: detail.title.clone(),
        year: detail.year.clone(),
        poster: detail.poster.clone(),
        runtime: detail.runtime.clone(),
        imdb_rating: detail.imdb_score(),
        user_rating,
        added_at: Some(Utc::now()),
    }
}

/// Build the HTTP catalog client described by `config`.
pub fn omdb_client(config: &AppConfig) -> Result<OmdbClient, RuntimeError> {
    let catalog = &config.catalog;
    if catalog.api_key().is_none() {
        tracing::warn!("no catalog API key configured, requests will likely be rejected");
    }
    OmdbClient::new(&catalog.base_url, catalog.api_key(), catalog.timeout())
        .map_err(|e| RuntimeError::Config(format!("catalog client: {e}")))
}

#[cfg(test)]
mod tests {
    use cinelist_core::storage::MemoryStore;

    use super::*;
    use crate::test_support::{movie_detail, summaries, FakeCatalog, Reply};

    fn runtime(catalog: FakeCatalog) -> Runtime<FakeCatalog, MemoryStore> {
        Runtime::new(AppConfig::default(), catalog, MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_watched_entry_from_detail() {
        let entry = watched_entry(&movie_detail("tt1", "Heat", "170 min", "8.3"), 9);
        assert_eq!(entry.id, "tt1");
        assert_eq!(entry.imdb_rating, Some(8.3));
        assert_eq!(entry.user_rating, 9);
        assert_eq!(entry.runtime_minutes(), 170);
        assert!(entry.added_at.is_some());

        let unrated = watched_entry(&movie_detail("tt2", "Ronin", "N/A", "N/A"), 5);
        assert_eq!(unrated.imdb_rating, None);
    }

    #[tokio::test]
    async fn test_search_open_rate_flow() {
        let mut rt = runtime(
            FakeCatalog::default()
                .search_reply("inception", Reply::Movies(summaries(&["Inception"])))
                .detail(movie_detail("tt0000001", "Inception", "148 min", "8.8")),
        );
        assert_eq!(rt.selected_title(), DEFAULT_TITLE);

        rt.set_query("inception");
        rt.settled().await;
        let hit = rt.search().state().value.movies[0].id.clone();

        rt.toggle_movie(&hit);
        rt.settled().await;
        assert_eq!(rt.selected_title(), "Movie | Inception");

        let entry = rt.rate_selected(8).unwrap();
        assert_eq!(entry.title, "Inception");
        assert!(rt.details().selected().is_none());
        assert_eq!(rt.selected_title(), DEFAULT_TITLE);

        assert_eq!(rt.watched().len(), 1);
        let summary = rt.summary();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.avg_imdb_rating, 8.8);
        assert_eq!(summary.avg_user_rating, 8.0);
        assert_eq!(summary.avg_runtime, 148.0);
    }

    #[tokio::test]
    async fn test_rate_without_detail_fails() {
        let mut rt = runtime(FakeCatalog::default());
        assert!(matches!(rt.rate_selected(7), Err(RuntimeError::NotFound(_))));
        assert!(rt.watched().is_empty());
    }

    #[tokio::test]
    async fn test_rate_twice_is_rejected() {
        let mut rt = runtime(
            FakeCatalog::default().detail(movie_detail("tt1", "Heat", "170 min", "8.3")),
        );

        rt.toggle_movie("tt1");
        rt.settled().await;
        rt.rate_selected(7).unwrap();

        rt.toggle_movie("tt1");
        rt.settled().await;
        let err = rt.rate_selected(9).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Core(CoreError::AlreadyWatched(ref id)) if id == "tt1"
        ));
        assert_eq!(rt.watchlist().user_rating("tt1"), Some(7));
    }

    #[tokio::test]
    async fn test_remove_watched() {
        let mut rt = runtime(
            FakeCatalog::default().detail(movie_detail("tt1", "Heat", "170 min", "8.3")),
        );
        rt.toggle_movie("tt1");
        rt.settled().await;
        rt.rate_selected(6).unwrap();

        assert!(rt.remove_watched("tt1").unwrap());
        assert!(!rt.remove_watched("tt1").unwrap());
        assert_eq!(rt.summary(), WatchedSummary::default());
    }

    #[test]
    fn test_omdb_client_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.catalog.base_url = "not a url".into();
        assert!(matches!(omdb_client(&config), Err(RuntimeError::Config(_))));
    }

    #[tokio::test]
    async fn test_failed_requests_surface_as_request_errors() {
        let mut rt = runtime(
            FakeCatalog::default()
                .search_reply("batman", Reply::Status(500))
                .detail_reply("tt9", Reply::Upstream("Incorrect IMDb ID.")),
        );

        rt.set_query("batman");
        rt.toggle_movie("tt9");
        rt.settled().await;

        let err = rt.search_outcome().unwrap_err();
        assert!(matches!(err, RuntimeError::Request(_)));
        assert_eq!(err.to_string(), "Error: 500 Internal Server Error");

        let err = rt.detail_outcome().unwrap_err();
        assert!(matches!(err, RuntimeError::Request(ref m) if m == "Incorrect IMDb ID."));
    }

    #[tokio::test]
    async fn test_outcomes_before_any_request() {
        let rt = runtime(FakeCatalog::default());
        assert!(rt.search_outcome().unwrap().movies.is_empty());
        assert!(rt.detail_outcome().unwrap().is_none());
    }
}
