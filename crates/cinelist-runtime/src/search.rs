use std::sync::Arc;

use cinelist_api::{MovieCatalog, SearchPage};
use tokio::sync::watch;

use crate::state::{FetchState, StateCell};
use crate::task::TaskHandle;

/// Fetch-on-change movie search.
///
/// Every [`set_query`](MovieSearch::set_query) supersedes the previous
/// request: its task is cancelled and its result, should it still arrive,
/// is discarded.
pub struct MovieSearch<C> {
    catalog: Arc<C>,
    min_query_len: usize,
    query: String,
    state: Arc<StateCell<SearchPage>>,
    task: Option<TaskHandle<()>>,
}

impl<C: MovieCatalog + 'static> MovieSearch<C> {
    pub fn new(catalog: Arc<C>, min_query_len: usize) -> Self {
        Self {
            catalog,
            min_query_len,
            query: String::new(),
            state: Arc::new(StateCell::new(SearchPage::default())),
            task: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> FetchState<SearchPage> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<SearchPage>> {
        self.state.subscribe()
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();

        if let Some(task) = self.task.take() {
            task.cancel();
        }

        // Partial input is not worth a request.
        let Some(query) = searchable(query, self.min_query_len) else {
            self.state.reset(SearchPage::default());
            return;
        };

        let revision = self.state.start(None);
        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let query = query.to_string();

        self.task = Some(TaskHandle::spawn(move |token| async move {
            let result = catalog.search(&query, &token).await;
            match &result {
                Ok(page) => tracing::debug!(query = %query, hits = page.movies.len(), "search finished"),
                Err(e) if e.is_cancelled() => tracing::debug!(query = %query, "search cancelled"),
                Err(e) => tracing::warn!(query = %query, "search failed: {e}"),
            }
            if !state.complete(revision, result) {
                tracing::debug!(query = %query, revision, "dropped stale search result");
            }
        }));
    }

    /// Wait until the current request (if any) has finished.
    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            task.join().await;
        }
    }
}

/// The query to send for `input`: trimmed, and `None` when shorter than
/// `min_query_len` characters.
pub fn searchable(input: &str, min_query_len: usize) -> Option<&str> {
    let query = input.trim();
    (query.chars().count() >= min_query_len).then_some(query)
}
