use std::sync::Arc;

use cinelist_api::{MovieCatalog, MovieDetail};
use tokio::sync::watch;

use crate::state::{FetchState, StateCell};
use crate::task::TaskHandle;

/// Fetch-on-change details for the selected movie.
///
/// No selection means no detail, not loading, and no error.
pub struct MovieDetails<C> {
    catalog: Arc<C>,
    selected: Option<String>,
    state: Arc<StateCell<Option<MovieDetail>>>,
    task: Option<TaskHandle<()>>,
}

impl<C: MovieCatalog + 'static> MovieDetails<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            selected: None,
            state: Arc::new(StateCell::new(None)),
            task: None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> FetchState<Option<MovieDetail>> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Option<MovieDetail>>> {
        self.state.subscribe()
    }

    /// Select `id` (or nothing) and load its details.
    pub fn select(&mut self, id: Option<&str>) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }

        let Some(id) = id.filter(|id| !id.is_empty()) else {
            self.selected = None;
            self.state.reset(None);
            return;
        };
        self.selected = Some(id.to_string());

        // The previous movie's details are dropped right away.
        let revision = self.state.start(Some(None));
        let catalog = Arc::clone(&self.catalog);
        let state = Arc::clone(&self.state);
        let id = id.to_string();

        self.task = Some(TaskHandle::spawn(move |token| async move {
            let result = catalog.details(&id, &token).await.map(Some);
            if let Err(ref e) = result {
                if !e.is_cancelled() {
                    tracing::warn!(id = %id, "loading movie details failed: {e}");
                }
            }
            if !state.complete(revision, result) {
                tracing::debug!(id = %id, revision, "dropped stale movie details");
            }
        }));
    }

    /// Select `id`, or clear the selection if it is already selected.
    pub fn toggle(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.close();
        } else {
            self.select(Some(id));
        }
    }

    pub fn close(&mut self) {
        self.select(None);
    }

    pub async fn settled(&mut self) {
        if let Some(task) = self.task.take() {
            task.join().await;
        }
    }
}
