//! Scripted in-process catalog for controller tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cinelist_api::{
    CancelToken, CatalogError, FetchError, MovieCatalog, MovieDetail, MovieSummary, SearchPage,
};
use tokio::sync::Notify;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Movies(Vec<MovieSummary>),
    Detail(MovieDetail),
    Upstream(&'static str),
    Status(u16),
}

/// Answers from a fixed script. Keys are queries for `search` and ids for
/// `details`. A gated key blocks until [`FakeCatalog::release`] is called.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    replies: HashMap<String, Reply>,
    gates: HashMap<String, Arc<Notify>>,
    ignore_cancel: bool,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    cancellations: AtomicUsize,
}

impl FakeCatalog {
    pub(crate) fn search_reply(mut self, query: &str, reply: Reply) -> Self {
        self.replies.insert(query.to_string(), reply);
        self
    }

    pub(crate) fn detail(mut self, detail: MovieDetail) -> Self {
        self.replies
            .insert(detail.id.clone(), Reply::Detail(detail));
        self
    }

    pub(crate) fn detail_reply(mut self, id: &str, reply: Reply) -> Self {
        self.replies.insert(id.to_string(), reply);
        self
    }

    pub(crate) fn gate(mut self, key: &str) -> Self {
        self.gates.insert(key.to_string(), Arc::new(Notify::new()));
        self
    }

    /// Simulate a transport that keeps going after being asked to abort.
    pub(crate) fn ignore_cancel(mut self) -> Self {
        self.ignore_cancel = true;
        self
    }

    pub(crate) fn release(&self, key: &str) {
        if let Some(gate) = self.gates.get(key) {
            gate.notify_one();
        }
    }

    pub(crate) fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    async fn wait(&self, key: &str, cancel: &CancelToken) -> Result<(), CatalogError> {
        let Some(gate) = self.gates.get(key) else {
            return Ok(());
        };
        if self.ignore_cancel {
            gate.notified().await;
            return Ok(());
        }
        tokio::select! {
            _ = gate.notified() => Ok(()),
            _ = cancel.cancelled() => {
                self.cancellations.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Cancelled.into())
            }
        }
    }

    fn reply(&self, key: &str) -> Result<Reply, CatalogError> {
        match self.replies.get(key) {
            Some(Reply::Upstream(message)) => Err(CatalogError::Upstream(message.to_string())),
            Some(Reply::Status(status)) => Err(FetchError::Status {
                status: *status,
                reason: reason(*status).into(),
            }
            .into()),
            Some(reply) => Ok(reply.clone()),
            None => Err(CatalogError::Upstream("Movie not found!".into())),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Error",
    }
}

impl MovieCatalog for FakeCatalog {
    async fn search(&self, query: &str, cancel: &CancelToken) -> Result<SearchPage, CatalogError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.wait(query, cancel).await?;
        match self.reply(query)? {
            Reply::Movies(movies) => Ok(SearchPage {
                total_results: movies.len() as u32,
                movies,
            }),
            other => panic!("not a search reply: {other:?}"),
        }
    }

    async fn details(&self, id: &str, cancel: &CancelToken) -> Result<MovieDetail, CatalogError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.wait(id, cancel).await?;
        match self.reply(id)? {
            Reply::Detail(detail) => Ok(detail),
            other => panic!("not a detail reply: {other:?}"),
        }
    }
}

pub(crate) fn summaries(titles: &[&str]) -> Vec<MovieSummary> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| MovieSummary {
            id: format!("tt{:07}", i + 1),
            title: title.to_string(),
            year: "2008".into(),
            poster: "N/A".into(),
        })
        .collect()
}

pub(crate) fn movie_detail(id: &str, title: &str, runtime: &str, rating: &str) -> MovieDetail {
    MovieDetail {
        id: id.into(),
        title: title.into(),
        year: "2010".into(),
        poster: "N/A".into(),
        runtime: runtime.into(),
        plot: "A thief who steals corporate secrets.".into(),
        released: "16 Jul 2010".into(),
        actors: "Leonardo DiCaprio".into(),
        director: "Christopher Nolan".into(),
        genre: "Action, Sci-Fi".into(),
        writer: "Christopher Nolan".into(),
        imdb_rating: rating.into(),
    }
}
