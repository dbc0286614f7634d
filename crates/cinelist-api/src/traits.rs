//! Catalog trait and the service-agnostic result types it returns.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::error::CatalogError;

/// A movie metadata provider.
///
/// Every call takes a [`CancelToken`]; implementations must stop and return
/// a cancelled error once it fires.
pub trait MovieCatalog: Send + Sync {
    /// Search movies by free-text title.
    fn search(
        &self,
        query: &str,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<SearchPage, CatalogError>> + Send;

    /// Fetch extended details for one catalog identifier.
    fn details(
        &self,
        id: &str,
        cancel: &CancelToken,
    ) -> impl Future<Output = Result<MovieDetail, CatalogError>> + Send;
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
}

/// A page of search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub movies: Vec<MovieSummary>,
    pub total_results: u32,
}

/// Extended movie metadata, with placeholder text for anything the catalog
/// did not provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub runtime: String,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
    pub writer: String,
    pub imdb_rating: String,
}

impl MovieDetail {
    /// Catalog rating as a number, if it is one.
    pub fn imdb_score(&self) -> Option<f64> {
        self.imdb_rating
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            year: self.year.clone(),
            poster: self.poster.clone(),
        }
    }
}
