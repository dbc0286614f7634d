use serde::Deserialize;

use crate::error::CatalogError;
use crate::traits::{MovieDetail, MovieSummary, SearchPage};

// ── Search responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSearchResponse {
    pub response: String,
    #[serde(default)]
    pub search: Option<Vec<OmdbSearchItem>>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<TotalResults>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSearchItem {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: String,
}

/// OMDb sends `totalResults` as a string; some mirrors send a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TotalResults {
    Number(u32),
    Text(String),
}

impl TotalResults {
    fn value(&self) -> u32 {
        match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(0),
        }
    }
}

// ── Detail responses ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbDetailResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub poster: Option<String>,
    pub runtime: Option<String>,
    pub plot: Option<String>,
    pub released: Option<String>,
    pub actors: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub writer: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
}

fn is_true(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

// ── Conversions to shared trait types ───────────────────────────

impl OmdbSearchResponse {
    pub fn into_page(self) -> Result<SearchPage, CatalogError> {
        if let Some(items) = self.search {
            let total_results = self
                .total_results
                .map(|t| t.value())
                .unwrap_or(items.len() as u32);
            return Ok(SearchPage {
                movies: items.into_iter().map(OmdbSearchItem::into_summary).collect(),
                total_results,
            });
        }
        if is_true(&self.response) {
            return Ok(SearchPage::default());
        }
        Err(CatalogError::Upstream(
            self.error.unwrap_or_else(|| "Unknown catalog error".into()),
        ))
    }
}

impl OmdbSearchItem {
    pub fn into_summary(self) -> MovieSummary {
        MovieSummary {
            id: self.imdb_id,
            title: self.title,
            year: self.year,
            poster: self.poster,
        }
    }
}

impl OmdbDetailResponse {
    /// Convert into a [`MovieDetail`], filling gaps with display placeholders.
    ///
    /// `requested_id` is used when the payload omits its own identifier.
    pub fn into_detail(self, requested_id: &str) -> Result<MovieDetail, CatalogError> {
        if self.response.as_deref().is_some_and(|r| !is_true(r)) {
            return Err(CatalogError::Upstream(
                self.error.unwrap_or_else(|| "Movie not found!".into()),
            ));
        }
        Ok(MovieDetail {
            id: self.imdb_id.unwrap_or_else(|| requested_id.to_string()),
            title: self.title.unwrap_or_else(|| "Unknown Title".into()),
            year: self.year.unwrap_or_else(|| "N/A".into()),
            poster: self.poster.unwrap_or_default(),
            runtime: self.runtime.unwrap_or_else(|| "N/A".into()),
            plot: self
                .plot
                .unwrap_or_else(|| "No description available.".into()),
            released: self.released.unwrap_or_else(|| "N/A".into()),
            actors: self.actors.unwrap_or_else(|| "Unknown".into()),
            director: self.director.unwrap_or_else(|| "Unknown".into()),
            genre: self.genre.unwrap_or_else(|| "Unknown".into()),
            writer: self.writer.unwrap_or_else(|| "Unknown".into()),
            imdb_rating: self.imdb_rating.unwrap_or_else(|| "N/A".into()),
        })
    }
}
