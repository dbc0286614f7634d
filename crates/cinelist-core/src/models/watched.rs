use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculate::parse_runtime;

/// Highest user rating (the star scale runs 1..=10).
pub const MAX_RATING: u8 = 10;

/// A movie the user has watched and rated.
///
/// Field names on disk match the browser app's `localStorage` records so an
/// exported list can be imported as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    /// Free-text runtime as the catalog reported it.
    #[serde(default)]
    pub runtime: String,
    /// Catalog rating; `None` when the catalog had none ("N/A").
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<f64>,
    #[serde(rename = "userRating")]
    pub user_rating: u8,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl WatchedEntry {
    pub fn runtime_minutes(&self) -> u32 {
        parse_runtime(Some(&self.runtime))
    }
}

/// Aggregates shown above the watched list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}
