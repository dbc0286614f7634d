use thiserror::Error;

use crate::fetch::FetchError;

/// Errors from a movie catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The catalog answered with a well-formed "no result" envelope.
    /// Displays the server's message verbatim.
    #[error("{0}")]
    Upstream(String),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Fetch(e) if e.is_cancelled())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        Self::Fetch(FetchError::Transport(e))
    }
}
