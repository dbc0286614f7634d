//! Movie catalog client: a cancellable JSON fetch wrapper and an
//! OMDb-compatible implementation of [`traits::MovieCatalog`].

pub mod cancel;
pub mod error;
pub mod fetch;
pub mod omdb;
pub mod traits;

pub use cancel::CancelToken;
pub use error::CatalogError;
pub use fetch::{fetch_json, FetchError};
pub use omdb::OmdbClient;
pub use traits::{MovieCatalog, MovieDetail, MovieSummary, SearchPage};
