use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use url::Url;

use super::types::{OmdbDetailResponse, OmdbSearchResponse};
use crate::cancel::CancelToken;
use crate::error::CatalogError;
use crate::fetch::fetch_json;
use crate::traits::{MovieCatalog, MovieDetail, SearchPage};

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

/// Client for the OMDb API (or any server speaking its envelope).
pub struct OmdbClient {
    base_url: Url,
    api_key: Option<String>,
    http: Client,
}

impl OmdbClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key: api_key.filter(|k| !k.is_empty()),
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, params: &[(&str, &str)]) -> RequestBuilder {
        let mut req = self.http.get(self.base_url.clone()).query(params);
        if let Some(ref key) = self.api_key {
            req = req.query(&[("apikey", key.as_str())]);
        }
        req
    }
}

impl MovieCatalog for OmdbClient {
    async fn search(&self, query: &str, cancel: &CancelToken) -> Result<SearchPage, CatalogError> {
        tracing::debug!(query, "searching catalog");
        let resp: OmdbSearchResponse =
            fetch_json(self.request(&[("s", query)]), Some(cancel)).await?;
        resp.into_page()
    }

    async fn details(&self, id: &str, cancel: &CancelToken) -> Result<MovieDetail, CatalogError> {
        tracing::debug!(id, "fetching movie details");
        let resp: OmdbDetailResponse =
            fetch_json(self.request(&[("i", id)]), Some(cancel)).await?;
        resp.into_detail(id)
    }
}
