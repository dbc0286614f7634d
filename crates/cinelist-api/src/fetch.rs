//! Thin JSON fetch wrapper shared by all catalog calls.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::cancel::CancelToken;

/// Failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Cancellation is not a real failure and should not be shown to users.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Send `request` and parse a successful response body as JSON.
///
/// Non-2xx statuses become [`FetchError::Status`]. When `cancel` fires before
/// the exchange completes, the in-flight request is dropped (which aborts
/// the connection) and [`FetchError::Cancelled`] is returned.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    cancel: Option<&CancelToken>,
) -> Result<T, FetchError> {
    let exchange = async {
        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or_default().to_string();
            tracing::warn!(status = status.as_u16(), %reason, url = %resp.url(), "request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason,
            });
        }
        let body = resp.bytes().await?;
        Ok::<T, FetchError>(serde_json::from_slice(&body)?)
    };

    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("request cancelled before completion");
                Err(FetchError::Cancelled)
            }
            result = exchange => result,
        },
        None => exchange.await,
    }
}
