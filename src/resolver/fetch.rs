//! HTTP-backed asset fetcher.

use crate::core::RelievoError;
use crate::resolver::ports::AssetFetcher;
use async_trait::async_trait;

/// Fetches asset bytes over HTTP with a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RelievoError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RelievoError::fetch_error(url, "request failed", Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelievoError::fetch_error(
                url,
                &format!("upstream returned {status}"),
                None::<crate::core::SimpleError>,
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RelievoError::fetch_error(url, "failed to read body", Some(e)))?;
        Ok(bytes.to_vec())
    }
}
