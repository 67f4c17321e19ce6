use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::core::{RelievoError, SimpleError};
use crate::relay::service::UploadFile;

/// The external file host the relay forwards accepted uploads to.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Uploads the file and returns its hosted URL.
    async fn upload(&self, file: UploadFile) -> Result<String, RelievoError>;
}

/// Forwards uploads to the file host's multipart endpoint.
pub struct HttpUpstream {
    client: reqwest::Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn upload(&self, file: UploadFile) -> Result<String, RelievoError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| {
                RelievoError::fetch_error(&self.url, "invalid upload content type", Some(e))
            })?;
        let form = Form::new()
            .text("reqtype", "fileupload")
            .part("fileToUpload", part);

        tracing::debug!(url = %self.url, file = %file.name, "forwarding upload upstream");
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelievoError::fetch_error(&self.url, "upstream request failed", Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelievoError::fetch_error(
                &self.url,
                &format!("upstream returned {status}"),
                None::<SimpleError>,
            ));
        }

        // The host answers with the bare hosted URL as the body.
        let hosted = response
            .text()
            .await
            .map_err(|e| RelievoError::fetch_error(&self.url, "unreadable upstream body", Some(e)))?;
        Ok(hosted.trim().to_string())
    }
}
