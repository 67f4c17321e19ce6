//! Relay business logic: nonce lifecycle and upload validation.
//!
//! Kept free of HTTP types so the rules are testable without a server; the
//! axum layer in [`crate::relay::http`] is a thin adapter over this.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::RngCore;
use serde::Serialize;

use crate::relay::config::RelayConfig;
use crate::relay::upstream::Upstream;

/// Content types the relay accepts for forwarding.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/avif",
    "image/gif",
];

/// A file extracted from the upload form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    /// Declared size in bytes. Checked against the ceiling before the
    /// payload is touched.
    pub size: u64,
    pub bytes: Vec<u8>,
}

/// An upload attempt: the nonce the client was issued plus the file, if
/// the form carried one.
#[derive(Debug)]
pub struct UploadRequest {
    pub nonce: String,
    pub file: Option<UploadFile>,
}

/// The JSON envelope every relay endpoint answers with.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RelayResponse {
    pub state: ResponseState,
    /// The payload on success (nonce or hosted URL), the human-readable
    /// reason on error.
    pub data: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseState {
    Success,
    Error,
}

impl RelayResponse {
    pub fn success(data: impl Into<String>) -> Self {
        Self {
            state: ResponseState::Success,
            data: data.into(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            state: ResponseState::Error,
            data: reason.into(),
        }
    }
}

/// Issues per-session single-use nonces and validates uploads before
/// forwarding them to the upstream host.
pub struct RelayService {
    config: RelayConfig,
    upstream: Arc<dyn Upstream>,
    /// Outstanding nonce per session. At most one, replaced on re-issue,
    /// consumed by a matching upload.
    nonces: Mutex<HashMap<String, String>>,
}

impl RelayService {
    pub fn new(config: RelayConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config,
            upstream,
            nonces: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// True when the request's `Origin` header matches the configured one.
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        origin == Some(self.config.allowed_origin.as_str())
    }

    /// Issues a fresh nonce for the session, replacing any outstanding one.
    pub fn issue_nonce(&self, session: &str) -> String {
        let mut raw = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw);
        let nonce = hex::encode(raw);

        self.lock_nonces()
            .insert(session.to_string(), nonce.clone());
        tracing::debug!(session, "issued share nonce");
        nonce
    }

    /// Validates and forwards an upload. Every rejection reason comes back
    /// as an error envelope, never as a transport-level failure.
    pub async fn upload(&self, session: &str, request: UploadRequest) -> RelayResponse {
        if !self.consume_nonce(session, &request.nonce) {
            return RelayResponse::error("Invalid nonce");
        }

        // Presence is checked ahead of size and type: both need a file to
        // look at, and a missing file should say so rather than surface as
        // a bogus type rejection.
        let Some(file) = request.file else {
            return RelayResponse::error("No file uploaded");
        };
        if file.size > self.config.max_upload_bytes {
            return RelayResponse::error("File too large");
        }
        if !ALLOWED_MIME_TYPES.contains(&file.mime.as_str()) {
            return RelayResponse::error("Invalid file type");
        }

        match self.upstream.upload(file).await {
            Ok(url) => RelayResponse::success(url),
            Err(e) => {
                tracing::warn!(error = %e, "upstream upload failed");
                // The client gets whatever diagnostic the upstream error
                // carries (status code, transport failure), not a flat
                // message it cannot act on.
                RelayResponse::error(format!("Upload failed: {e}"))
            }
        }
    }

    /// Consumes the session's nonce if it matches. A mismatch leaves the
    /// stored nonce in place, so a garbled retry with the right nonce can
    /// still succeed.
    fn consume_nonce(&self, session: &str, presented: &str) -> bool {
        if presented.is_empty() {
            return false;
        }
        let mut nonces = self.lock_nonces();
        match nonces.get(session) {
            Some(stored) if stored == presented => {
                nonces.remove(session);
                true
            }
            _ => false,
        }
    }

    fn lock_nonces(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.nonces.lock().unwrap_or_else(|e| e.into_inner())
    }
}
