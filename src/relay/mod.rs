//! Upload relay service.
//!
//! A small HTTP service that lets the viewer share a local image: the
//! client asks for a single-use nonce, then posts the file back with that
//! nonce, and the relay forwards it to the external file host and returns
//! the hosted URL. The relay exists so the host's API credentials and CORS
//! posture never reach the client.

pub mod config;
pub mod http;
pub mod service;
pub mod upstream;

pub use config::RelayConfig;
pub use service::{RelayResponse, RelayService, UploadFile, UploadRequest};
pub use upstream::{HttpUpstream, Upstream};
