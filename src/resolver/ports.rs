//! Injected ports decoupling the resolver from its environment.
//!
//! The original surface lived against ambient browser globals (fetch,
//! localStorage, history). Here each collaborator is an explicit interface
//! so the orchestration logic runs and tests without any of them being
//! real.

use crate::core::RelievoError;
use async_trait::async_trait;
use image::RgbaImage;

/// Fetches the raw bytes behind a URL.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, RelievoError>;
}

/// Produces a depth image from a decoded, inference-sized pixel buffer.
///
/// The inference worker implements this; tests substitute stubs.
#[async_trait]
pub trait DepthmapGenerator: Send + Sync {
    async fn generate(&self, pixels: RgbaImage, size: u32) -> Result<RgbaImage, RelievoError>;
}

/// Receives navigable history entries (query strings) for shareable loads.
pub trait HistorySink: Send + Sync {
    fn push(&self, query: String);
}

/// String-keyed persistent storage for viewer settings.
pub trait PersistenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}
