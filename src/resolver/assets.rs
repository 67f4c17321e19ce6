//! Asset types: where an image or depth map came from and how to display it.
//!
//! Assets are immutable. Every load-triggering action creates fresh assets
//! and replaces the old ones wholesale; nothing is mutated in place.

use std::sync::Arc;

/// A file payload handed to the resolver (upload or drag-and-drop).
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Original file name, used for display URLs and upstream uploads.
    pub name: String,
    /// Raw file bytes.
    pub bytes: Arc<Vec<u8>>,
}

impl FilePayload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes),
        }
    }
}

/// Where an asset's pixels come from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    /// A remote URL, fetched over HTTP.
    Remote(String),
    /// A local file supplied by the user; never surfaces in the URL.
    LocalFile(FilePayload),
    /// Bytes derived in-process (a generated depth map).
    Derived {
        /// Identifier distinguishing derived buffers, unique per generation.
        tag: String,
        /// Encoded image bytes.
        bytes: Arc<Vec<u8>>,
    },
    /// A bundled gallery asset, addressed by its served path.
    Gallery(String),
}

impl AssetSource {
    /// The URL handed to the renderer for display.
    pub fn display_url(&self) -> String {
        match self {
            AssetSource::Remote(url) => url.clone(),
            AssetSource::LocalFile(file) => format!("mem://upload/{}", file.name),
            AssetSource::Derived { tag, .. } => format!("mem://derived/{tag}"),
            AssetSource::Gallery(path) => path.clone(),
        }
    }

    /// True when this source is addressable with an http(s) URL, which is
    /// the condition for appearing in a navigable history entry.
    pub fn is_remote_http(&self) -> bool {
        match self {
            AssetSource::Remote(url) => {
                url.starts_with("http://") || url.starts_with("https://")
            }
            _ => false,
        }
    }
}

/// The active input photograph.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// Where the pixels come from.
    pub source: AssetSource,
    /// Raw encoded bytes, when the source was materialized (needed to
    /// decode for inference). Gallery assets are pre-paired and carry none.
    pub payload: Option<Arc<Vec<u8>>>,
}

impl ImageAsset {
    pub fn display_url(&self) -> String {
        self.source.display_url()
    }
}

/// How a depth asset came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Explicitly supplied by the user; never auto-regenerated.
    UserSupplied,
    /// Produced by the inference worker; invalidated when the paired
    /// image changes.
    Generated,
}

/// The active depth map.
#[derive(Debug, Clone)]
pub struct DepthAsset {
    /// Where the depth pixels come from.
    pub source: AssetSource,
    /// Whether the user supplied it or the worker generated it.
    pub provenance: Provenance,
}

impl DepthAsset {
    pub fn display_url(&self) -> String {
        self.source.display_url()
    }
}

/// The unit published to the renderer. Both fields are always replaced
/// together; the renderer never observes a half-updated pair.
#[derive(Debug, Clone)]
pub struct AssetPair {
    pub image: ImageAsset,
    pub depth: DepthAsset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_http_detection() {
        assert!(AssetSource::Remote("https://example.com/a.jpg".into()).is_remote_http());
        assert!(AssetSource::Remote("http://example.com/a.jpg".into()).is_remote_http());
        assert!(!AssetSource::Remote("ftp://example.com/a.jpg".into()).is_remote_http());
        assert!(!AssetSource::LocalFile(FilePayload::new("a.jpg", vec![])).is_remote_http());
        assert!(!AssetSource::Gallery("assets/gallery/fern.jpg".into()).is_remote_http());
    }

    #[test]
    fn display_urls_distinguish_origins() {
        let remote = AssetSource::Remote("https://x/a.jpg".into());
        assert_eq!(remote.display_url(), "https://x/a.jpg");

        let local = AssetSource::LocalFile(FilePayload::new("photo.png", vec![1]));
        assert_eq!(local.display_url(), "mem://upload/photo.png");

        let derived = AssetSource::Derived {
            tag: "depth-7".into(),
            bytes: Arc::new(vec![]),
        };
        assert_eq!(derived.display_url(), "mem://derived/depth-7");
    }
}
