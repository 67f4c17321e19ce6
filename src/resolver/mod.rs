//! Asset resolution orchestration.
//!
//! The resolver owns the notion of "current input image" and "current depth
//! map". It decides, from the competing input sources (URL parameters,
//! uploaded files, gallery picks), which pair is active, when the inference
//! worker must run, and what gets published to the renderer and to the
//! navigable history.

pub mod assets;
pub mod fetch;
pub mod gallery;
pub mod ports;
pub mod query;

mod resolver;

pub use assets::{AssetPair, AssetSource, DepthAsset, FilePayload, ImageAsset, Provenance};
pub use query::{parse_query, StartupParams};
pub use resolver::{AssetResolver, LoadOutcome, LoadRequest, ResolverState};
