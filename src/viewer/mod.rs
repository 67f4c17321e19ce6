//! Viewer-facing configuration and the renderer seam.
//!
//! The rendering itself (parallax shading, camera drift) lives outside this
//! crate; what lives here is everything the resolver and settings layer need
//! to talk to it: the display-mode vocabulary, the tunable configuration,
//! and the [`Renderer`] trait they drive.

mod config;
mod renderer;

pub use config::{keys, DisplayMode, ViewerConfig, ViewerSettings};
pub use renderer::Renderer;
