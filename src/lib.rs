//! # Relievo
//!
//! Turns a single photograph into an interactively viewable pseudo-3D image
//! by estimating a depth map with a monocular depth model and feeding both
//! to a parallax renderer.
//!
//! ## Components
//!
//! - **Inference worker**: the ONNX depth model behind an isolated,
//!   message-driven worker thread
//! - **Codec**: pixel buffer to model tensor and depth tensor to grayscale
//!   depth image conversions
//! - **Resolver**: the orchestration state machine deciding which
//!   image/depth pair is active and when inference runs
//! - **Relay**: the upload relay service that shares local images through
//!   an external file host
//!
//! ## Modules
//!
//! * [`core`] - Errors, tensor aliases, and ONNX Runtime session management
//! * [`codec`] - Tensor conversions on either side of the model
//! * [`worker`] - The isolated inference worker thread
//! * [`resolver`] - Asset resolution orchestration
//! * [`viewer`] - Display configuration and the renderer seam
//! * [`relay`] - The upload relay HTTP service
//! * [`utils`] - Image decode/resize helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relievo::worker::{spawn_worker, InferJob, RuntimeConfig};
//! use relievo::utils::image::{decode_image, to_inference_input};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), relievo::core::RelievoError> {
//! let worker = spawn_worker();
//! worker.init(RuntimeConfig::default())?;
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let pixels = to_inference_input(&decode_image(&bytes)?, 518)?;
//! let depth = worker
//!     .infer(InferJob {
//!         pixels,
//!         size: 518,
//!         model: "models/depth_anything_v2_vits.onnx".into(),
//!     })
//!     .await?;
//! depth.save("depthmap.png").map_err(relievo::core::RelievoError::ImageLoad)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod core;
pub mod relay;
pub mod resolver;
pub mod utils;
pub mod viewer;
pub mod worker;
