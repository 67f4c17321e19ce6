//! Message types crossing the worker boundary.

use crate::core::RelievoError;
use image::RgbaImage;
use std::path::PathBuf;
use tokio::sync::oneshot;

/// Runtime configuration delivered by the init message.
///
/// The native analog of pointing the browser worker at its wasm runtime:
/// where the ONNX Runtime library lives. `None` uses the linked runtime.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Optional path to the ONNX Runtime dynamic library.
    pub ort_dylib: Option<PathBuf>,
}

/// One inference request: a decoded pixel buffer, the square inference
/// resolution it was prepared at, and the model to run it through.
#[derive(Debug)]
pub struct InferJob {
    /// Decoded RGBA pixels, expected to be `size` x `size`.
    pub pixels: RgbaImage,
    /// Square inference resolution.
    pub size: u32,
    /// Path of the ONNX depth model.
    pub model: PathBuf,
}

/// Requests understood by the worker thread.
pub(super) enum Request {
    /// Sets the runtime configuration. A second init overwrites the first.
    /// No reply is sent; queue order guarantees it lands before later jobs.
    Init(RuntimeConfig),
    /// Runs one inference and replies with the depth image or an error.
    Infer(InferJob, oneshot::Sender<Result<RgbaImage, RelievoError>>),
}
