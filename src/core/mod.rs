//! Core types for the depth-viewer pipeline: errors, tensor aliases, and
//! ONNX Runtime session management.

pub mod errors;
pub mod inference;

pub use errors::{ProcessingStage, RelievoError, SimpleError};
pub use inference::{load_session, DepthSession};

/// A 3D tensor of f32 values, shaped `[batch, height, width]`.
pub type Tensor3D = ndarray::Array3<f32>;

/// A 4D tensor of f32 values, shaped `[batch, channels, height, width]`.
pub type Tensor4D = ndarray::Array4<f32>;
