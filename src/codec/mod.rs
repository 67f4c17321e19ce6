//! Pure pixel/tensor transforms for the depth model.
//!
//! This module is the isolated codec between displayable images and model
//! tensors: [`preprocess`] turns an interleaved RGBA buffer into the planar
//! float tensor the model expects, and [`postprocess`] turns the model's raw
//! depth tensor back into a displayable grayscale image. No I/O, no state.

mod postprocess;
mod preprocess;

pub use postprocess::postprocess;
pub use preprocess::preprocess;
