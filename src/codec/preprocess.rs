//! Conversion of decoded pixel buffers into model input tensors.

use crate::core::{RelievoError, Tensor4D};
use image::RgbaImage;

/// Builds the model input tensor from a decoded RGBA pixel buffer.
///
/// The input must be square (width == height == S). The alpha sample is
/// dropped, the remaining samples are scaled from `[0, 255]` to `[0, 1]`,
/// and the per-pixel interleaved layout is reordered to channel-major
/// planar order: all S² red samples first, then all green, then all blue.
/// The resulting tensor is shaped `[1, 3, S, S]`.
///
/// The planar reordering is a hard contract: the model's input is
/// channel-first, and an interleaved buffer would silently feed it wrong
/// channels.
pub fn preprocess(pixels: &RgbaImage) -> Result<Tensor4D, RelievoError> {
    let (width, height) = pixels.dimensions();
    if width != height {
        return Err(RelievoError::invalid_input(format!(
            "model input must be square, got {width}x{height}"
        )));
    }

    let size = width as usize;
    let plane = size * size;
    let mut planar = vec![0.0f32; 3 * plane];

    for (i, pixel) in pixels.pixels().enumerate() {
        planar[i] = pixel[0] as f32 / 255.0;
        planar[plane + i] = pixel[1] as f32 / 255.0;
        planar[2 * plane + i] = pixel[2] as f32 / 255.0;
    }

    Tensor4D::from_shape_vec((1, 3, size, size), planar).map_err(|e| {
        RelievoError::tensor_operation_error(
            "preprocess_tensor_creation",
            &[1, 3, size, size],
            &[3 * plane],
            &format!("failed to create planar input tensor for {size}x{size} image"),
            e,
        )
    })
}
