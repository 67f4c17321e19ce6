//! Utility functions for image decoding and resizing.
//!
//! These helpers sit between raw asset bytes and the codec: a fetched or
//! uploaded payload is decoded here and scaled to the square inference
//! resolution before it is handed to the worker.

use crate::core::RelievoError;
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

/// Decodes an image from an in-memory byte payload.
///
/// Handles any container format supported by the image crate (the formats
/// the relay accepts are a subset of these).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, RelievoError> {
    image::load_from_memory(bytes).map_err(RelievoError::ImageLoad)
}

/// Scales an image to the square inference resolution and converts it to
/// interleaved RGBA, ready for [`crate::codec::preprocess`].
///
/// The aspect ratio is not preserved: the model consumes a fixed S×S input
/// and the depth map is stretched back over the original image by the
/// renderer.
pub fn to_inference_input(image: &DynamicImage, size: u32) -> Result<RgbaImage, RelievoError> {
    if size == 0 {
        return Err(RelievoError::invalid_input(
            "inference resolution must be non-zero".to_string(),
        ));
    }
    Ok(image.resize_exact(size, size, FilterType::Triangle).to_rgba8())
}

/// Encodes an RGBA buffer as PNG bytes.
///
/// Used to materialize a generated depth map so it can travel through the
/// same asset plumbing as a fetched or uploaded one.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RelievoError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(RelievoError::ImageLoad)?;
    Ok(bytes)
}
