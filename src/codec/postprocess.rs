//! Conversion of raw depth tensors into displayable grayscale images.

use crate::core::{RelievoError, Tensor3D};
use image::{Rgba, RgbaImage};

/// Gray level emitted when the tensor is constant and no range exists.
const FLAT_DEPTH_GRAY: u8 = 128;

/// Converts a raw `[1, H, W]` depth tensor into a grayscale RGBA image.
///
/// The raw values are unranged and possibly signed. One scan finds the
/// global min and max; each value is rescaled to `[0, 255]` with
/// `round((v - min) / (max - min) * 255)` and written identically into the
/// R, G and B channels, with alpha fully opaque.
///
/// A constant tensor has no range to rescale over; rather than dividing by
/// zero, the output is a uniform mid-gray frame.
pub fn postprocess(tensor: &Tensor3D) -> Result<RgbaImage, RelievoError> {
    let shape = tensor.shape();
    if shape[0] != 1 {
        return Err(RelievoError::invalid_input(format!(
            "expected a single-channel depth tensor [1, H, W], got batch {}",
            shape[0]
        )));
    }

    let height = shape[1];
    let width = shape[2];
    if height == 0 || width == 0 {
        return Err(RelievoError::invalid_input(
            "depth tensor has no pixels".to_string(),
        ));
    }

    let mut min_depth = f32::INFINITY;
    let mut max_depth = f32::NEG_INFINITY;
    for &value in tensor.iter() {
        if value < min_depth {
            min_depth = value;
        }
        if value > max_depth {
            max_depth = value;
        }
    }

    let mut image = RgbaImage::new(width as u32, height as u32);
    let range = max_depth - min_depth;

    if range == 0.0 {
        tracing::debug!(value = min_depth, "constant depth tensor, emitting flat frame");
        for pixel in image.pixels_mut() {
            *pixel = Rgba([FLAT_DEPTH_GRAY, FLAT_DEPTH_GRAY, FLAT_DEPTH_GRAY, 255]);
        }
        return Ok(image);
    }

    for (h, row) in tensor.index_axis(ndarray::Axis(0), 0).outer_iter().enumerate() {
        for (w, &value) in row.iter().enumerate() {
            let depth = ((value - min_depth) / range * 255.0).round() as u8;
            image.put_pixel(w as u32, h as u32, Rgba([depth, depth, depth, 255]));
        }
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn rescales_raw_values_to_full_range() {
        let tensor = Array3::from_shape_vec((1, 2, 2), vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let image = postprocess(&tensor).unwrap();

        let expected = [0u8, 85, 170, 255];
        for (i, (_, _, pixel)) in image.enumerate_pixels().enumerate() {
            assert_eq!(pixel[0], expected[i]);
            assert_eq!(pixel[1], expected[i]);
            assert_eq!(pixel[2], expected[i]);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn handles_signed_unranged_values() {
        let tensor = Array3::from_shape_vec((1, 1, 3), vec![-5.0, 0.0, 5.0]).unwrap();
        let image = postprocess(&tensor).unwrap();
        let values: Vec<u8> = image.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![0, 128, 255]);
    }

    #[test]
    fn constant_tensor_emits_flat_frame() {
        let tensor = Array3::from_elem((1, 3, 3), 42.5f32);
        let image = postprocess(&tensor).unwrap();
        for pixel in image.pixels() {
            assert_eq!(pixel.0, [FLAT_DEPTH_GRAY, FLAT_DEPTH_GRAY, FLAT_DEPTH_GRAY, 255]);
        }
    }

    #[test]
    fn alpha_always_opaque() {
        let tensor = Array3::from_shape_vec((1, 2, 1), vec![1.0, 9.0]).unwrap();
        let image = postprocess(&tensor).unwrap();
        assert!(image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn rejects_batched_tensor() {
        let tensor = Array3::from_elem((2, 2, 2), 0.0f32);
        assert!(matches!(
            postprocess(&tensor),
            Err(RelievoError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rejects_empty_tensor() {
        let tensor = Array3::from_shape_vec((1, 0, 0), vec![]).unwrap();
        assert!(postprocess(&tensor).is_err());
    }
}
