//! Image → model input tensor.

// Tensor dimensions are small compile-time constants
#![allow(clippy::cast_possible_truncation)]

use image::imageops::{self, FilterType};

use crate::domain::{
    ChannelOrder, EyeImage, NormalizedTensor, TENSOR_CHANNELS, TENSOR_HEIGHT, TENSOR_WIDTH,
};

/// Converts an image into the `(1, 280, 320, 3)` RGB `f32` tensor both
/// classifiers expect.
///
/// Resizes to 320x280 with bilinear (triangle) filtering regardless of the
/// input aspect ratio, swaps BGR input to RGB, and casts to `f32` without any
/// scaling: values stay in `0..=255`.
#[must_use]
pub fn normalize(image: &EyeImage) -> NormalizedTensor {
    let resized = imageops::resize(
        image.pixels(),
        TENSOR_WIDTH as u32,
        TENSOR_HEIGHT as u32,
        FilterType::Triangle,
    );

    let swap = image.order() == ChannelOrder::Bgr;
    let mut data = Vec::with_capacity(TENSOR_WIDTH * TENSOR_HEIGHT * TENSOR_CHANNELS);
    for pixel in resized.pixels() {
        let [a, b, c] = pixel.0;
        let rgb = if swap { [c, b, a] } else { [a, b, c] };
        data.extend(rgb.map(f32::from));
    }

    NormalizedTensor::from_sized(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn uniform(width: u32, height: u32, px: [u8; 3], order: ChannelOrder) -> EyeImage {
        EyeImage::new(RgbImage::from_pixel(width, height, Rgb(px)), order)
    }

    #[test]
    fn test_shape_for_any_input_size() {
        for (w, h) in [(1, 1), (320, 280), (4000, 3000), (50, 900), (641, 17)] {
            let tensor = normalize(&uniform(w, h, [10, 20, 30], ChannelOrder::Rgb));
            assert_eq!(tensor.shape(), [1, 280, 320, 3]);
            assert_eq!(tensor.as_slice().len(), 280 * 320 * 3);
        }
    }

    #[test]
    fn test_values_are_not_scaled() {
        let tensor = normalize(&uniform(64, 48, [255, 128, 0], ChannelOrder::Rgb));
        assert_eq!(tensor.pixel(0, 0), Some([255.0, 128.0, 0.0]));
        assert_eq!(tensor.pixel(319, 279), Some([255.0, 128.0, 0.0]));
    }

    #[test]
    fn test_bgr_input_is_swapped_to_rgb() {
        let tensor = normalize(&uniform(320, 280, [200, 100, 50], ChannelOrder::Bgr));
        assert_eq!(tensor.pixel(10, 10), Some([50.0, 100.0, 200.0]));
    }

    #[test]
    fn test_rgb_and_bgr_of_same_scene_agree() {
        let rgb = normalize(&uniform(90, 70, [1, 2, 3], ChannelOrder::Rgb));
        let bgr = normalize(&uniform(90, 70, [3, 2, 1], ChannelOrder::Bgr));
        assert_eq!(rgb, bgr);
    }

    #[test]
    fn test_row_major_layout() {
        // Left half red, right half blue, already at model size.
        let img = RgbImage::from_fn(320, 280, |x, _| {
            if x < 160 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let tensor = normalize(&EyeImage::new(img, ChannelOrder::Rgb));

        assert_eq!(tensor.pixel(0, 100), Some([255.0, 0.0, 0.0]));
        assert_eq!(tensor.pixel(319, 100), Some([0.0, 0.0, 255.0]));
    }

    #[test]
    fn test_deterministic() {
        let img = uniform(123, 77, [9, 99, 199], ChannelOrder::Rgb);
        assert_eq!(normalize(&img), normalize(&img));
    }
}
