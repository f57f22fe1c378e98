//! EXIF orientation handling.
//!
//! Phone cameras store pixels in sensor order and record the intended
//! rotation in EXIF. Crop coordinates refer to the upright image, so the
//! rotation is applied right after decoding.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use eyescreen_core::{AnalysisError, EyeImage, RawImage};
use image::imageops;
use tracing::debug;

/// Reads the EXIF orientation (1-8) from an encoded image, if present.
#[must_use]
pub fn read_orientation(bytes: &[u8]) -> Option<u32> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Rotates/mirrors an image so that orientation 1 ("top-left") holds.
///
/// Unknown values leave the image untouched.
#[must_use]
pub fn apply_orientation(image: EyeImage, orientation: u32) -> EyeImage {
    let order = image.order();
    let px = image.pixels();
    let pixels = match orientation {
        2 => imageops::flip_horizontal(px),
        3 => imageops::rotate180(px),
        4 => imageops::flip_vertical(px),
        5 => imageops::flip_horizontal(&imageops::rotate90(px)),
        6 => imageops::rotate90(px),
        7 => imageops::flip_horizontal(&imageops::rotate270(px)),
        8 => imageops::rotate270(px),
        _ => return image,
    };
    EyeImage::new(pixels, order)
}

/// Decodes an image and applies its EXIF orientation.
///
/// # Errors
///
/// Returns an input error if the bytes cannot be decoded.
pub fn decode_oriented(raw: &RawImage) -> Result<EyeImage, AnalysisError> {
    let image = raw.decode()?;
    match read_orientation(raw.bytes()) {
        Some(o) if o != 1 => {
            debug!("Applying EXIF orientation {o}");
            Ok(apply_orientation(image, o))
        }
        _ => Ok(image),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eyescreen_core::ChannelOrder;
    use image::{Rgb, RgbImage};

    /// 3x2 image with a unique red value per pixel: r = 10 * (y * 3 + x).
    fn numbered() -> EyeImage {
        #[allow(clippy::cast_possible_truncation)]
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([(10 * (y * 3 + x)) as u8, 0, 0]));
        EyeImage::new(img, ChannelOrder::Rgb)
    }

    fn red(img: &EyeImage, x: u32, y: u32) -> u8 {
        img.pixels().get_pixel(x, y).0[0]
    }

    #[test]
    fn test_identity_and_unknown() {
        for o in [1, 0, 9] {
            let out = apply_orientation(numbered(), o);
            assert_eq!(out.pixels(), numbered().pixels());
        }
    }

    #[test]
    fn test_rotations_swap_dimensions() {
        for o in [5, 6, 7, 8] {
            let out = apply_orientation(numbered(), o);
            assert_eq!(out.dimensions().width, 2, "orientation {o}");
            assert_eq!(out.dimensions().height, 3, "orientation {o}");
        }
        for o in [2, 3, 4] {
            assert_eq!(apply_orientation(numbered(), o).dimensions().width, 3);
        }
    }

    #[test]
    fn test_orientation_pixel_mapping() {
        // Top-left of the upright image for each orientation.
        let expected = [(2, 20), (3, 50), (4, 30), (5, 0), (6, 30), (7, 50), (8, 20)];
        for (o, value) in expected {
            assert_eq!(red(&apply_orientation(numbered(), o), 0, 0), value, "orientation {o}");
        }
    }

    #[test]
    fn test_read_orientation_without_exif() {
        assert_eq!(read_orientation(b"not an image"), None);
        assert_eq!(read_orientation(&[]), None);
    }
}
