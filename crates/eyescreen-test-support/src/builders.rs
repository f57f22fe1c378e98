//! Synthetic image builders for testing.

use std::io::Cursor;

use anyhow::{Context, Result};
use eyescreen_core::domain::{ChannelOrder, EyeImage, ImageEncoding, RawImage, SourceImage};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SKIN: Rgb<u8> = Rgb([196, 140, 118]);
const SCLERA: Rgb<u8> = Rgb([238, 236, 230]);
const IRIS: Rgb<u8> = Rgb([92, 64, 40]);
const PUPIL: Rgb<u8> = Rgb([12, 10, 10]);

/// Builder for creating synthetic test images.
///
/// Pixel content is irrelevant to the scripted models used in tests; these
/// exist to exercise decoding, cropping, orientation and normalization with
/// known dimensions and colours.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// A single-colour RGB image.
    #[must_use]
    pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> EyeImage {
        EyeImage::new(RgbImage::from_pixel(width, height, Rgb(rgb)), ChannelOrder::Rgb)
    }

    /// An all-black image.
    #[must_use]
    pub fn black(width: u32, height: u32) -> EyeImage {
        Self::uniform(width, height, [0, 0, 0])
    }

    /// Reproducible RGB noise.
    #[must_use]
    pub fn noise(width: u32, height: u32, seed: u64) -> EyeImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let img = RgbImage::from_fn(width, height, |_, _| Rgb(rng.random::<[u8; 3]>()));
        EyeImage::new(img, ChannelOrder::Rgb)
    }

    /// Left-to-right grey ramp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> EyeImage {
        let img = RgbImage::from_fn(width, height, |x, _| {
            let v = ((u32::from(u8::MAX) * x) / width.saturating_sub(1).max(1)) as u8;
            Rgb([v, v, v])
        });
        EyeImage::new(img, ChannelOrder::Rgb)
    }

    /// Four solid quadrants: red top-left, green top-right, blue bottom-left,
    /// white bottom-right.
    ///
    /// Useful for checking that crops and rotations pick the right pixels.
    #[must_use]
    pub fn quadrants(width: u32, height: u32) -> EyeImage {
        let (hw, hh) = (width / 2, height / 2);
        let img = RgbImage::from_fn(width, height, |x, y| match (x < hw, y < hh) {
            (true, true) => Rgb([255, 0, 0]),
            (false, true) => Rgb([0, 255, 0]),
            (true, false) => Rgb([0, 0, 255]),
            (false, false) => Rgb([255, 255, 255]),
        });
        EyeImage::new(img, ChannelOrder::Rgb)
    }

    /// A crude eye: sclera ellipse, iris and pupil discs on a skin background.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn eye_like(width: u32, height: u32) -> EyeImage {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let rx = width as f32 * 0.4;
        let ry = height as f32 * 0.25;
        let iris = ry * 0.9;
        let pupil = iris * 0.4;

        let img = RgbImage::from_fn(width, height, |x, y| {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let r = dx.hypot(dy);
            if r < pupil {
                PUPIL
            } else if r < iris {
                IRIS
            } else if (dx / rx).powi(2) + (dy / ry).powi(2) <= 1.0 {
                SCLERA
            } else {
                SKIN
            }
        });
        EyeImage::new(img, ChannelOrder::Rgb)
    }

    /// The same scene stored blue-green-red.
    ///
    /// # Panics
    ///
    /// Panics if `image` is already BGR.
    #[must_use]
    pub fn to_bgr(image: &EyeImage) -> EyeImage {
        assert_eq!(image.order(), ChannelOrder::Rgb, "image is already BGR");
        let mut pixels = image.pixels().clone();
        for px in pixels.pixels_mut() {
            px.0.swap(0, 2);
        }
        EyeImage::new(pixels, ChannelOrder::Bgr)
    }

    /// Encodes an RGB image as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn png(image: &EyeImage) -> Result<Vec<u8>> {
        encode(image, ImageFormat::Png)
    }

    /// Encodes an RGB image as JPEG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn jpeg(image: &EyeImage) -> Result<Vec<u8>> {
        encode(image, ImageFormat::Jpeg)
    }

    /// Encodes as JPEG with an EXIF block carrying `orientation` (1-8).
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn jpeg_with_orientation(image: &EyeImage, orientation: u16) -> Result<Vec<u8>> {
        let jpeg = Self::jpeg(image)?;
        anyhow::ensure!(jpeg.starts_with(&[0xFF, 0xD8]), "encoder produced no SOI marker");

        let app1 = exif_orientation_segment(orientation);
        let mut out = Vec::with_capacity(jpeg.len() + app1.len());
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&app1);
        out.extend_from_slice(&jpeg[2..]);
        Ok(out)
    }

    /// A PNG-encoded [`SourceImage`] with the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn source(path: &str, image: &EyeImage) -> Result<SourceImage> {
        let raw = RawImage::new(Self::png(image)?, Some(ImageEncoding::Png));
        Ok(SourceImage::new(path, raw))
    }
}

fn encode(image: &EyeImage, format: ImageFormat) -> Result<Vec<u8>> {
    anyhow::ensure!(
        image.order() == ChannelOrder::Rgb,
        "only RGB images can be encoded"
    );
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.pixels().clone())
        .write_to(&mut buf, format)
        .with_context(|| format!("Failed to encode {format:?}"))?;
    Ok(buf.into_inner())
}

/// JPEG APP1 segment holding a big-endian TIFF with a single Orientation tag.
fn exif_orientation_segment(orientation: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2A");
    tiff.extend_from_slice(&8u32.to_be_bytes());
    tiff.extend_from_slice(&1u16.to_be_bytes());
    // tag 0x0112, type SHORT, count 1, value left-justified
    tiff.extend_from_slice(&0x0112u16.to_be_bytes());
    tiff.extend_from_slice(&3u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_be_bytes());

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);

    let mut segment = vec![0xFF, 0xE1];
    #[allow(clippy::cast_possible_truncation)]
    let len = (payload.len() + 2) as u16;
    segment.extend_from_slice(&len.to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}
