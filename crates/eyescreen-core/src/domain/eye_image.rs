//! Image types flowing into the screening pipeline.

use image::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// Encoding hint attached to a raw image buffer.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageEncoding {
    /// JPEG / JFIF.
    Jpeg,
    /// Portable Network Graphics.
    Png,
}

impl ImageEncoding {
    /// Guesses the encoding from a file extension (case-insensitive).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    const fn format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

/// Undecoded image bytes as received from an upload or a camera.
#[derive(Debug, Clone)]
pub struct RawImage {
    bytes: Vec<u8>,
    encoding: Option<ImageEncoding>,
}

impl RawImage {
    /// Wraps an encoded buffer. `encoding` is a hint; `None` means sniff the bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>, encoding: Option<ImageEncoding>) -> Self {
        Self { bytes, encoding }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The encoding hint, if any.
    #[must_use]
    pub const fn encoding(&self) -> Option<ImageEncoding> {
        self.encoding
    }

    /// Decodes the buffer into an RGB [`EyeImage`].
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] for an empty buffer and
    /// [`AnalysisError::Decode`] when the bytes are not a valid image.
    pub fn decode(&self) -> Result<EyeImage, AnalysisError> {
        if self.bytes.is_empty() {
            return Err(AnalysisError::InvalidInput("image buffer is empty".into()));
        }

        let decoded = match self.encoding {
            Some(encoding) => image::load_from_memory_with_format(&self.bytes, encoding.format()),
            None => image::load_from_memory(&self.bytes),
        }?;

        Ok(EyeImage::from_dynamic(&decoded))
    }
}

/// Memory order of the three colour channels in an [`EyeImage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Red, green, blue. What the `image` decoders produce.
    #[default]
    Rgb,
    /// Blue, green, red. Typical of OpenCV-style capture buffers.
    Bgr,
}

/// A decoded 8-bit, 3-channel image ready for normalization.
#[derive(Debug, Clone)]
pub struct EyeImage {
    pixels: RgbImage,
    order: ChannelOrder,
}

impl EyeImage {
    /// Wraps an interleaved 3-channel buffer stored in the given channel order.
    #[must_use]
    pub const fn new(pixels: RgbImage, order: ChannelOrder) -> Self {
        Self { pixels, order }
    }

    /// Converts any decoded image (grayscale, RGBA, 16-bit...) to 8-bit RGB.
    #[must_use]
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::new(image.to_rgb8(), ChannelOrder::Rgb)
    }

    /// Builds an image from a blue-green-red interleaved buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] if the buffer length does not
    /// match `width * height * 3`.
    pub fn from_bgr(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AnalysisError> {
        let expected = u64::from(width) * u64::from(height) * 3;
        let actual = data.len();
        let pixels = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            AnalysisError::InvalidInput(format!(
                "BGR buffer has {actual} bytes, expected {expected} for {width}x{height}"
            ))
        })?;
        Ok(Self::new(pixels, ChannelOrder::Bgr))
    }

    /// The raw interleaved pixels, in [`Self::order`].
    #[must_use]
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Channel order of [`Self::pixels`].
    #[must_use]
    pub const fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Image dimensions.
    #[must_use]
    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.pixels.width(), self.pixels.height())
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates new image dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A rectangular region of a decoded image, in pixels.
///
/// Produced by whatever lets the user frame the eye; the pipeline only ever
/// sees the sub-image it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width of the region.
    pub width: u32,
    /// Height of the region.
    pub height: u32,
}

impl CropRegion {
    /// Creates a crop region.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the region is non-empty and lies inside `bounds`.
    #[must_use]
    pub fn fits_within(&self, bounds: ImageDimensions) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.x) + u64::from(self.width) <= u64::from(bounds.width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(bounds.height)
    }
}
