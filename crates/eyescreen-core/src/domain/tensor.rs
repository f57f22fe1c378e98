//! Fixed-shape model input.

use super::AnalysisError;

/// Model input width in pixels.
pub const TENSOR_WIDTH: usize = 320;
/// Model input height in pixels.
pub const TENSOR_HEIGHT: usize = 280;
/// Colour channels (RGB).
pub const TENSOR_CHANNELS: usize = 3;
/// `(batch, height, width, channels)`.
pub const TENSOR_SHAPE: [usize; 4] = [1, TENSOR_HEIGHT, TENSOR_WIDTH, TENSOR_CHANNELS];

pub(crate) const TENSOR_LEN: usize = TENSOR_HEIGHT * TENSOR_WIDTH * TENSOR_CHANNELS;

/// Image data in the exact layout both classifiers consume.
///
/// NHWC, batch of one, RGB, `f32` values in the native `0..=255` range.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f32>,
}

impl NormalizedTensor {
    /// Wraps a flat NHWC buffer.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] if `data` does not hold exactly
    /// `1 * 280 * 320 * 3` values.
    pub fn from_vec(data: Vec<f32>) -> Result<Self, AnalysisError> {
        if data.len() != TENSOR_LEN {
            return Err(AnalysisError::InvalidInput(format!(
                "tensor has {} values, expected {TENSOR_LEN}",
                data.len()
            )));
        }
        Ok(Self { data })
    }

    /// Wraps a buffer the caller has already sized to [`TENSOR_SHAPE`].
    pub(crate) fn from_sized(data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), TENSOR_LEN);
        Self { data }
    }

    /// A tensor with every value set to `value`.
    #[must_use]
    pub fn filled(value: f32) -> Self {
        Self {
            data: vec![value; TENSOR_LEN],
        }
    }

    /// Always [`TENSOR_SHAPE`].
    #[must_use]
    pub const fn shape(&self) -> [usize; 4] {
        TENSOR_SHAPE
    }

    /// Flat NHWC values.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// The `[r, g, b]` values at pixel `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<[f32; 3]> {
        if x >= TENSOR_WIDTH || y >= TENSOR_HEIGHT {
            return None;
        }
        let i = (y * TENSOR_WIDTH + x) * TENSOR_CHANNELS;
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}
