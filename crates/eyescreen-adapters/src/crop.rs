//! The crop collaborator: a rectangular sub-image of a decoded photo.

use anyhow::{bail, Context, Result};
use eyescreen_core::domain::{TENSOR_HEIGHT, TENSOR_WIDTH};
use eyescreen_core::{AnalysisError, CropRegion, EyeImage};
use image::imageops;
use tracing::warn;

/// Width-to-height ratio of the model input, 320:280.
#[allow(clippy::cast_precision_loss)]
pub const MODEL_ASPECT: f64 = TENSOR_WIDTH as f64 / TENSOR_HEIGHT as f64;

/// Relative deviation from [`MODEL_ASPECT`] accepted without a warning.
pub const ASPECT_TOLERANCE: f64 = 0.05;

/// Relative difference between the region's aspect ratio and the model's.
#[must_use]
pub fn aspect_deviation(region: &CropRegion) -> f64 {
    if region.height == 0 {
        return f64::INFINITY;
    }
    let aspect = f64::from(region.width) / f64::from(region.height);
    (aspect / MODEL_ASPECT - 1.0).abs()
}

/// Checks that a crop keeps the 320:280 model aspect ratio.
///
/// Normalization stretches every crop to 320x280, so a crop of another shape
/// distorts the eye. Such crops are still analyzed; this logs a warning and
/// returns false.
pub fn check_model_aspect(region: &CropRegion) -> bool {
    let deviation = aspect_deviation(region);
    if deviation <= ASPECT_TOLERANCE {
        return true;
    }
    warn!(
        "Crop {}x{} does not match the 320:280 aspect ratio ({:.0}% off); the eye will be stretched",
        region.width,
        region.height,
        deviation * 100.0
    );
    false
}

/// Cuts `region` out of `image`, keeping its channel order.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidInput`] if the region is empty or extends
/// past the image bounds.
pub fn crop(image: &EyeImage, region: &CropRegion) -> Result<EyeImage, AnalysisError> {
    let bounds = image.dimensions();
    if !region.fits_within(bounds) {
        return Err(AnalysisError::InvalidInput(format!(
            "crop {}x{}+{}+{} is outside the {}x{} image",
            region.width, region.height, region.x, region.y, bounds.width, bounds.height
        )));
    }

    let pixels = imageops::crop_imm(
        image.pixels(),
        region.x,
        region.y,
        region.width,
        region.height,
    )
    .to_image();

    Ok(EyeImage::new(pixels, image.order()))
}

/// Parses `X,Y,W,H` (pixels, whitespace allowed around numbers).
///
/// # Errors
///
/// Returns an error for anything other than four non-negative integers or
/// a zero width or height.
pub fn parse_crop(s: &str) -> Result<CropRegion> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, width, height] = parts.as_slice() else {
        bail!("expected X,Y,WIDTH,HEIGHT, got '{s}'");
    };

    let num = |field: &str, v: &str| -> Result<u32> {
        v.parse()
            .with_context(|| format!("invalid crop {field} '{v}'"))
    };
    let region = CropRegion::new(
        num("x", x)?,
        num("y", y)?,
        num("width", width)?,
        num("height", height)?,
    );

    if region.width == 0 || region.height == 0 {
        bail!("crop width and height must be positive");
    }
    Ok(region)
}
