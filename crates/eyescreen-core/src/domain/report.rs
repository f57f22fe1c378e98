//! Per-image report types.

use serde::{Deserialize, Serialize};

use super::{AnalysisOutcome, CropRegion, ImageDimensions, RawImage, Verdict};

/// Complete screening report for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Path to the analyzed image.
    pub path: String,
    /// Timestamp of analysis (ISO 8601).
    pub timestamp: String,
    /// Dimensions of the decoded image, before cropping.
    pub dimensions: ImageDimensions,
    /// Region that was analyzed, if the image was cropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRegion>,
    /// User-facing category.
    pub verdict: Verdict,
    /// Raw classifier results.
    pub outcome: AnalysisOutcome,
}

/// An encoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Path or other identifier of the image.
    pub path: String,
    /// Encoded bytes.
    pub raw: RawImage,
}

impl SourceImage {
    /// Creates a new source image.
    #[must_use]
    pub fn new(path: impl Into<String>, raw: RawImage) -> Self {
        Self {
            path: path.into(),
            raw,
        }
    }
}
