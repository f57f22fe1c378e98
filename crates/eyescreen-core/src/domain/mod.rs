//! Core domain types for eye screening.

mod classifier;
mod error;
mod eye_image;
mod label;
mod outcome;
mod report;
mod tensor;

pub use classifier::ProbabilityModel;
pub use error::AnalysisError;
pub use eye_image::{ChannelOrder, CropRegion, EyeImage, ImageDimensions, ImageEncoding, RawImage};
pub use label::{ConditionLabel, DetectionLabel, OcularCondition};
pub use outcome::{
    AnalysisOutcome, ClassificationResult, ConditionAnalysis, ConditionResult, DetectionResult,
    Verdict,
};
pub use report::{AnalysisReport, SourceImage};
pub use tensor::{NormalizedTensor, TENSOR_CHANNELS, TENSOR_HEIGHT, TENSOR_SHAPE, TENSOR_WIDTH};
