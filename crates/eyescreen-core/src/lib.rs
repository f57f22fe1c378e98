//! eyescreen core - domain types, inference runtime and the screening pipeline
//!
//! An eye photo goes through two classifiers in sequence: a detector that
//! decides whether an eye is present, and, unless it is confident there is
//! none, a five-class ocular condition model whose answer is replaced by
//! "Uncertain" when it is not decisive enough.
//!
//! ```no_run
//! use candle_core::Device;
//! use eyescreen_core::inference::{EyeModels, ModelPaths};
//! use eyescreen_core::{Orchestrator, RawImage};
//!
//! # fn main() -> anyhow::Result<()> {
//! let paths = ModelPaths {
//!     detection: "models/eye_detect.safetensors".into(),
//!     condition: "models/eye_condition.safetensors".into(),
//! };
//! let models = EyeModels::load(&paths, &Device::Cpu)?;
//! let raw = RawImage::new(std::fs::read("eye.jpg")?, None);
//! let outcome = Orchestrator::from_models(&models).analyze(&raw)?;
//! println!("{:?}", outcome.verdict());
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod inference;
pub mod pipeline;
pub mod ports;

pub use domain::{
    AnalysisError, AnalysisOutcome, AnalysisReport, ChannelOrder, ClassificationResult,
    ConditionAnalysis, ConditionLabel, ConditionResult, CropRegion, DetectionLabel,
    DetectionResult, EyeImage, ImageDimensions, ImageEncoding, NormalizedTensor, OcularCondition,
    ProbabilityModel, RawImage, SourceImage, Verdict,
};
pub use pipeline::{Orchestrator, CONFIDENCE_THRESHOLD, MARGIN_THRESHOLD};
pub use ports::{ImageSource, ProgressEvent, ProgressSink, ResultOutput};
