//! Eye detection stage.

use tracing::debug;

use crate::domain::{
    AnalysisError, DetectionLabel, DetectionResult, NormalizedTensor, ProbabilityModel,
};
use crate::inference::{argmax, check_distribution};

/// Runs the detection model and takes its argmax as the verdict.
///
/// No threshold is applied at this stage.
///
/// # Errors
///
/// Propagates model load and inference failures, and returns
/// [`AnalysisError::Inference`] if the model does not produce exactly two
/// finite probabilities.
pub fn detect(
    model: &dyn ProbabilityModel,
    input: &NormalizedTensor,
) -> Result<DetectionResult, AnalysisError> {
    let probs = model.probabilities(input)?;
    let result = decide_detection(model.name(), &probs)?;
    debug!(
        "Detection: {} ({:.3}) from {:?}",
        result.label, result.confidence, probs
    );
    Ok(result)
}

/// Maps a two-class distribution to a detection result.
///
/// # Errors
///
/// Returns [`AnalysisError::Inference`] for a malformed distribution.
pub fn decide_detection(
    model: &'static str,
    probs: &[f32],
) -> Result<DetectionResult, AnalysisError> {
    check_distribution(model, probs, DetectionLabel::ALL.len())?;
    let (index, confidence) =
        argmax(probs).ok_or_else(|| AnalysisError::inference(model, "empty distribution"))?;
    Ok(DetectionResult::new(DetectionLabel::ALL[index], confidence))
}
