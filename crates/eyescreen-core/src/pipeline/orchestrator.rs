//! Two-stage screening: detection, gate, condition.

use tracing::{debug, instrument};

use super::{classify_condition, detect, normalize, CONFIDENCE_THRESHOLD};
use crate::domain::{
    AnalysisError, AnalysisOutcome, ConditionAnalysis, DetectionLabel, DetectionResult, EyeImage,
    ProbabilityModel, RawImage,
};
use crate::inference::EyeModels;

/// Returns false only when the detector is confident there is no eye.
///
/// "No Eye Detected" at or below [`CONFIDENCE_THRESHOLD`] still lets the
/// condition model run, as does any "Eye Detected" result.
#[must_use]
pub fn should_analyze_condition(detection: &DetectionResult) -> bool {
    !(detection.label == DetectionLabel::NoEyeDetected
        && detection.confidence > CONFIDENCE_THRESHOLD)
}

/// Runs the screening pipeline against a pair of models.
///
/// Holds only shared references, so it is cheap to create per request and
/// keeps no state between calls.
#[derive(Clone, Copy)]
pub struct Orchestrator<'m> {
    detection: &'m dyn ProbabilityModel,
    condition: &'m dyn ProbabilityModel,
}

impl<'m> Orchestrator<'m> {
    /// Creates an orchestrator over arbitrary models.
    #[must_use]
    pub fn new(detection: &'m dyn ProbabilityModel, condition: &'m dyn ProbabilityModel) -> Self {
        Self {
            detection,
            condition,
        }
    }

    /// Creates an orchestrator over the process-wide model holder.
    #[must_use]
    pub fn from_models(models: &'m EyeModels) -> Self {
        Self::new(models.detection(), models.condition())
    }

    /// Decodes and analyzes an encoded image.
    ///
    /// # Errors
    ///
    /// Returns an input error if the bytes cannot be decoded, before either
    /// model runs. Otherwise see [`Self::analyze_image`].
    pub fn analyze(&self, raw: &RawImage) -> Result<AnalysisOutcome, AnalysisError> {
        let image = raw.decode()?;
        self.analyze_image(&image)
    }

    /// Analyzes an already decoded (and possibly cropped) image.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelLoad`] or [`AnalysisError::Inference`]
    /// if either model fails.
    #[instrument(skip_all, fields(width = image.dimensions().width, height = image.dimensions().height))]
    pub fn analyze_image(&self, image: &EyeImage) -> Result<AnalysisOutcome, AnalysisError> {
        let detection = detect(self.detection, &normalize(image))?;

        let condition = if should_analyze_condition(&detection) {
            // Tensors are never reused between stages.
            let result = classify_condition(self.condition, &normalize(image))?;
            ConditionAnalysis::Analyzed { result }
        } else {
            debug!(
                "Skipping condition analysis: no eye ({:.3})",
                detection.confidence
            );
            ConditionAnalysis::Skipped
        };

        Ok(AnalysisOutcome {
            detection,
            condition,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use image::{Rgb, RgbImage};

    use super::*;
    use crate::domain::{
        ChannelOrder, ConditionLabel, NormalizedTensor, OcularCondition, Verdict,
    };

    struct Fixed {
        name: &'static str,
        probs: Vec<f32>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(name: &'static str, probs: &[f32]) -> Self {
            Self {
                name,
                probs: probs.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ProbabilityModel for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn probabilities(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.probs.clone())
        }
    }

    fn image() -> EyeImage {
        EyeImage::new(RgbImage::from_pixel(40, 30, Rgb([120, 90, 80])), ChannelOrder::Rgb)
    }

    const HEALTHY: [f32; 5] = [0.8, 0.05, 0.05, 0.05, 0.05];

    #[test]
    fn test_gate_predicate() {
        let no_eye = |c| DetectionResult::new(DetectionLabel::NoEyeDetected, c);
        let eye = |c| DetectionResult::new(DetectionLabel::EyeDetected, c);

        assert!(!should_analyze_condition(&no_eye(0.95)));
        assert!(!should_analyze_condition(&no_eye(0.61)));
        assert!(should_analyze_condition(&no_eye(0.60)));
        assert!(should_analyze_condition(&no_eye(0.40)));
        assert!(should_analyze_condition(&eye(0.51)));
        assert!(should_analyze_condition(&eye(0.99)));
    }

    #[test]
    fn test_confident_no_eye_skips_condition() {
        let detection = Fixed::new("detection", &[0.05, 0.95]);
        let condition = Fixed::new("condition", &HEALTHY);
        let outcome = Orchestrator::new(&detection, &condition)
            .analyze_image(&image())
            .unwrap();

        assert_eq!(outcome.detection.label, DetectionLabel::NoEyeDetected);
        assert_eq!(outcome.condition, ConditionAnalysis::Skipped);
        assert_eq!(outcome.verdict(), Verdict::NoEye);
        assert_eq!(condition.calls(), 0);
    }

    #[test]
    fn test_unsure_no_eye_still_runs_condition() {
        // A two-class argmax of "no eye" at 0.40 only happens with raw scores.
        let detection = Fixed::new("detection", &[0.35, 0.40]);
        let condition = Fixed::new("condition", &HEALTHY);
        let outcome = Orchestrator::new(&detection, &condition)
            .analyze_image(&image())
            .unwrap();

        assert_eq!(outcome.detection.label, DetectionLabel::NoEyeDetected);
        assert_eq!(outcome.verdict(), Verdict::Healthy);
        assert_eq!(condition.calls(), 1);
    }

    #[test]
    fn test_eye_detected_runs_condition() {
        let detection = Fixed::new("detection", &[0.9, 0.1]);
        let condition = Fixed::new("condition", &[0.05, 0.05, 0.05, 0.05, 0.8]);
        let outcome = Orchestrator::new(&detection, &condition)
            .analyze_image(&image())
            .unwrap();

        let result = outcome.condition_result().unwrap();
        assert_eq!(result.label, ConditionLabel::Condition(OcularCondition::RedEye));
        assert_eq!(outcome.verdict(), Verdict::Finding(OcularCondition::RedEye));
        assert_eq!(detection.calls(), 1);
    }

    #[test]
    fn test_decode_failure_runs_no_model() {
        let detection = Fixed::new("detection", &[0.9, 0.1]);
        let condition = Fixed::new("condition", &HEALTHY);
        let raw = RawImage::new(b"not an image".to_vec(), None);

        let err = Orchestrator::new(&detection, &condition)
            .analyze(&raw)
            .unwrap_err();

        assert!(err.is_input_error());
        assert_eq!(detection.calls(), 0);
        assert_eq!(condition.calls(), 0);
    }

    #[test]
    fn test_condition_failure_is_not_partial() {
        let detection = Fixed::new("detection", &[0.9, 0.1]);
        let condition = Fixed::new("condition", &[0.5, 0.5]);
        let err = Orchestrator::new(&detection, &condition)
            .analyze_image(&image())
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Inference { .. }));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_stateless_across_calls() {
        let detection = Fixed::new("detection", &[0.9, 0.1]);
        let condition = Fixed::new("condition", &HEALTHY);
        let orchestrator = Orchestrator::new(&detection, &condition);

        let a = orchestrator.analyze_image(&image()).unwrap();
        let b = orchestrator.analyze_image(&image()).unwrap();
        assert_eq!(a, b);
    }
}
