//! Ocular condition stage with the confidence/margin decision rule.

use tracing::debug;

use crate::domain::{
    AnalysisError, ConditionLabel, ConditionResult, NormalizedTensor, OcularCondition,
    ProbabilityModel,
};
use crate::inference::{argmax, check_distribution, top_two};

/// Minimum top-1 probability before a condition label is reported.
pub const CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Minimum gap between the top-1 and top-2 probabilities.
pub const MARGIN_THRESHOLD: f32 = 0.10;

/// Runs the condition model and applies the decision rule.
///
/// # Errors
///
/// Propagates model load and inference failures, and returns
/// [`AnalysisError::Inference`] if the model does not produce exactly five
/// finite probabilities.
pub fn classify_condition(
    model: &dyn ProbabilityModel,
    input: &NormalizedTensor,
) -> Result<ConditionResult, AnalysisError> {
    let probs = model.probabilities(input)?;
    decide_condition(model.name(), &probs)
}

/// Maps a five-class distribution to a condition result.
///
/// The label is `Uncertain` when the top probability is below
/// [`CONFIDENCE_THRESHOLD`] or beats the runner-up by less than
/// [`MARGIN_THRESHOLD`]; otherwise it is the argmax class. Either way the
/// confidence is the raw top probability.
///
/// # Errors
///
/// Returns [`AnalysisError::Inference`] for a malformed distribution.
pub fn decide_condition(
    model: &'static str,
    probs: &[f32],
) -> Result<ConditionResult, AnalysisError> {
    check_distribution(model, probs, OcularCondition::ALL.len())?;

    let (confidence, runner_up) =
        top_two(probs).ok_or_else(|| AnalysisError::inference(model, "empty distribution"))?;
    let margin = confidence - runner_up;
    let (index, _) =
        argmax(probs).ok_or_else(|| AnalysisError::inference(model, "empty distribution"))?;

    let label = if confidence < CONFIDENCE_THRESHOLD || margin < MARGIN_THRESHOLD {
        ConditionLabel::Uncertain
    } else {
        ConditionLabel::Condition(OcularCondition::ALL[index])
    };

    debug!(
        "Condition: {label} (confidence={confidence:.3}, margin={margin:.3}, argmax={})",
        OcularCondition::ALL[index]
    );

    Ok(ConditionResult::new(label, confidence))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decide(probs: &[f32]) -> ConditionResult {
        decide_condition("condition", probs).unwrap()
    }

    #[test]
    fn test_low_confidence_is_uncertain_regardless_of_margin() {
        let r = decide(&[0.55, 0.45, 0.0, 0.0, 0.0]);
        assert_eq!(r.label, ConditionLabel::Uncertain);
        assert!((r.confidence - 0.55).abs() < f32::EPSILON);

        // Large margin does not rescue a low top-1.
        let r = decide(&[0.0, 0.59, 0.1, 0.1, 0.21]);
        assert_eq!(r.label, ConditionLabel::Uncertain);
    }

    #[test]
    fn test_small_margin_is_uncertain_despite_confidence() {
        // Raw scores: top-1 clears the floor, margin is 0.09.
        let r = decide(&[0.65, 0.56, 0.0, 0.0, 0.0]);
        assert_eq!(r.label, ConditionLabel::Uncertain);
        assert!((r.confidence - 0.65).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clear_winner_is_reported() {
        let r = decide(&[0.80, 0.05, 0.05, 0.05, 0.05]);
        assert_eq!(r.label, ConditionLabel::Condition(OcularCondition::Healthy));
        assert!((r.confidence - 0.80).abs() < f32::EPSILON);
    }

    #[test]
    fn test_index_maps_to_condition() {
        let expected = [
            OcularCondition::Healthy,
            OcularCondition::Pinguecula,
            OcularCondition::PterygiumStage1,
            OcularCondition::PterygiumStage2,
            OcularCondition::RedEye,
        ];
        for (i, condition) in expected.into_iter().enumerate() {
            let mut probs = [0.025_f32; 5];
            probs[i] = 0.9;
            assert_eq!(decide(&probs).label, ConditionLabel::Condition(condition));
        }
    }

    #[test]
    fn test_confidence_exactly_at_threshold_passes() {
        let r = decide(&[0.1, CONFIDENCE_THRESHOLD, 0.1, 0.1, 0.1]);
        assert_eq!(r.label, ConditionLabel::Condition(OcularCondition::Pinguecula));
    }

    #[test]
    fn test_uncertain_keeps_top_probability() {
        let r = decide(&[0.3, 0.25, 0.2, 0.15, 0.1]);
        assert_eq!(r.label, ConditionLabel::Uncertain);
        assert!((r.confidence - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_thresholds_are_fixed() {
        assert!((CONFIDENCE_THRESHOLD - 0.60).abs() < f32::EPSILON);
        assert!((MARGIN_THRESHOLD - 0.10).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wrong_width_is_inference_error() {
        let err = decide_condition("condition", &[0.5, 0.5]).unwrap_err();
        assert!(err.to_string().contains("expected 5 probabilities, got 2"));
    }

    #[test]
    fn test_repeatable() {
        let probs = [0.7, 0.1, 0.1, 0.05, 0.05];
        assert_eq!(decide(&probs), decide(&probs));
    }
}
