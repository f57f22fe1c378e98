//! Classification results and the aggregated analysis outcome.

use serde::{Deserialize, Serialize};

use super::{ConditionLabel, DetectionLabel, OcularCondition};

/// A label with the probability mass the model assigned to its top class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult<L> {
    /// Winning label (or a sentinel, for the condition stage).
    pub label: L,
    /// Top-1 probability, in `[0, 1]`.
    pub confidence: f32,
}

impl<L> ClassificationResult<L> {
    /// Creates a result.
    #[must_use]
    pub const fn new(label: L, confidence: f32) -> Self {
        Self { label, confidence }
    }
}

/// Detection stage output.
pub type DetectionResult = ClassificationResult<DetectionLabel>;

/// Condition stage output.
pub type ConditionResult = ClassificationResult<ConditionLabel>;

/// What happened at the condition stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConditionAnalysis {
    /// The condition model ran.
    Analyzed {
        /// Its result.
        #[serde(flatten)]
        result: ConditionResult,
    },
    /// The detector was confident there is no eye; the condition cannot be analyzed.
    Skipped,
}

impl ConditionAnalysis {
    /// The condition result, if the stage ran.
    #[must_use]
    pub const fn result(&self) -> Option<&ConditionResult> {
        match self {
            Self::Analyzed { result } => Some(result),
            Self::Skipped => None,
        }
    }
}

/// One screening outcome: detection always, condition when the gate allows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Eye detection result.
    pub detection: DetectionResult,
    /// Condition classification, or the skipped marker.
    pub condition: ConditionAnalysis,
}

impl AnalysisOutcome {
    /// The condition result, if the stage ran.
    #[must_use]
    pub const fn condition_result(&self) -> Option<&ConditionResult> {
        self.condition.result()
    }

    /// Collapses the outcome into the category shown to a user.
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        match self.condition {
            ConditionAnalysis::Skipped => Verdict::NoEye,
            ConditionAnalysis::Analyzed { result } => match result.label {
                ConditionLabel::Uncertain => Verdict::Uncertain,
                ConditionLabel::Condition(OcularCondition::Healthy) => Verdict::Healthy,
                ConditionLabel::Condition(condition) => Verdict::Finding(condition),
            },
        }
    }
}

/// User-facing outcome category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "condition", rename_all = "snake_case")]
pub enum Verdict {
    /// No eye; nothing further was analyzed.
    NoEye,
    /// The eye looks healthy.
    Healthy,
    /// A potential condition was found.
    Finding(OcularCondition),
    /// The condition model did not commit to a label.
    Uncertain,
}

impl Verdict {
    /// Returns true if the verdict warrants a user's attention.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        !matches!(self, Self::Healthy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn outcome(detection: DetectionResult, condition: ConditionAnalysis) -> AnalysisOutcome {
        AnalysisOutcome {
            detection,
            condition,
        }
    }

    #[test]
    fn test_verdict_skipped_is_no_eye() {
        let o = outcome(
            DetectionResult::new(DetectionLabel::NoEyeDetected, 0.95),
            ConditionAnalysis::Skipped,
        );
        assert_eq!(o.verdict(), Verdict::NoEye);
        assert!(o.condition_result().is_none());
    }

    #[test]
    fn test_verdict_follows_condition_label() {
        let detection = DetectionResult::new(DetectionLabel::EyeDetected, 0.9);
        let cases = [
            (ConditionLabel::Uncertain, Verdict::Uncertain),
            (
                ConditionLabel::Condition(OcularCondition::Healthy),
                Verdict::Healthy,
            ),
            (
                ConditionLabel::Condition(OcularCondition::RedEye),
                Verdict::Finding(OcularCondition::RedEye),
            ),
        ];

        for (label, expected) in cases {
            let o = outcome(
                detection,
                ConditionAnalysis::Analyzed {
                    result: ConditionResult::new(label, 0.7),
                },
            );
            assert_eq!(o.verdict(), expected);
        }
    }

    #[test]
    fn test_only_healthy_skips_attention() {
        assert!(!Verdict::Healthy.needs_attention());
        assert!(Verdict::NoEye.needs_attention());
        assert!(Verdict::Uncertain.needs_attention());
        assert!(Verdict::Finding(OcularCondition::Pinguecula).needs_attention());
    }

    #[test]
    fn test_outcome_json_shape() {
        let o = outcome(
            DetectionResult::new(DetectionLabel::EyeDetected, 0.5),
            ConditionAnalysis::Analyzed {
                result: ConditionResult::new(
                    ConditionLabel::Condition(OcularCondition::PterygiumStage1),
                    0.75,
                ),
            },
        );
        let value = serde_json::to_value(o).unwrap();

        assert_eq!(value["detection"]["label"], "eye_detected");
        assert_eq!(value["detection"]["confidence"], 0.5);
        assert_eq!(value["condition"]["status"], "analyzed");
        assert_eq!(value["condition"]["label"], "pterygium_stage1");
        assert_eq!(value["condition"]["confidence"], 0.75);
    }

    #[test]
    fn test_skipped_json_shape() {
        let value = serde_json::to_value(ConditionAnalysis::Skipped).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "skipped" }));
    }

    #[test]
    fn test_verdict_json_shape() {
        let value = serde_json::to_value(Verdict::Finding(OcularCondition::Pinguecula)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "kind": "finding", "condition": "pinguecula" })
        );
        let value = serde_json::to_value(Verdict::NoEye).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "no_eye" }));
    }
}
