//! Closed label sets of the two classifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Output of the eye detection model.
///
/// Variant order matches the model's output indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionLabel {
    /// An eye is visible in the image.
    EyeDetected,
    /// No eye could be found.
    NoEyeDetected,
}

impl DetectionLabel {
    /// All labels in model output order.
    pub const ALL: [Self; 2] = [Self::EyeDetected, Self::NoEyeDetected];

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::EyeDetected => "Eye Detected",
            Self::NoEyeDetected => "No Eye Detected",
        }
    }
}

impl fmt::Display for DetectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ocular conditions the condition model distinguishes.
///
/// Variant order matches the model's output indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcularCondition {
    /// No visible condition.
    Healthy,
    /// Yellowish conjunctival deposit.
    Pinguecula,
    /// Pterygium, trace to mild.
    #[serde(rename = "pterygium_stage1")]
    PterygiumStage1,
    /// Pterygium, moderate to severe.
    #[serde(rename = "pterygium_stage2")]
    PterygiumStage2,
    /// Conjunctivitis.
    RedEye,
}

impl OcularCondition {
    /// All conditions in model output order.
    pub const ALL: [Self; 5] = [
        Self::Healthy,
        Self::Pinguecula,
        Self::PterygiumStage1,
        Self::PterygiumStage2,
        Self::RedEye,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Pinguecula => "Pinguecula",
            Self::PterygiumStage1 => "Pterygium Stage 1 (Trace-Mild)",
            Self::PterygiumStage2 => "Pterygium Stage 2 (Moderate-Severe)",
            Self::RedEye => "Red Eye (Conjunctivitis)",
        }
    }
}

impl fmt::Display for OcularCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Label emitted by the condition stage: a concrete condition, or the
/// `Uncertain` sentinel when the thresholds are not cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionLabel {
    /// The model committed to a condition.
    Condition(OcularCondition),
    /// Top probability too low, or too close to the runner-up.
    Uncertain,
}

impl ConditionLabel {
    /// Stable snake_case tag used in serialized output.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Condition(OcularCondition::Healthy) => "healthy",
            Self::Condition(OcularCondition::Pinguecula) => "pinguecula",
            Self::Condition(OcularCondition::PterygiumStage1) => "pterygium_stage1",
            Self::Condition(OcularCondition::PterygiumStage2) => "pterygium_stage2",
            Self::Condition(OcularCondition::RedEye) => "red_eye",
            Self::Uncertain => "uncertain",
        }
    }

    /// Parses a tag produced by [`Self::tag`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag == "uncertain" {
            return Some(Self::Uncertain);
        }
        OcularCondition::ALL
            .into_iter()
            .map(Self::Condition)
            .find(|label| label.tag() == tag)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Condition(condition) => condition.display_name(),
            Self::Uncertain => "Uncertain",
        }
    }
}

impl fmt::Display for ConditionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl Serialize for ConditionLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ConditionLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Self::from_tag(&tag)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown condition label '{tag}'")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_display() {
        assert_eq!(DetectionLabel::EyeDetected.to_string(), "Eye Detected");
        assert_eq!(DetectionLabel::NoEyeDetected.to_string(), "No Eye Detected");
    }

    #[test]
    fn test_detection_serializes_snake_case() {
        let json = serde_json::to_string(&DetectionLabel::NoEyeDetected).unwrap();
        assert_eq!(json, "\"no_eye_detected\"");
    }

    #[test]
    fn test_condition_tags_match_serde() {
        for condition in OcularCondition::ALL {
            let via_serde = serde_json::to_string(&condition).unwrap();
            let via_tag = format!("\"{}\"", ConditionLabel::Condition(condition).tag());
            assert_eq!(via_serde, via_tag);
        }
    }

    #[test]
    fn test_condition_label_tag_parsing() {
        assert_eq!(
            ConditionLabel::from_tag("pterygium_stage2"),
            Some(ConditionLabel::Condition(OcularCondition::PterygiumStage2))
        );
        assert_eq!(ConditionLabel::from_tag("uncertain"), Some(ConditionLabel::Uncertain));
        assert_eq!(ConditionLabel::from_tag("glaucoma"), None);
    }

    #[test]
    fn test_uncertain_is_not_a_condition() {
        assert!(!OcularCondition::ALL
            .iter()
            .any(|c| c.display_name() == ConditionLabel::Uncertain.display_name()));
    }

    #[test]
    fn test_condition_label_deserialize_rejects_unknown() {
        let result: Result<ConditionLabel, _> = serde_json::from_str("\"cataract\"");
        assert!(result.is_err());
    }
}
