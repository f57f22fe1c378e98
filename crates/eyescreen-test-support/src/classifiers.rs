//! Stand-in models with scripted outputs.

use std::sync::atomic::{AtomicUsize, Ordering};

use eyescreen_core::domain::{AnalysisError, NormalizedTensor, ProbabilityModel};
use eyescreen_core::inference::{CONDITION_MODEL, DETECTION_MODEL};

/// A model that returns the same distribution for every input.
///
/// Counts its invocations so tests can assert which stages ran.
pub struct FixedClassifier {
    name: &'static str,
    probabilities: Vec<f32>,
    calls: AtomicUsize,
}

impl FixedClassifier {
    /// Creates a classifier with an arbitrary name.
    #[must_use]
    pub fn new(name: &'static str, probabilities: &[f32]) -> Self {
        Self {
            name,
            probabilities: probabilities.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    /// A detection model (`[eye, no_eye]`).
    #[must_use]
    pub fn detection(probabilities: &[f32]) -> Self {
        Self::new(DETECTION_MODEL, probabilities)
    }

    /// A condition model (five classes).
    #[must_use]
    pub fn condition(probabilities: &[f32]) -> Self {
        Self::new(CONDITION_MODEL, probabilities)
    }

    /// Number of forward passes so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbabilityModel for FixedClassifier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn probabilities(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probabilities.clone())
    }
}

/// A model whose forward pass always fails.
pub struct FailingClassifier {
    name: &'static str,
}

impl FailingClassifier {
    /// Creates a failing model with the given name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl ProbabilityModel for FailingClassifier {
    fn name(&self) -> &'static str {
        self.name
    }

    fn probabilities(&self, _input: &NormalizedTensor) -> Result<Vec<f32>, AnalysisError> {
        Err(AnalysisError::inference(self.name, "scripted failure"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_classifier_counts_calls() {
        let model = FixedClassifier::detection(&[0.3, 0.7]);
        let input = NormalizedTensor::filled(0.0);

        assert_eq!(model.name(), "detection");
        assert_eq!(model.calls(), 0);
        assert_eq!(model.probabilities(&input).unwrap(), vec![0.3, 0.7]);
        model.probabilities(&input).unwrap();
        assert_eq!(model.calls(), 2);
    }

    #[test]
    fn test_failing_classifier() {
        let model = FailingClassifier::new("condition");
        let err = model
            .probabilities(&NormalizedTensor::filled(0.0))
            .unwrap_err();
        assert!(!err.is_input_error());
        assert!(err.to_string().contains("condition inference failed"));
    }
}
