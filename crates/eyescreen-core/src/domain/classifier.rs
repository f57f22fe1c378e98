//! Model seam between the pipeline and the inference runtime.

use super::{AnalysisError, NormalizedTensor};

/// A pretrained classifier producing a probability distribution.
///
/// Implementations must be deterministic: the same tensor yields the same
/// distribution on every call.
pub trait ProbabilityModel: Send + Sync {
    /// Short name used in logs and errors ("detection", "condition").
    fn name(&self) -> &'static str;

    /// Runs one forward pass and returns the per-class probabilities, in the
    /// model's output order.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelLoad`] if the model cannot be loaded on
    /// first use, or [`AnalysisError::Inference`] if the forward pass fails.
    fn probabilities(&self, input: &NormalizedTensor) -> Result<Vec<f32>, AnalysisError>;
}
