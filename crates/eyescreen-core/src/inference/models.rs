//! The pair of screening models, held for the life of the process.

use std::path::PathBuf;

use candle_core::Device;
use tracing::debug;

use super::{ConvClassifier, LazyModel};
use crate::domain::{AnalysisError, NormalizedTensor, ProbabilityModel};

/// Name of the eye detection model in logs and errors.
pub const DETECTION_MODEL: &str = "detection";
/// Name of the condition model in logs and errors.
pub const CONDITION_MODEL: &str = "condition";

/// Locations of the two weight files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    /// Eye detection weights.
    pub detection: PathBuf,
    /// Condition classification weights.
    pub condition: PathBuf,
}

/// Holder for the detection and condition models.
///
/// Construct once per process and hand out references; each model is read
/// from disk at most once and never reloaded. Inference only borrows the
/// networks immutably, so one instance can serve concurrent requests.
pub struct EyeModels {
    detection: LazyModel<ConvClassifier>,
    condition: LazyModel<ConvClassifier>,
}

impl EyeModels {
    /// Creates the holder without touching the filesystem.
    ///
    /// Models load on first use; call [`Self::warm_up`] to load them eagerly.
    #[must_use]
    pub fn new(paths: &ModelPaths, device: &Device) -> Self {
        Self {
            detection: LazyModel::new(
                DETECTION_MODEL,
                &paths.detection,
                device.clone(),
                ConvClassifier::detection,
            ),
            condition: LazyModel::new(
                CONDITION_MODEL,
                &paths.condition,
                device.clone(),
                ConvClassifier::condition,
            ),
        }
    }

    /// Creates the holder and loads both models immediately.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelLoad`] for the first model that fails.
    pub fn load(paths: &ModelPaths, device: &Device) -> Result<Self, AnalysisError> {
        let models = Self::new(paths, device);
        models.warm_up()?;
        Ok(models)
    }

    /// Loads any model that is not loaded yet.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelLoad`] naming the failing artifact.
    pub fn warm_up(&self) -> Result<(), AnalysisError> {
        self.detection.get()?;
        self.condition.get()?;
        debug!("Both screening models loaded");
        Ok(())
    }

    /// Returns true once both models are in memory.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.detection.is_loaded() && self.condition.is_loaded()
    }

    /// The eye detection model.
    #[must_use]
    pub fn detection(&self) -> &dyn ProbabilityModel {
        &self.detection
    }

    /// The condition model.
    #[must_use]
    pub fn condition(&self) -> &dyn ProbabilityModel {
        &self.condition
    }
}

impl ProbabilityModel for LazyModel<ConvClassifier> {
    fn name(&self) -> &'static str {
        LazyModel::name(self)
    }

    fn probabilities(&self, input: &NormalizedTensor) -> Result<Vec<f32>, AnalysisError> {
        self.get()?
            .classify(input)
            .map_err(|e| AnalysisError::inference(LazyModel::name(self), format!("{e:#}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn missing_paths() -> ModelPaths {
        ModelPaths {
            detection: PathBuf::from("/nonexistent/eye_detect.safetensors"),
            condition: PathBuf::from("/nonexistent/eye_condition.safetensors"),
        }
    }

    #[test]
    fn test_new_is_lazy() {
        let models = EyeModels::new(&missing_paths(), &Device::Cpu);
        assert!(!models.is_loaded());
        assert_eq!(models.detection().name(), "detection");
        assert_eq!(models.condition().name(), "condition");
    }

    #[test]
    fn test_load_fails_on_detection_first() {
        let Err(err) = EyeModels::load(&missing_paths(), &Device::Cpu) else {
            panic!("loading missing models should fail");
        };
        match err {
            AnalysisError::ModelLoad { model, path, .. } => {
                assert_eq!(model, "detection");
                assert!(path.ends_with("eye_detect.safetensors"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_probabilities_surface_load_error() {
        let models = EyeModels::new(&missing_paths(), &Device::Cpu);
        let err = models
            .condition()
            .probabilities(&NormalizedTensor::filled(0.0))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ModelLoad { model: "condition", .. }));
    }
}
