//! Safetensors weight files for the classifier network.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use eyescreen_core::inference::{ConvClassifier, ModelPaths};
use safetensors::tensor::TensorView;
use safetensors::Dtype;

/// Head bias that puts ~0.95 of the probability mass on one class.
pub const FAVOURED_LOGIT: f32 = 3.0;

/// Writes weights for a [`ConvClassifier`] whose output ignores the input.
///
/// Every convolution and head weight is zero, so the logits equal the head
/// bias and the network always returns `softmax(logits)`. The number of
/// classes is `logits.len()`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_classifier_weights(path: &Path, logits: &[f32]) -> Result<()> {
    let shapes = ConvClassifier::weight_shapes(logits.len());

    let buffers: Vec<(String, Vec<usize>, Vec<f32>)> = shapes
        .into_iter()
        .map(|(name, shape)| {
            let data = if name == "head.bias" {
                logits.to_vec()
            } else {
                vec![0.0; shape.iter().product()]
            };
            (name, shape, data)
        })
        .collect();

    let mut views = HashMap::new();
    for (name, shape, data) in &buffers {
        let view = TensorView::new(Dtype::F32, shape.clone(), bytemuck::cast_slice(data))
            .with_context(|| format!("Invalid tensor {name}"))?;
        views.insert(name.clone(), view);
    }

    safetensors::serialize_to_file(&views, &None, path)
        .with_context(|| format!("Failed to write weights to {}", path.display()))
}

/// Writes a detection and a condition weight file into `dir` using the
/// default artifact names. `dir` is created if missing.
///
/// # Errors
///
/// Returns an error if `dir` cannot be created or either file cannot be
/// written.
pub fn write_model_pair(
    dir: &Path,
    detection_logits: &[f32; 2],
    condition_logits: &[f32; 5],
) -> Result<ModelPaths> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let paths = ModelPaths {
        detection: dir.join("eye_detect.safetensors"),
        condition: dir.join("eye_condition.safetensors"),
    };
    write_classifier_weights(&paths.detection, detection_logits)?;
    write_classifier_weights(&paths.condition, condition_logits)?;
    Ok(paths)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use candle_core::Device;
    use eyescreen_core::inference::read_tensors;

    #[test]
    fn test_written_file_has_every_tensor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.safetensors");
        write_classifier_weights(&path, &[0.0, FAVOURED_LOGIT]).unwrap();

        let tensors = read_tensors(&path, &Device::Cpu).unwrap();
        assert_eq!(tensors.len(), 8);
        assert_eq!(
            tensors["head.bias"].to_vec1::<f32>().unwrap(),
            vec![0.0, FAVOURED_LOGIT]
        );
        assert_eq!(tensors["conv2.weight"].dims(), &[32, 16, 3, 3]);
    }

    #[test]
    fn test_model_pair_creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("models");

        let paths = write_model_pair(&dir, &[FAVOURED_LOGIT, 0.0], &[0.0; 5]).unwrap();

        assert!(paths.detection.is_file());
        assert!(paths.condition.is_file());
        assert_eq!(read_tensors(&paths.condition, &Device::Cpu).unwrap().len(), 8);
    }
}
