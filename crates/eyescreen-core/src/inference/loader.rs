//! Loading model weights from safetensors files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use once_cell::sync::OnceCell;
use safetensors::SafeTensors;
use tracing::{debug, info};

use crate::domain::AnalysisError;

/// A model that is read from disk at most once, on first access.
///
/// After a successful load the network is shared read-only for the life of
/// the cell. A failed load is not cached, so the error is reported again on
/// the next access.
pub struct LazyModel<T> {
    name: &'static str,
    path: PathBuf,
    device: Device,
    builder: fn(VarBuilder) -> Result<T>,
    model: OnceCell<T>,
}

impl<T: Send + Sync> LazyModel<T> {
    /// Creates a lazy loader for the weights at `path`.
    ///
    /// `builder` turns the loaded weights into the network.
    #[must_use]
    pub fn new(
        name: &'static str,
        path: impl AsRef<Path>,
        device: Device,
        builder: fn(VarBuilder) -> Result<T>,
    ) -> Self {
        Self {
            name,
            path: path.as_ref().to_path_buf(),
            device,
            builder,
            model: OnceCell::new(),
        }
    }

    /// Model name, as used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Path the weights are read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the model, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::ModelLoad`] naming the model and its path if
    /// the file is missing or unreadable, the safetensors data is invalid, or
    /// the weights do not fit the network.
    pub fn get(&self) -> Result<&T, AnalysisError> {
        self.model
            .get_or_try_init(|| {
                info!("Loading {} model from {}", self.name, self.path.display());
                let vb = load_safetensors(&self.path, &self.device)?;
                (self.builder)(vb)
                    .with_context(|| format!("Weights do not match the {} network", self.name))
            })
            .map_err(|e| AnalysisError::model_load(self.name, &self.path, &e))
    }

    /// Returns true if the model has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }
}

/// Reads every tensor of a safetensors file onto `device`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid safetensors,
/// contains no tensors, or uses an unsupported dtype.
pub fn read_tensors(path: impl AsRef<Path>, device: &Device) -> Result<HashMap<String, Tensor>> {
    let path = path.as_ref();
    debug!("Reading safetensors from {}", path.display());

    if !path.is_file() {
        anyhow::bail!("Model file not found: {}", path.display());
    }

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;

    let tensors = SafeTensors::deserialize(&data)
        .with_context(|| format!("Failed to parse safetensors: {}", path.display()))?;

    if tensors.names().is_empty() {
        anyhow::bail!("Model file contains no tensors: {}", path.display());
    }

    let mut tensor_map = HashMap::new();
    for (name, view) in tensors.tensors() {
        let dtype = to_candle_dtype(view.dtype())
            .with_context(|| format!("Tensor '{name}' in {}", path.display()))?;

        let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
            .with_context(|| format!("Failed to create tensor '{name}'"))?;

        tensor_map.insert(name, tensor);
    }

    debug!("Read {} tensors from {}", tensor_map.len(), path.display());
    Ok(tensor_map)
}

/// Loads a safetensors file into a `VarBuilder` over `f32` weights.
///
/// # Errors
///
/// See [`read_tensors`].
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let tensors = read_tensors(path, device)?;
    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

fn to_candle_dtype(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    match dtype {
        S::F32 => Ok(DType::F32),
        S::F64 => Ok(DType::F64),
        S::F16 => Ok(DType::F16),
        S::BF16 => Ok(DType::BF16),
        S::I64 => Ok(DType::I64),
        S::U8 => Ok(DType::U8),
        S::U32 => Ok(DType::U32),
        other => anyhow::bail!("Unsupported dtype: {other:?}"),
    }
}
