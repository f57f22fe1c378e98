//! Error taxonomy for the screening pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by model loading and analysis.
///
/// Callers distinguish bad input (decode failures, empty buffers, crops out of
/// bounds) from internal failures with [`AnalysisError::is_input_error`].
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A model artifact is missing or could not be turned into a network.
    #[error("failed to load {model} model from {}: {reason}", .path.display())]
    ModelLoad {
        /// Which model failed ("detection" or "condition").
        model: &'static str,
        /// Expected artifact path.
        path: PathBuf,
        /// Underlying cause, with its context chain.
        reason: String,
    },

    /// The caller handed over something that is not an analyzable image.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The image bytes could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The model ran but produced something unusable, or the runtime failed.
    #[error("{model} inference failed: {message}")]
    Inference {
        /// Which model failed.
        model: &'static str,
        /// What went wrong.
        message: String,
    },
}

impl AnalysisError {
    /// Returns true for errors caused by the input image rather than the system.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Decode(_))
    }

    /// Builds an [`AnalysisError::ModelLoad`], keeping the whole context chain.
    pub fn model_load(model: &'static str, path: impl Into<PathBuf>, cause: &anyhow::Error) -> Self {
        Self::ModelLoad {
            model,
            path: path.into(),
            reason: format!("{cause:#}"),
        }
    }

    /// Builds an [`AnalysisError::Inference`] from any displayable cause.
    pub fn inference(model: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Inference {
            model,
            message: cause.to_string(),
        }
    }
}
