//! Model artifact catalog.
//!
//! Weights are installed by hand into the models directory; this module only
//! resolves where they should be and reports what is there.

use anyhow::{Context, Result};
use eyescreen_core::inference::{ModelPaths, CONDITION_MODEL, DETECTION_MODEL};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A model the screening pipeline needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelArtifact {
    /// Model name, as used in logs and errors.
    pub name: &'static str,
    /// Default filename in the models directory.
    pub filename: &'static str,
}

/// Known models, in pipeline order.
pub const MODELS: &[ModelArtifact] = &[
    ModelArtifact {
        name: DETECTION_MODEL,
        filename: "eye_detect.safetensors",
    },
    ModelArtifact {
        name: CONDITION_MODEL,
        filename: "eye_condition.safetensors",
    },
];

/// Returns the default models directory path.
///
/// Uses `XDG_DATA_HOME/eyescreen/models` or `~/.local/share/eyescreen/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eyescreen")
        .join("models")
}

/// Installation state of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    /// Model name.
    pub name: &'static str,
    /// Where the model is expected.
    pub path: PathBuf,
    /// Size in bytes, if installed.
    pub size: Option<u64>,
    /// Lowercase hex SHA-256, if installed and readable.
    pub sha256: Option<String>,
}

impl ModelStatus {
    /// Returns true if the file exists.
    #[must_use]
    pub const fn installed(&self) -> bool {
        self.size.is_some()
    }
}

/// Resolves model artifact locations from a directory and optional
/// per-model overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    dir: PathBuf,
    detection: Option<PathBuf>,
    condition: Option<PathBuf>,
}

impl ModelCatalog {
    /// A catalog rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            detection: None,
            condition: None,
        }
    }

    /// Uses explicit files instead of the default names inside the directory.
    #[must_use]
    pub fn with_overrides(mut self, detection: Option<PathBuf>, condition: Option<PathBuf>) -> Self {
        self.detection = detection;
        self.condition = condition;
        self
    }

    /// The models directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolved paths for both models.
    #[must_use]
    pub fn paths(&self) -> ModelPaths {
        ModelPaths {
            detection: self
                .detection
                .clone()
                .unwrap_or_else(|| self.dir.join(MODELS[0].filename)),
            condition: self
                .condition
                .clone()
                .unwrap_or_else(|| self.dir.join(MODELS[1].filename)),
        }
    }

    /// Checks if both models exist.
    #[must_use]
    pub fn all_installed(&self) -> bool {
        let paths = self.paths();
        paths.detection.is_file() && paths.condition.is_file()
    }

    /// Reports install state and digest of every model.
    #[must_use]
    pub fn list(&self) -> Vec<ModelStatus> {
        let paths = self.paths();
        [
            (DETECTION_MODEL, paths.detection),
            (CONDITION_MODEL, paths.condition),
        ]
        .into_iter()
        .map(|(name, path)| status(name, path))
        .collect()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(models_dir())
    }
}

fn status(name: &'static str, path: PathBuf) -> ModelStatus {
    let size = std::fs::metadata(&path)
        .ok()
        .filter(std::fs::Metadata::is_file)
        .map(|m| m.len());
    let sha256 = size.and_then(|_| match sha256_file(&path) {
        Ok(digest) => Some(digest),
        Err(e) => {
            debug!("Could not hash {}: {e:#}", path.display());
            None
        }
    });
    ModelStatus {
        name,
        path,
        size,
        sha256,
    }
}

/// Computes the lowercase hex SHA-256 of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_models_dir() {
        let dir = models_dir();
        assert!(dir.ends_with("eyescreen/models"));
    }

    #[test]
    fn test_catalog_default_names() {
        let paths = ModelCatalog::new(PathBuf::from("/m")).paths();
        assert_eq!(paths.detection, PathBuf::from("/m/eye_detect.safetensors"));
        assert_eq!(paths.condition, PathBuf::from("/m/eye_condition.safetensors"));
    }

    #[test]
    fn test_catalog_overrides() {
        let paths = ModelCatalog::new(PathBuf::from("/m"))
            .with_overrides(None, Some(PathBuf::from("/elsewhere/c.safetensors")))
            .paths();
        assert_eq!(paths.detection, PathBuf::from("/m/eye_detect.safetensors"));
        assert_eq!(paths.condition, PathBuf::from("/elsewhere/c.safetensors"));
    }

    #[test]
    fn test_list_reports_missing_and_installed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("eye_detect.safetensors"), b"abc").unwrap();

        let catalog = ModelCatalog::new(dir.path().to_path_buf());
        let list = catalog.list();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "detection");
        assert!(list[0].installed());
        assert_eq!(list[0].size, Some(3));
        assert_eq!(
            list[0].sha256.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
        assert_eq!(list[1].name, "condition");
        assert!(!list[1].installed());
        assert!(list[1].sha256.is_none());
        assert!(!catalog.all_installed());

        std::fs::write(dir.path().join("eye_condition.safetensors"), b"").unwrap();
        assert!(catalog.all_installed());
    }

    #[test]
    fn test_directory_is_not_installed_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("eye_condition.safetensors")).unwrap();
        let list = ModelCatalog::new(dir.path().to_path_buf()).list();
        assert!(!list[1].installed());
    }
}
