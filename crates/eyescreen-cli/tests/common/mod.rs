//! Shared fixtures for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used, deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use eyescreen_core::EyeImage;
use eyescreen_test_support::{write_model_pair, SyntheticImageBuilder, FAVOURED_LOGIT};
use tempfile::TempDir;

/// Detection head that prefers "Eye Detected" (~0.95).
pub const EYE: [f32; 2] = [FAVOURED_LOGIT, 0.0];
/// Detection head that prefers "No Eye Detected" (~0.95).
pub const NO_EYE: [f32; 2] = [0.0, FAVOURED_LOGIT];
/// Condition head with no preference: every class at 0.2.
pub const FLAT: [f32; 5] = [0.0; 5];

/// Condition head favouring one class (~0.83).
pub fn favouring(index: usize) -> [f32; 5] {
    let mut logits = [0.0; 5];
    logits[index] = FAVOURED_LOGIT;
    logits
}

/// An isolated working directory with its own config and data homes.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        for sub in ["models", "images", "xdg-config", "xdg-data"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn models_dir(&self) -> PathBuf {
        self.path().join("models")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.path().join("images")
    }

    pub fn write_models(&self, detection: &[f32; 2], condition: &[f32; 5]) {
        write_model_pair(&self.models_dir(), detection, condition).unwrap();
    }

    /// Writes an eye-like PNG into the images directory.
    pub fn eye_png(&self, name: &str) -> PathBuf {
        self.image(name, &SyntheticImageBuilder::eye_like(200, 150))
    }

    pub fn image(&self, name: &str, image: &EyeImage) -> PathBuf {
        let path = self.images_dir().join(name);
        std::fs::write(&path, SyntheticImageBuilder::png(image).unwrap()).unwrap();
        path
    }

    pub fn write(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// The binary, run inside the workspace with user config isolated.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("eyescreen").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("xdg-config"))
            .env("XDG_DATA_HOME", self.path().join("xdg-data"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// [`Self::cmd`] pointed at the workspace models.
    pub fn analyze(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--models-dir").arg(self.models_dir());
        cmd
    }
}

/// Parses JSON Lines output.
pub fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}
