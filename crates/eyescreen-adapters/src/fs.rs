//! Filesystem adapter for loading images.

use anyhow::{Context, Result};
use eyescreen_core::{ImageEncoding, ImageSource, RawImage, SourceImage};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Filesystem image source adapter.
///
/// Yields the encoded bytes of every JPEG or PNG file found; decoding is
/// left to the pipeline so a corrupt file only fails its own analysis.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a new filesystem image source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all image files from the configured paths.
    ///
    /// Explicit file arguments keep their order; directory contents are
    /// sorted so runs are reproducible. Bad arguments are warned about only
    /// when `report` is set.
    fn collect_files(&self, report: bool) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if encoding_of(path).is_some() {
                    files.push(path.clone());
                } else if report {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                let mut found = Vec::new();
                self.collect_from_dir(path, &mut found);
                found.sort();
                files.extend(found);
            } else if report {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() && encoding_of(&path).is_some() {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<SourceImage>> + Send + '_> {
        let files = self.collect_files(true);
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files(false).len())
    }
}

/// Encoding implied by a supported file extension.
fn encoding_of(path: &Path) -> Option<ImageEncoding> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageEncoding::from_extension)
}

/// Reads an image file into memory without decoding it.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;

    Ok(SourceImage::new(
        path.to_string_lossy(),
        RawImage::new(bytes, encoding_of(path)),
    ))
}
