//! Reference image loading
//!
//! Reads every PNG below the assets directory so the generation model can
//! see what the subject looks like.

use crate::models::{ReferenceImage, REFERENCE_MIME_TYPE};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const REFERENCE_EXTENSION: &str = "png";

pub struct AssetLoader {
    dir: PathBuf,
}

impl AssetLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load all reference images, sorted by path.
    ///
    /// Any unreadable file fails the whole load. An empty directory is not an
    /// error; the prompt is then sent without reference images.
    pub fn load(&self) -> Result<Vec<ReferenceImage>> {
        if !self.dir.is_dir() {
            return Err(Error::Assets(format!(
                "Reference image directory not found: {}",
                self.dir.display()
            )));
        }

        let mut images = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_reference_image(entry.path()) {
                continue;
            }

            let data = fs::read(entry.path()).map_err(|e| {
                tracing::error!(
                    "Failed to read reference image {}: {}",
                    entry.path().display(),
                    e
                );
                e
            })?;

            images.push(ReferenceImage {
                path: entry.into_path(),
                mime_type: REFERENCE_MIME_TYPE,
                data,
            });
        }

        if images.is_empty() {
            tracing::warn!(
                "No reference images found in {}; prompting without them",
                self.dir.display()
            );
        } else {
            tracing::debug!(
                "Loaded {} reference images from {}",
                images.len(),
                self.dir.display()
            );
        }

        Ok(images)
    }
}

fn is_reference_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(REFERENCE_EXTENSION))
}
