// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch scan manifest — a JSON list of photos and the corners selected on
// each, rectified in order and composed into one PDF.

use std::path::{Path, PathBuf};

use doccrop_core::error::{DocCropError, Result};
use doccrop_core::types::CornerSet;
use serde::Deserialize;
use tracing::debug;

/// One photo and its selected corners.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Photo path; relative paths are resolved against the manifest's folder.
    pub image: PathBuf,
    /// `[x1, y1, x2, y2, x3, y3, x4, y4]` in TL, TR, BR, BL order.
    pub corners: Vec<f64>,
}

impl ManifestEntry {
    /// Corners as a [`CornerSet`]; `position` is the zero-based entry index
    /// used in the error message.
    pub fn corner_set(&self, position: usize) -> Result<CornerSet> {
        CornerSet::from_flat(&self.corners).map_err(|err| match err {
            DocCropError::Geometry(detail) => DocCropError::Geometry(format!(
                "manifest entry {} ({}): {}",
                position + 1,
                self.image.display(),
                detail
            )),
            other => other,
        })
    }
}

/// Entries of a manifest file, with image paths made absolute.
#[derive(Debug, Clone)]
pub struct ScanManifest {
    pub entries: Vec<ManifestEntry>,
}

impl ScanManifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&text, base).map_err(|err| match err {
            DocCropError::Serialization(detail) => {
                DocCropError::Config(format!("{}: {}", path.display(), detail))
            }
            other => other,
        })
    }

    /// Parse a manifest, resolving relative image paths against `base`.
    pub fn from_json_str(text: &str, base: &Path) -> Result<Self> {
        let mut entries: Vec<ManifestEntry> = serde_json::from_str(text)?;
        for entry in &mut entries {
            if entry.image.is_relative() {
                entry.image = base.join(&entry.image);
            }
        }
        debug!(entries = entries.len(), "Scan manifest parsed");
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doccrop_core::error::ErrorKind;

    #[test]
    fn relative_paths_follow_the_manifest() {
        let manifest = ScanManifest::from_json_str(
            r#"[{"image": "a.jpg", "corners": [0,0,10,0,10,10,0,10]},
                {"image": "/abs/b.png", "corners": [1,1,9,1,9,9,1,9]}]"#,
            Path::new("/scans"),
        )
        .expect("parse");
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.entries[0].image, PathBuf::from("/scans/a.jpg"));
        assert_eq!(manifest.entries[1].image, PathBuf::from("/abs/b.png"));
    }

    #[test]
    fn wrong_corner_count_names_the_entry() {
        let manifest = ScanManifest::from_json_str(
            r#"[{"image": "page.jpg", "corners": [0, 0, 10, 0]}]"#,
            Path::new("."),
        )
        .expect("parse");
        let err = manifest.entries[0].corner_set(0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Geometry);
        assert!(err.to_string().contains("manifest entry 1"), "{err}");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{ not json").expect("write");
        let err = ScanManifest::load(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
