// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration. Passed explicitly into every pipeline call; the
// pipeline never reads settings from disk on its own.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DocCropError, Result};
use crate::types::LayoutSpec;

/// Settings shared by the rectifier and the page composer.
///
/// Keys mirror the settings file written by earlier DocCrop versions, so the
/// layout fields sit at the top level. Unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default page layout when a request does not override it.
    #[serde(flatten)]
    pub layout: LayoutSpec,
    /// Output resolution of composed pages.
    pub target_dpi: f64,
    /// Resolution assumed for images that carry no DPI metadata.
    pub default_source_dpi: f64,
    /// Padding in pixels on each side of every grid cell.
    pub cell_margin_px: u32,
    /// Label stamped on non-first pages in demo mode.
    pub watermark_text: String,
    /// TrueType font for the watermark. System fonts are probed when unset.
    pub watermark_font: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            layout: LayoutSpec::default(),
            target_dpi: 300.0,
            default_source_dpi: 72.0,
            cell_margin_px: 40,
            watermark_text: "DEMO".to_owned(),
            watermark_font: None,
        }
    }
}

impl AppConfig {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text).map_err(|err| {
            DocCropError::Config(format!("{}: {}", path.display(), err))
        })?;
        debug!(path = %path.display(), ?config, "Settings loaded");
        Ok(config)
    }

    /// Parse settings from a JSON document and validate them.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.target_dpi.is_finite() && self.target_dpi > 0.0) {
            return Err(DocCropError::Config(format!(
                "target_dpi must be positive, got {}",
                self.target_dpi
            )));
        }
        if !(self.default_source_dpi.is_finite() && self.default_source_dpi > 0.0) {
            return Err(DocCropError::Config(format!(
                "default_source_dpi must be positive, got {}",
                self.default_source_dpi
            )));
        }
        Ok(())
    }
}
