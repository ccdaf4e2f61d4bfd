// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for DocCrop: corner geometry and page layout options.

use serde::{Deserialize, Serialize};

use crate::error::{DocCropError, Result};

// -- Geometry -----------------------------------------------------------------

/// A point in source-image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The four corners of a document selection, always in
/// top-left, top-right, bottom-right, bottom-left order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl CornerSet {
    pub const fn new(
        top_left: Point,
        top_right: Point,
        bottom_right: Point,
        bottom_left: Point,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    /// Build from 8 numbers laid out as `[x1, y1, x2, y2, x3, y3, x4, y4]`
    /// in TL, TR, BR, BL order.
    pub fn from_flat(coords: &[f64]) -> Result<Self> {
        if coords.len() != 8 {
            return Err(DocCropError::Geometry(format!(
                "expected 8 coordinates for 4 corners, got {}",
                coords.len()
            )));
        }
        if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
            return Err(DocCropError::Geometry(format!(
                "corner coordinate {bad} is not a finite number"
            )));
        }
        Ok(Self::new(
            Point::new(coords[0], coords[1]),
            Point::new(coords[2], coords[3]),
            Point::new(coords[4], coords[5]),
            Point::new(coords[6], coords[7]),
        ))
    }

    /// Corners as an array in TL, TR, BR, BL order.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Length of the TL→TR edge.
    pub fn top_edge(&self) -> f64 {
        self.top_left.distance_to(&self.top_right)
    }

    /// Length of the BL→BR edge.
    pub fn bottom_edge(&self) -> f64 {
        self.bottom_left.distance_to(&self.bottom_right)
    }

    /// Length of the TL→BL edge.
    pub fn left_edge(&self) -> f64 {
        self.top_left.distance_to(&self.bottom_left)
    }

    /// Length of the TR→BR edge.
    pub fn right_edge(&self) -> f64 {
        self.top_right.distance_to(&self.bottom_right)
    }
}

// -- Layout options -----------------------------------------------------------

/// How many rectified images share one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagesPerPage {
    #[default]
    One,
    Two,
    Four,
}

impl ImagesPerPage {
    /// Normalize a requested count. Values below 1 clamp to 1, anything
    /// outside {1, 2, 4} becomes 1.
    pub fn from_count(count: i64) -> Self {
        match count.max(1) {
            2 => Self::Two,
            4 => Self::Four,
            _ => Self::One,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Case-insensitive parse; unknown values fall back to portrait.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "landscape" => Self::Landscape,
            _ => Self::Portrait,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Spatial pattern used to pack several images onto one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    #[default]
    Auto,
    Vertical,
    Horizontal,
    Grid,
}

impl Arrangement {
    /// Case-insensitive parse; unknown values fall back to auto.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "vertical" => Self::Vertical,
            "horizontal" => Self::Horizontal,
            "grid" => Self::Grid,
            _ => Self::Auto,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Grid => "grid",
        }
    }
}

/// How a placed image is sized relative to its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    /// Largest size that fits the cell.
    #[default]
    Fit,
    /// Native size at the source DPI.
    Original,
    /// A percentage of the native size.
    Percent,
}

impl ScaleMode {
    /// Case-insensitive parse; unknown values fall back to fit.
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "original" => Self::Original,
            "percent" => Self::Percent,
            _ => Self::Fit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Original => "original",
            Self::Percent => "percent",
        }
    }
}

/// Page composition options.
///
/// Deserialization never fails on unrecognized values: every enumerated field
/// falls back to its default and `layout` is normalized to 1, 2 or 4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawLayoutSpec", into = "RawLayoutSpec")]
pub struct LayoutSpec {
    pub images_per_page: ImagesPerPage,
    pub orientation: Orientation,
    pub arrangement: Arrangement,
    pub scale_mode: ScaleMode,
    /// Only consulted when `scale_mode` is [`ScaleMode::Percent`].
    pub scale_percent: f64,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            images_per_page: ImagesPerPage::One,
            orientation: Orientation::Portrait,
            arrangement: Arrangement::Auto,
            scale_mode: ScaleMode::Fit,
            scale_percent: 100.0,
        }
    }
}

/// Wire form of [`LayoutSpec`], using the keys of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLayoutSpec {
    pub layout: i64,
    pub orientation: String,
    pub arrangement: String,
    pub scale_mode: String,
    pub scale_percent: f64,
}

impl Default for RawLayoutSpec {
    fn default() -> Self {
        LayoutSpec::default().into()
    }
}

impl From<RawLayoutSpec> for LayoutSpec {
    fn from(raw: RawLayoutSpec) -> Self {
        let scale_percent = if raw.scale_percent.is_finite() {
            raw.scale_percent
        } else {
            100.0
        };
        Self {
            images_per_page: ImagesPerPage::from_count(raw.layout),
            orientation: Orientation::parse_lossy(&raw.orientation),
            arrangement: Arrangement::parse_lossy(&raw.arrangement),
            scale_mode: ScaleMode::parse_lossy(&raw.scale_mode),
            scale_percent,
        }
    }
}

impl From<LayoutSpec> for RawLayoutSpec {
    fn from(spec: LayoutSpec) -> Self {
        Self {
            layout: spec.images_per_page.count() as i64,
            orientation: spec.orientation.as_str().to_owned(),
            arrangement: spec.arrangement.as_str().to_owned(),
            scale_mode: spec.scale_mode.as_str().to_owned(),
            scale_percent: spec.scale_percent,
        }
    }
}

// -- Pages --------------------------------------------------------------------

/// A4 paper in millimetres (width, height), portrait.
pub const A4_MM: (f64, f64) = (210.0, 297.0);

/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Pixel dimensions of a page canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// A4 canvas at `dpi`, transposed for landscape.
    ///
    /// At 300 DPI this is 2480x3508 (portrait) or 3508x2480 (landscape).
    pub fn a4(orientation: Orientation, dpi: f64) -> Self {
        let to_px = |mm: f64| (mm / MM_PER_INCH * dpi).round().max(1.0) as u32;
        let (w, h) = (to_px(A4_MM.0), to_px(A4_MM.1));
        match orientation {
            Orientation::Portrait => Self {
                width: w,
                height: h,
            },
            Orientation::Landscape => Self {
                width: h,
                height: w,
            },
        }
    }

    /// Physical size in millimetres when printed at `dpi`.
    pub fn dimensions_mm(&self, dpi: f64) -> (f64, f64) {
        (
            self.width as f64 / dpi * MM_PER_INCH,
            self.height as f64 / dpi * MM_PER_INCH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_set_from_flat_keeps_order() {
        let corners = CornerSet::from_flat(&[0.0, 0.0, 10.0, 0.0, 10.0, 20.0, 0.0, 20.0])
            .expect("8 coordinates");
        assert_eq!(corners.top_right, Point::new(10.0, 0.0));
        assert_eq!(corners.bottom_left, Point::new(0.0, 20.0));
        assert!((corners.top_edge() - 10.0).abs() < 1e-9);
        assert!((corners.right_edge() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn corner_set_from_flat_rejects_wrong_length() {
        let err = CornerSet::from_flat(&[0.0; 6]).unwrap_err();
        assert!(matches!(err, DocCropError::Geometry(_)));
    }

    #[test]
    fn corner_set_from_flat_rejects_nan() {
        let mut coords = [1.0; 8];
        coords[5] = f64::NAN;
        assert!(CornerSet::from_flat(&coords).is_err());
    }

    #[test]
    fn images_per_page_normalizes() {
        assert_eq!(ImagesPerPage::from_count(2), ImagesPerPage::Two);
        assert_eq!(ImagesPerPage::from_count(4), ImagesPerPage::Four);
        assert_eq!(ImagesPerPage::from_count(3), ImagesPerPage::One);
        assert_eq!(ImagesPerPage::from_count(0), ImagesPerPage::One);
        assert_eq!(ImagesPerPage::from_count(-7), ImagesPerPage::One);
        assert_eq!(ImagesPerPage::from_count(8), ImagesPerPage::One);
    }

    #[test]
    fn enum_parsing_is_case_insensitive_and_lossy() {
        assert_eq!(Orientation::parse_lossy("LANDSCAPE"), Orientation::Landscape);
        assert_eq!(Orientation::parse_lossy("sideways"), Orientation::Portrait);
        assert_eq!(Arrangement::parse_lossy("Grid"), Arrangement::Grid);
        assert_eq!(Arrangement::parse_lossy("diagonal"), Arrangement::Auto);
        assert_eq!(ScaleMode::parse_lossy("Percent"), ScaleMode::Percent);
        assert_eq!(ScaleMode::parse_lossy("stretch"), ScaleMode::Fit);
    }

    #[test]
    fn layout_spec_deserializes_leniently() {
        let spec: LayoutSpec = serde_json::from_str(
            r#"{"layout": 3, "orientation": "upside-down", "arrangement": "HORIZONTAL",
                "scale_mode": "zoom", "scale_percent": 50}"#,
        )
        .expect("lenient parse");
        assert_eq!(spec.images_per_page, ImagesPerPage::One);
        assert_eq!(spec.orientation, Orientation::Portrait);
        assert_eq!(spec.arrangement, Arrangement::Horizontal);
        assert_eq!(spec.scale_mode, ScaleMode::Fit);
        assert_eq!(spec.scale_percent, 50.0);
    }

    #[test]
    fn layout_spec_missing_fields_take_defaults() {
        let spec: LayoutSpec = serde_json::from_str("{}").expect("empty object");
        assert_eq!(spec, LayoutSpec::default());
    }

    #[test]
    fn layout_spec_serializes_with_settings_keys() {
        let spec = LayoutSpec {
            images_per_page: ImagesPerPage::Four,
            orientation: Orientation::Landscape,
            arrangement: Arrangement::Grid,
            scale_mode: ScaleMode::Original,
            scale_percent: 100.0,
        };
        let value = serde_json::to_value(spec).expect("serialize");
        assert_eq!(value["layout"], 4);
        assert_eq!(value["orientation"], "landscape");
        assert_eq!(value["scale_mode"], "original");
    }

    #[test]
    fn a4_canvas_at_300_dpi() {
        assert_eq!(
            PageSize::a4(Orientation::Portrait, 300.0),
            PageSize {
                width: 2480,
                height: 3508
            }
        );
        assert_eq!(
            PageSize::a4(Orientation::Landscape, 300.0),
            PageSize {
                width: 3508,
                height: 2480
            }
        );
    }
}
