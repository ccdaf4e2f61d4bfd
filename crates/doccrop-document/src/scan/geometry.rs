// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner geometry — output sizing with the A4 aspect override, and the
// degeneracy checks a quadrilateral must pass before a homography is solved.

use std::f64::consts::SQRT_2;

use doccrop_core::error::{DocCropError, Result};
use doccrop_core::types::{CornerSet, Point};
use tracing::{debug, warn};

/// Height-to-width ratio of ISO 216 portrait paper.
pub const A4_PORTRAIT_RATIO: f64 = SQRT_2;

/// Minimum distance, in pixels, for two corners to count as distinct.
const MIN_CORNER_SEPARATION: f64 = 1e-6;

/// Relative tolerance below which three corners are treated as collinear.
const COLLINEAR_TOLERANCE: f64 = 1e-9;

/// Output rectangle for a rectification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
    /// Longer of the left and right edges, as measured from the corners.
    pub selection_height: f64,
}

/// Compute the output rectangle for `corners`.
///
/// Width is the longer of the top and bottom edges, rounded. Height is forced
/// to `round(width * sqrt(2))` regardless of the selected height. Only when
/// that yields a non-positive size does the measured selection height take
/// over, and if that is non-positive too the corners are rejected.
pub fn target_size(corners: &CornerSet) -> Result<TargetSize> {
    let width = corners.top_edge().max(corners.bottom_edge()).round();
    let selection_height = corners.left_edge().max(corners.right_edge());
    let mut height = (width * A4_PORTRAIT_RATIO).round();

    debug!(width, selection_height, height, "Target size from corners");

    if width <= 0.0 || height <= 0.0 {
        warn!(
            width,
            height,
            selection_height,
            "Non-positive target size, falling back to selection height"
        );
        height = selection_height.round();
        if height <= 0.0 {
            return Err(DocCropError::Geometry(
                "corners produce a zero-sized output even after the height fallback".into(),
            ));
        }
    }

    if width <= 0.0 {
        return Err(DocCropError::Geometry(
            "top and bottom edges have zero length".into(),
        ));
    }

    Ok(TargetSize {
        width: width as u32,
        height: height as u32,
        selection_height,
    })
}

/// Reject corner sets that cannot bound a planar region.
///
/// Fails when adjacent corners coincide, when any three consecutive corners
/// are collinear, or when opposite edges cross (a bow-tie ordering).
pub fn check_quadrilateral(corners: &CornerSet) -> Result<()> {
    let pts = corners.to_array();
    const NAMES: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

    for i in 0..4 {
        let j = (i + 1) % 4;
        if pts[i].distance_to(&pts[j]) < MIN_CORNER_SEPARATION {
            return Err(DocCropError::Geometry(format!(
                "{} and {} corners coincide",
                NAMES[i], NAMES[j]
            )));
        }
    }

    for i in 0..4 {
        let (a, b, c) = (pts[i], pts[(i + 1) % 4], pts[(i + 2) % 4]);
        let scale = a.distance_to(&b) * b.distance_to(&c);
        if cross(a, b, c).abs() <= COLLINEAR_TOLERANCE * scale {
            return Err(DocCropError::Geometry(format!(
                "{}, {} and {} corners are collinear",
                NAMES[i],
                NAMES[(i + 1) % 4],
                NAMES[(i + 2) % 4]
            )));
        }
    }

    if segments_cross(pts[0], pts[1], pts[2], pts[3])
        || segments_cross(pts[1], pts[2], pts[3], pts[0])
    {
        return Err(DocCropError::Geometry(
            "corners are not in top-left, top-right, bottom-right, bottom-left order (edges cross)"
                .into(),
        ));
    }

    Ok(())
}

/// Corners of the `width` x `height` output rectangle in TL, TR, BR, BL order.
pub fn destination_corners(size: &TargetSize) -> [(f32, f32); 4] {
    let (w, h) = (size.width as f32, size.height as f32);
    [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
}

/// Source corners in the layout `imageproc` expects.
pub fn source_corners(corners: &CornerSet) -> [(f32, f32); 4] {
    corners.to_array().map(|p| (p.x as f32, p.y as f32))
}

/// Area of the quadrilateral by the shoelace formula.
pub fn shoelace_area(corners: &CornerSet) -> f64 {
    let pts = corners.to_array();
    let mut area = 0.0;
    for i in 0..4 {
        let j = (i + 1) % 4;
        area += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
    }
    area.abs() / 2.0
}

/// Z component of (b - a) x (c - b).
fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

/// Whether segments p1-p2 and p3-p4 properly intersect.
fn segments_cross(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let orient = |a: Point, b: Point, c: Point| {
        let v = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        v.signum() as i8 * (v != 0.0) as i8
    };
    let d1 = orient(p3, p4, p1);
    let d2 = orient(p3, p4, p2);
    let d3 = orient(p1, p2, p3);
    let d4 = orient(p1, p2, p4);
    d1 * d2 < 0 && d3 * d4 < 0
}
