// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectifier — warps a user-selected quadrilateral into an upright A4-ratio
// rectangle, sharpens it, and encodes the result as PNG.

use doccrop_core::error::{DocCropError, Result};
use doccrop_core::types::CornerSet;
use image::{Rgb, RgbImage};
use imageproc::filter::filter3x3;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument};

use crate::image::raster::RasterImage;
use crate::scan::geometry::{self, TargetSize};

/// 3x3 sharpening kernel: centre 9, all eight neighbours -1.
pub const SHARPEN_KERNEL: [i32; 9] = [-1, -1, -1, -1, 9, -1, -1, -1, -1];

/// Largest output side accepted by default, in pixels.
pub const DEFAULT_MAX_DIMENSION: u32 = 30_000;

/// Output pixels whose source location falls outside the photo are black.
const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Turns a photographed page plus its four corners into a flat scan.
///
/// Stateless apart from its limits, so one instance can serve concurrent
/// requests.
///
/// ```ignore
/// let png = Rectifier::new().rectify_bytes(&photo_bytes, &corners)?;
/// ```
#[derive(Debug, Clone)]
pub struct Rectifier {
    /// Upper bound on either output side; larger selections are rejected.
    max_dimension: u32,
}

impl Default for Rectifier {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl Rectifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the maximum output side length.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    /// Rectify a decoded image.
    ///
    /// ## Pipeline
    ///
    /// 1. Size the output from the corner edges, forcing an A4 portrait ratio
    /// 2. Reject degenerate corner sets
    /// 3. Solve the homography mapping the corners onto the output rectangle
    /// 4. Warp with bilinear sampling
    /// 5. Apply the 3x3 sharpening kernel
    #[instrument(skip(self, image), fields(src_w = image.width(), src_h = image.height()))]
    pub fn rectify(&self, image: &RasterImage, corners: &CornerSet) -> Result<RasterImage> {
        let size = geometry::target_size(corners)?;
        self.check_limits(&size)?;
        geometry::check_quadrilateral(corners)?;
        debug!(area = geometry::shoelace_area(corners), "Selection accepted");

        info!(
            out_w = size.width,
            out_h = size.height,
            selection_height = size.selection_height,
            "Calculated output dimensions"
        );

        let projection = Projection::from_control_points(
            geometry::source_corners(corners),
            geometry::destination_corners(&size),
        )
        .ok_or_else(|| {
            DocCropError::Geometry(
                "could not compute a perspective transform for these corners".into(),
            )
        })?;
        debug!(?projection, "Perspective transform computed");

        let mut warped = RgbImage::new(size.width, size.height);
        warp_into(
            image.as_rgb(),
            &projection,
            Interpolation::Bilinear,
            BACKGROUND,
            &mut warped,
        );
        debug!("Image warped");

        let sharpened = sharpen(&warped);
        info!(
            width = sharpened.width(),
            height = sharpened.height(),
            "Rectification complete"
        );

        Ok(RasterImage::from_rgb(sharpened))
    }

    /// Decode `data`, rectify it, and return the result as PNG bytes.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn rectify_bytes(&self, data: &[u8], corners: &CornerSet) -> Result<Vec<u8>> {
        let image = RasterImage::from_bytes(data)?;
        let rectified = self.rectify(&image, corners)?;
        let png = rectified.to_png_bytes()?;
        debug!(png_bytes = png.len(), "Rectified image encoded");
        Ok(png)
    }

    fn check_limits(&self, size: &TargetSize) -> Result<()> {
        if size.width > self.max_dimension || size.height > self.max_dimension {
            return Err(DocCropError::TooLarge {
                width: size.width,
                height: size.height,
                limit: self.max_dimension,
            });
        }
        Ok(())
    }
}

/// Convolve with [`SHARPEN_KERNEL`], clamping each channel to 0..=255.
pub fn sharpen(image: &RgbImage) -> RgbImage {
    filter3x3::<_, i32, u8>(image, &SHARPEN_KERNEL)
}

// -- Tests --------------------------------------------------------------------
