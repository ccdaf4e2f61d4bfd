// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster image — an owned RGB pixel buffer plus the resolution it was
// captured at. Handles decoding (with PNG pHYs or JPEG JFIF resolution),
// Lanczos resampling, and lossless PNG encoding using the `image` and `png`
// crates.

use std::io::Cursor;

use doccrop_core::error::{DocCropError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::{debug, info, instrument};

/// Inches per metre, for converting PNG pixels-per-metre to DPI.
const INCHES_PER_METRE: f64 = 39.370_078_740_157_48;

/// Centimetres per inch, for JFIF densities given in dots per centimetre.
const CM_PER_INCH: f64 = 2.54;

/// A decoded RGB image owned by exactly one pipeline stage at a time.
///
/// Ownership moves downstream: the rectifier returns a new `RasterImage`,
/// which the page composer then consumes.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbImage,
    /// Source resolution from file metadata, if the file carried any.
    dpi: Option<f64>,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Decode an image from raw encoded bytes (JPEG, PNG, etc.).
    ///
    /// PNG files carrying a `pHYs` chunk in metres and JPEG files whose JFIF
    /// header gives dots per inch or per centimetre report their DPI; every
    /// other input reports none.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data)
            .map_err(|err| DocCropError::decode(err.to_string()))?;
        let dpi = png_dpi(data).or_else(|| jfif_dpi(data));
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            ?dpi,
            "Image decoded from bytes"
        );
        Ok(Self {
            pixels: decoded.into_rgb8(),
            dpi,
        })
    }

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let image = Self::from_bytes(&data).map_err(|err| match err {
            DocCropError::Decode { index, message } => DocCropError::Decode {
                index,
                message: format!("{}: {}", path.as_ref().display(), message),
            },
            other => other,
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        Ok(image)
    }

    /// Wrap an already-decoded `DynamicImage`, converting it to RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            pixels: image.into_rgb8(),
            dpi: None,
        }
    }

    /// Wrap an RGB buffer.
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels, dpi: None }
    }

    /// Attach a source resolution. Non-positive values clear it.
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = (dpi.is_finite() && dpi > 0.0).then_some(dpi);
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Resolution recorded in the source file, if any.
    pub fn dpi(&self) -> Option<f64> {
        self.dpi
    }

    /// Borrow the pixel buffer.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    /// Consume the image and return the pixel buffer.
    pub fn into_rgb(self) -> RgbImage {
        self.pixels
    }

    // -- Transformations ------------------------------------------------------

    /// Scale both axes by `ratio` with Lanczos3 filtering.
    ///
    /// Each output side is `floor(side * ratio)`, never less than one pixel,
    /// so a ratio computed to fit a box never overflows it.
    #[instrument(skip(self))]
    pub fn scale(&self, ratio: f64) -> RgbImage {
        let (new_w, new_h) = scaled_dimensions(self.width(), self.height(), ratio);
        debug!(
            from_w = self.width(),
            from_h = self.height(),
            new_w,
            new_h,
            "Resampling image"
        );
        if (new_w, new_h) == self.pixels.dimensions() {
            return self.pixels.clone();
        }
        image::imageops::resize(&self.pixels, new_w, new_h, FilterType::Lanczos3)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        self.pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| DocCropError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file as PNG.
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        info!("Wrote PNG to {}", path.as_ref().display());
        Ok(())
    }
}

/// Size after scaling by `ratio`: floor of each side, at least 1x1.
pub fn scaled_dimensions(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    let scale = |side: u32| ((side as f64 * ratio).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Horizontal DPI from a PNG `pHYs` chunk, when the unit is metres.
fn png_dpi(data: &[u8]) -> Option<f64> {
    let reader = png::Decoder::new(Cursor::new(data)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter if dims.xppu > 0 => Some(dims.xppu as f64 / INCHES_PER_METRE),
        _ => None,
    }
}

/// Horizontal DPI from the JFIF APP0 segment of a JPEG.
///
/// Unit 0 is only a pixel aspect ratio and yields nothing.
fn jfif_dpi(data: &[u8]) -> Option<f64> {
    let mut rest = data.strip_prefix(&[0xFF_u8, 0xD8])?;
    while let [0xFF, marker, tail @ ..] = rest {
        match *marker {
            // Fill byte before a marker.
            0xFF => {
                rest = &rest[1..];
                continue;
            }
            // Start of scan: no header segments follow.
            0xDA => return None,
            _ => {}
        }
        let [hi, lo, payload @ ..] = tail else {
            return None;
        };
        let length = usize::from(u16::from_be_bytes([*hi, *lo]));
        let body = payload.get(..length.checked_sub(2)?)?;
        if *marker == 0xE0 {
            if let [b'J', b'F', b'I', b'F', 0, _, _, unit, xh, xl, ..] = body {
                let density = f64::from(u16::from_be_bytes([*xh, *xl]));
                return match *unit {
                    1 if density > 0.0 => Some(density),
                    2 if density > 0.0 => Some(density * CM_PER_INCH),
                    _ => None,
                };
            }
        }
        rest = &payload[body.len()..];
    }
    None
}
