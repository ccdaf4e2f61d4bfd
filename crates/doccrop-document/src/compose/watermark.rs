// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page watermark — large red text centred on a page canvas. Uses a TrueType
// font when one can be loaded and a built-in block font otherwise, so a
// watermark is always drawn.

use std::path::Path;

use ab_glyph::FontVec;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

/// Watermark colour.
pub const WATERMARK_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Fonts tried, in order, when no font path is configured.
const SYSTEM_FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Rows in a built-in glyph.
const GLYPH_ROWS: u32 = 7;
/// Columns in a built-in glyph.
const GLYPH_COLS: u32 = 5;
/// Horizontal advance of a built-in glyph, in modules.
const GLYPH_ADVANCE: u32 = GLYPH_COLS + 1;

/// Where glyphs come from.
pub enum WatermarkFont {
    TrueType(FontVec),
    Builtin,
}

impl std::fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrueType(_) => f.write_str("TrueType"),
            Self::Builtin => f.write_str("Builtin"),
        }
    }
}

/// Text stamped across every page after the first in demo mode.
#[derive(Debug)]
pub struct Watermark {
    text: String,
    font: WatermarkFont,
}

impl Watermark {
    /// Load the watermark font once.
    ///
    /// An explicit `font_path` is tried first, then the usual system font
    /// locations. If nothing loads, the built-in block font is used.
    pub fn load(text: impl Into<String>, font_path: Option<&Path>) -> Self {
        let text = text.into();
        if let Some(path) = font_path {
            match load_font(path) {
                Some(font) => {
                    info!("Loaded watermark font: {}", path.display());
                    return Self::with_font(text, WatermarkFont::TrueType(font));
                }
                None => warn!(
                    "Could not load watermark font {}, trying system fonts",
                    path.display()
                ),
            }
        }

        for path in SYSTEM_FONT_PATHS {
            if let Some(font) = load_font(Path::new(path)) {
                info!("Loaded watermark font: {}", path);
                return Self::with_font(text, WatermarkFont::TrueType(font));
            }
        }

        warn!("No TrueType font available, using the built-in watermark font");
        Self::with_font(text, WatermarkFont::Builtin)
    }

    /// Watermark drawn with the built-in block font.
    pub fn builtin(text: impl Into<String>) -> Self {
        Self::with_font(text.into(), WatermarkFont::Builtin)
    }

    fn with_font(text: String, font: WatermarkFont) -> Self {
        Self { text, font }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &WatermarkFont {
        &self.font
    }

    /// Font size for a page: one eighth of its shorter side.
    pub fn font_size(width: u32, height: u32) -> f32 {
        width.min(height) as f32 / 8.0
    }

    /// Pixel extent of the text at `size`, falling back to an estimate when
    /// the font cannot measure it.
    pub fn measure(&self, size: f32) -> (u32, u32) {
        let measured = match &self.font {
            WatermarkFont::TrueType(font) => {
                let (w, h) = text_size(size, font, &self.text);
                (w > 0 && h > 0).then_some((w, h))
            }
            WatermarkFont::Builtin => builtin_extent(&self.text, size),
        };
        measured.unwrap_or_else(|| {
            debug!(size, "Text measurement failed, using approximate extent");
            approximate_extent(&self.text, size)
        })
    }

    /// Draw the watermark centred on `canvas`.
    pub fn apply(&self, canvas: &mut RgbImage) {
        if self.text.trim().is_empty() {
            return;
        }
        let size = Self::font_size(canvas.width(), canvas.height());
        let (text_w, text_h) = self.measure(size);
        let x = (canvas.width() as i32 - text_w as i32) / 2;
        let y = (canvas.height() as i32 - text_h as i32) / 2;
        debug!(size, text_w, text_h, x, y, "Drawing watermark");

        match &self.font {
            WatermarkFont::TrueType(font) => {
                // Second pass offset sideways thickens the strokes.
                let embolden = ((size / 40.0).round() as i32).max(1);
                draw_text_mut(canvas, WATERMARK_COLOR, x, y, size, font, &self.text);
                draw_text_mut(
                    canvas,
                    WATERMARK_COLOR,
                    x + embolden,
                    y,
                    size,
                    font,
                    &self.text,
                );
            }
            WatermarkFont::Builtin => draw_builtin(canvas, &self.text, size, x, y),
        }
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    FontVec::try_from_vec(data).ok()
}

/// Rough extent for any font: glyphs 0.6 of the size wide, one size tall.
pub fn approximate_extent(text: &str, size: f32) -> (u32, u32) {
    let chars = text.chars().count() as f32;
    ((chars * size * 0.6).round() as u32, size.round() as u32)
}

// -- Built-in block font ------------------------------------------------------

/// Side of one glyph module in pixels for a given font size.
fn module_size(size: f32) -> u32 {
    ((size / GLYPH_ROWS as f32).round() as u32).max(1)
}

fn builtin_extent(text: &str, size: f32) -> Option<(u32, u32)> {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return None;
    }
    let module = module_size(size);
    Some((
        (chars * GLYPH_ADVANCE - 1) * module,
        GLYPH_ROWS * module,
    ))
}

fn draw_builtin(canvas: &mut RgbImage, text: &str, size: f32, x: i32, y: i32) {
    let module = module_size(size);
    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else { continue };
        let glyph_x = x + (i as u32 * GLYPH_ADVANCE * module) as i32;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_COLS {
                if bits & (1 << (GLYPH_COLS - 1 - col)) == 0 {
                    continue;
                }
                let rect = Rect::at(
                    glyph_x + (col * module) as i32,
                    y + (row as u32 * module) as i32,
                )
                .of_size(module, module);
                draw_filled_rect_mut(canvas, rect, WATERMARK_COLOR);
            }
        }
    }
}

/// 5x7 bitmap for `ch`, one byte per row, most significant of five bits on
/// the left. Letters are case-insensitive; unknown characters draw nothing.
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_pixels(img: &RgbImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p == WATERMARK_COLOR)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn font_size_is_an_eighth_of_the_short_side() {
        assert_eq!(Watermark::font_size(2480, 3508), 310.0);
        assert_eq!(Watermark::font_size(3508, 2480), 310.0);
    }

    #[test]
    fn builtin_extent_counts_modules() {
        let mark = Watermark::builtin("DEMO");
        // size 70 -> 10 px modules; 4 glyphs * 6 - 1 gap = 23 modules wide
        assert_eq!(mark.measure(70.0), (230, 70));
    }

    #[test]
    fn builtin_watermark_is_centred_and_red() {
        let mut canvas = RgbImage::from_pixel(400, 560, Rgb([255, 255, 255]));
        Watermark::builtin("DEMO").apply(&mut canvas);

        let red = red_pixels(&canvas);
        assert!(!red.is_empty());
        let min_x = red.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = red.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = red.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = red.iter().map(|p| p.1).max().unwrap_or(0);
        // Bounding box centre sits on the canvas centre, within a module.
        let cx = (min_x + max_x) / 2;
        let cy = (min_y + max_y) / 2;
        assert!(cx.abs_diff(200) <= 8, "cx = {cx}");
        assert!(cy.abs_diff(280) <= 8, "cy = {cy}");
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn loaded_watermark_always_draws_something() {
        let mut canvas = RgbImage::from_pixel(300, 420, Rgb([255, 255, 255]));
        let mark = Watermark::load("DEMO", Some(Path::new("/nonexistent/font.ttf")));
        mark.apply(&mut canvas);
        assert!(
            canvas.pixels().any(|p| p.0[0] > 200 && p.0[1] < 100 && p.0[2] < 100),
            "no red pixels with {:?}",
            mark.font()
        );
    }

    #[test]
    fn blank_text_leaves_canvas_untouched() {
        let mut canvas = RgbImage::from_pixel(100, 100, Rgb([1, 2, 3]));
        Watermark::builtin("  ").apply(&mut canvas);
        assert!(canvas.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn unknown_characters_have_no_glyph() {
        assert!(glyph('d').is_some());
        assert!(glyph('?').is_none());
        assert_eq!(approximate_extent("DEMO", 100.0), (240, 100));
    }
}
