//! Drawing primitives consumed by render plans and the slide composer.
//!
//! A surface only records or rasterizes what it is told; all positioning is
//! decided by the layout engine beforehand. Coordinates are canvas pixels, `y` is
//! the alphabetic baseline for text.

use bytes::Bytes;

use crate::layout::color::Rgb;
use crate::layout::font_cache::FontHandle;

/// An encoded image to place on a surface (the author avatar).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub mime: String,
    pub data: Bytes,
}

impl EmbeddedImage {
    pub fn new(mime: impl Into<String>, data: Bytes) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }
}

/// One segment of a filled outline, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f32, y: f32 },
    /// Quadratic Bézier to (x, y) with control point (cx, cy).
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    Close,
}

pub trait DrawingSurface {
    /// Fills the whole canvas.
    fn fill_background(&mut self, color: Rgb);

    /// Draws left-aligned text with its baseline at `y`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &FontHandle, color: Rgb, opacity: f32);

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, thickness: f32);

    /// Draws `image` clipped to a circle of diameter `size` with its top-left corner at (x, y).
    fn draw_image(&mut self, image: &EmbeddedImage, x: f32, y: f32, size: f32);

    /// Fills a closed outline. An empty path draws nothing.
    fn fill_path(&mut self, path: &[PathCommand], color: Rgb, opacity: f32);
}
