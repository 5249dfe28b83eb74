//! Drawing backend seam: a `Rasterizer` hands out canvases, a canvas records draw
//! calls and encodes them into a `RenderedImage`.

use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use crate::layout::measure::TextMeasurer;
use crate::layout::surface::DrawingSurface;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("slide has no drawable content: {0}")]
    EmptySlide(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
        }
    }
}

/// An encoded slide image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

impl RenderedImage {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A drawing surface that can be encoded once drawing is done.
pub trait Canvas: DrawingSurface + Send {
    fn as_surface(&mut self) -> &mut dyn DrawingSurface;

    fn finish(self: Box<Self>) -> Result<RenderedImage, RenderError>;
}

/// Creates canvases and the measurer that matches their glyph metrics.
pub trait Rasterizer: Send + Sync {
    fn format(&self) -> ImageFormat;

    fn measurer(&self) -> Arc<dyn TextMeasurer>;

    fn create_canvas(&self, width: u32, height: u32) -> Box<dyn Canvas>;
}
