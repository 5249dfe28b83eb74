//! SVG drawing backend.
//!
//! Records draw calls as SVG elements and measures text with the static Arial
//! advance tables, so layout and output agree on every width. Text is emitted with
//! `xml:space="preserve"` so joiner spaces inside runs survive.

use std::fmt::Write;
use std::sync::Arc;

use base64::Engine;
use bytes::Bytes;

use crate::layout::color::Rgb;
use crate::layout::font_cache::{FontHandle, FONT_FAMILY};
use crate::layout::measure::{MetricTableMeasurer, TextMeasurer};
use crate::layout::surface::{DrawingSurface, EmbeddedImage, PathCommand};
use crate::render::backend::{Canvas, ImageFormat, Rasterizer, RenderError, RenderedImage};

#[derive(Debug, Clone, Default)]
pub struct SvgRasterizer;

impl SvgRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for SvgRasterizer {
    fn format(&self) -> ImageFormat {
        ImageFormat::Svg
    }

    fn measurer(&self) -> Arc<dyn TextMeasurer> {
        Arc::new(MetricTableMeasurer)
    }

    fn create_canvas(&self, width: u32, height: u32) -> Box<dyn Canvas> {
        Box::new(SvgCanvas::new(width, height))
    }
}

/// One SVG document under construction.
#[derive(Debug)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    body: String,
    clip_count: usize,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            clip_count: 0,
        }
    }

    fn document(&self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 256);
        svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        svg.push('\n');
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        svg.push('\n');
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}

impl DrawingSurface for SvgCanvas {
    fn fill_background(&mut self, color: Rgb) {
        let _ = writeln!(
            self.body,
            r#"  <rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            self.width,
            self.height,
            color.to_hex()
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, font: &FontHandle, color: Rgb, opacity: f32) {
        self.body.push_str("  <text x=\"");
        push_num(&mut self.body, x);
        self.body.push_str("\" y=\"");
        push_num(&mut self.body, y);
        let _ = write!(
            self.body,
            r#"" font-family="{}" font-size="{}" font-weight="{}" fill="{}""#,
            FONT_FAMILY,
            font.size_px(),
            font.weight().as_css(),
            color.to_hex()
        );
        if opacity < 1.0 {
            self.body.push_str(" fill-opacity=\"");
            push_num(&mut self.body, opacity);
            self.body.push('"');
        }
        self.body.push_str(r#" xml:space="preserve">"#);
        escape_xml_into(&mut self.body, text);
        self.body.push_str("</text>\n");
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, color: Rgb, thickness: f32) {
        self.body.push_str("  <line x1=\"");
        push_num(&mut self.body, x1);
        self.body.push_str("\" y1=\"");
        push_num(&mut self.body, y1);
        self.body.push_str("\" x2=\"");
        push_num(&mut self.body, x2);
        self.body.push_str("\" y2=\"");
        push_num(&mut self.body, y2);
        let _ = write!(self.body, r#"" stroke="{}" stroke-width=""#, color.to_hex());
        push_num(&mut self.body, thickness);
        self.body.push_str("\"/>\n");
    }

    fn draw_image(&mut self, image: &EmbeddedImage, x: f32, y: f32, size: f32) {
        self.clip_count += 1;
        let id = format!("avatar-clip-{}", self.clip_count);
        let radius = size / 2.0;

        let _ = write!(self.body, r#"  <clipPath id="{id}"><circle cx=""#);
        push_num(&mut self.body, x + radius);
        self.body.push_str("\" cy=\"");
        push_num(&mut self.body, y + radius);
        self.body.push_str("\" r=\"");
        push_num(&mut self.body, radius);
        self.body.push_str("\"/></clipPath>\n");

        self.body.push_str("  <image x=\"");
        push_num(&mut self.body, x);
        self.body.push_str("\" y=\"");
        push_num(&mut self.body, y);
        self.body.push_str("\" width=\"");
        push_num(&mut self.body, size);
        self.body.push_str("\" height=\"");
        push_num(&mut self.body, size);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.data);
        let _ = writeln!(
            self.body,
            r#"" preserveAspectRatio="xMidYMid slice" clip-path="url(#{id})" href="data:{};base64,{}"/>"#,
            image.mime, encoded
        );
    }

    fn fill_path(&mut self, path: &[PathCommand], color: Rgb, opacity: f32) {
        if path.is_empty() {
            return;
        }
        self.body.push_str("  <path d=\"");
        for command in path {
            match *command {
                PathCommand::MoveTo { x, y } => {
                    self.body.push('M');
                    push_point(&mut self.body, x, y);
                }
                PathCommand::QuadTo { cx, cy, x, y } => {
                    self.body.push('Q');
                    push_point(&mut self.body, cx, cy);
                    self.body.push(' ');
                    push_point(&mut self.body, x, y);
                }
                PathCommand::Close => self.body.push('Z'),
            }
        }
        let _ = write!(self.body, r#"" fill="{}""#, color.to_hex());
        if opacity < 1.0 {
            self.body.push_str(" fill-opacity=\"");
            push_num(&mut self.body, opacity);
            self.body.push('"');
        }
        self.body.push_str("/>\n");
    }
}

impl Canvas for SvgCanvas {
    fn as_surface(&mut self) -> &mut dyn DrawingSurface {
        self
    }

    fn finish(self: Box<Self>) -> Result<RenderedImage, RenderError> {
        if self.body.is_empty() {
            return Err(RenderError::EmptySlide("no draw calls recorded".to_string()));
        }
        Ok(RenderedImage {
            format: ImageFormat::Svg,
            width: self.width,
            height: self.height,
            data: Bytes::from(self.document()),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Writes a coordinate with at most two decimals and no trailing zeros.
fn push_num(buf: &mut String, n: f32) {
    if n.fract() == 0.0 && n.abs() < 1e9 {
        let _ = write!(buf, "{}", n as i64);
        return;
    }
    let formatted = format!("{:.2}", n);
    buf.push_str(formatted.trim_end_matches('0').trim_end_matches('.'));
}

fn push_point(buf: &mut String, x: f32, y: f32) {
    push_num(buf, x);
    buf.push(',');
    push_num(buf, y);
}

/// Escapes markup characters and drops code points XML 1.0 does not allow.
fn escape_xml_into(buf: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '\t' | '\n' | '\r' => buf.push(ch),
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => {}
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&apos;"),
            _ => buf.push(ch),
        }
    }
}
