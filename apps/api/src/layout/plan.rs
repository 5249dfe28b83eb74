//! Render Plan Builder: Absolute positions, run colors and merged underline spans.
//!
//! A plan is built once per text block from wrapped lines and replayed onto a
//! `DrawingSurface`. Text is drawn first and underlines on top, so strokes are
//! never covered by a neighbouring glyph run. Adjacent runs sharing font and
//! color are drawn as one text call.
//!
//! # Underline spans
//! Consecutive underlined runs of the same color on one line share one stroke.
//! A color change or a run without underline closes the open span; any open span
//! closes at line end. Inter-word spaces are only covered when they are underlined
//! themselves (`__two words__`), never when they sit between two underlined blocks.

use crate::layout::color::{ColorDecision, Rgb};
use crate::layout::font_cache::FontHandle;
use crate::layout::surface::DrawingSurface;
use crate::layout::tokenizer::RunStyle;
use crate::layout::typography::NBSP;
use crate::layout::wrap::{Line, LineFonts};

/// Underline offset below the baseline, in em.
const UNDERLINE_OFFSET_EM: f32 = 0.15;
/// Fixed lift applied after the em offset, in pixels.
const UNDERLINE_LIFT_PX: f32 = 2.0;
const UNDERLINE_THICKNESS_EM: f32 = 0.045;
const MIN_UNDERLINE_THICKNESS_PX: f32 = 3.0;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Where the first baseline of a block starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanOrigin {
    pub x: f32,
    pub baseline_y: f32,
}

impl PlanOrigin {
    pub fn new(x: f32, baseline_y: f32) -> Self {
        Self { x, baseline_y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font: FontHandle,
    pub color: Rgb,
}

/// One continuous underline stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnderlineSpan {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub color: Rgb,
    pub thickness: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderPlan {
    pub texts: Vec<PlacedText>,
    pub underlines: Vec<UnderlineSpan>,
    pub line_count: usize,
    pub line_height: f32,
    /// Always `line_count × line_height`.
    pub height: f32,
}

impl RenderPlan {
    pub fn draw(&self, surface: &mut dyn DrawingSurface) {
        self.draw_with_opacity(surface, 1.0);
    }

    pub fn draw_with_opacity(&self, surface: &mut dyn DrawingSurface, opacity: f32) {
        for t in &self.texts {
            surface.draw_text(&t.text, t.x, t.y, &t.font, t.color, opacity);
        }
        for span in &self.underlines {
            surface.stroke_line(span.x1, span.y, span.x2, span.y, span.color, span.thickness);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Bold + underlined runs take the accent color, except on accent slides where
/// the background already is the brand color.
pub fn run_color(style: RunStyle, colors: &ColorDecision) -> Rgb {
    if style.is_bold() && style.is_underline() && !colors.is_accent_slide {
        colors.accent_text
    } else {
        colors.base_text
    }
}

pub fn underline_thickness(size_px: u32) -> f32 {
    (size_px as f32 * UNDERLINE_THICKNESS_EM)
        .round()
        .max(MIN_UNDERLINE_THICKNESS_PX)
}

pub fn underline_y(baseline_y: f32, size_px: u32) -> f32 {
    baseline_y + size_px as f32 * UNDERLINE_OFFSET_EM - UNDERLINE_LIFT_PX
}

/// Positions every run of `lines` starting at `origin`, one `line_height` apart.
pub fn build_plan(
    lines: &[Line],
    origin: PlanOrigin,
    fonts: &LineFonts,
    line_height: f32,
    colors: &ColorDecision,
) -> RenderPlan {
    let size_px = fonts.size_px();
    let thickness = underline_thickness(size_px);
    let mut texts = Vec::new();
    let mut underlines = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let baseline = origin.baseline_y + i as f32 * line_height;
        let stroke_y = underline_y(baseline, size_px);
        let mut cursor = origin.x;
        let mut open: Option<UnderlineSpan> = None;
        let mut current: Option<PlacedText> = None;

        for run in &line.runs {
            let color = run_color(run.style, colors);
            let font = fonts.for_style(run.style);
            let text = run.text.replace(NBSP, " ");

            // Spaces and same-font, same-color runs extend the current text.
            match current.as_mut() {
                Some(t) if run.is_space || (t.font == *font && t.color == color) => {
                    t.text.push_str(&text)
                }
                _ => {
                    texts.extend(current.take());
                    current = Some(PlacedText {
                        text,
                        x: cursor,
                        y: baseline,
                        font: font.clone(),
                        color,
                    });
                }
            }

            if run.style.is_underline() {
                match open.as_mut() {
                    Some(span) if span.color == color => span.x2 = cursor + run.width,
                    _ => {
                        underlines.extend(open.take());
                        open = Some(UnderlineSpan {
                            x1: cursor,
                            x2: cursor + run.width,
                            y: stroke_y,
                            color,
                            thickness,
                        });
                    }
                }
            } else {
                underlines.extend(open.take());
            }

            cursor += run.width;
        }
        texts.extend(current.take());
        underlines.extend(open.take());
    }

    RenderPlan {
        texts,
        underlines,
        line_count: lines.len(),
        line_height,
        height: lines.len() as f32 * line_height,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
