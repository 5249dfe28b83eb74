//! Decoration shapes: seeded organic blobs behind intro and quote slides.
//!
//! A blob is `edges` points spread evenly around the centre of a `size`×`size`
//! box, each at a radius jittered by a multiply-with-carry generator, joined by
//! quadratic curves through the midpoints between neighbours. The box is then
//! scaled to `DECORATION_SIZE` and centred on a canvas corner.
//!
//! The same seed always yields the same outline.

use crate::layout::color::{Rgb, SlideStyle};
use crate::layout::surface::{DrawingSurface, PathCommand};
use crate::render::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH, DECORATION_SIZE};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Blob parameters in the shape's own coordinate box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternConfig {
    pub size: f64,
    /// Radius jitter, in tenths of the base radius.
    pub growth: f64,
    pub edges: usize,
}

impl PatternConfig {
    pub fn for_style(style: SlideStyle) -> Self {
        let (growth, edges) = match style {
            SlideStyle::Default => (3.0, 18),
            SlideStyle::Bright => (7.0, 14),
            SlideStyle::Elegant => (5.0, 17),
        };
        Self {
            size: 480.0,
            growth,
            edges,
        }
    }
}

/// Which corner a shape is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSlot {
    TopRight,
    BottomLeft,
}

impl ShapeSlot {
    /// Canvas position of the shape box's top-left corner.
    fn origin(self) -> (f32, f32) {
        let half = DECORATION_SIZE / 2.0;
        match self {
            ShapeSlot::TopRight => (CANVAS_WIDTH as f32 - half, -half),
            ShapeSlot::BottomLeft => (-half, CANVAS_HEIGHT as f32 - half),
        }
    }

    /// Fill opacity of the shape for a style.
    pub fn opacity(self, style: SlideStyle) -> f32 {
        match (self, style) {
            (ShapeSlot::TopRight, SlideStyle::Default) => 0.1,
            (ShapeSlot::TopRight, SlideStyle::Bright) => 0.15,
            (ShapeSlot::TopRight, SlideStyle::Elegant) => 0.08,
            (ShapeSlot::BottomLeft, SlideStyle::Bright) => 0.08,
            (ShapeSlot::BottomLeft, _) => 0.05,
        }
    }
}

/// Multiply-with-carry generator yielding values in `0.0..1.0`.
#[derive(Debug, Clone)]
struct SeededRandom {
    m_w: u32,
    m_z: u32,
}

impl SeededRandom {
    fn new(seed: u32) -> Self {
        Self {
            m_w: 123_456_789u32.wrapping_add(seed),
            m_z: 987_654_321u32.wrapping_sub(seed),
        }
    }

    fn next_f64(&mut self) -> f64 {
        self.m_z = 36969u32
            .wrapping_mul(self.m_z & 0xffff)
            .wrapping_add(self.m_z >> 16);
        self.m_w = 18000u32
            .wrapping_mul(self.m_w & 0xffff)
            .wrapping_add(self.m_w >> 16);
        let value = (self.m_z << 16).wrapping_add(self.m_w & 0xffff);
        value as f64 / 4_294_967_296.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Outline points in the config's box, rounded to whole units.
pub fn blob_points(config: &PatternConfig, seed: u32) -> Vec<(f64, f64)> {
    let radius = config.size / 2.0;
    let center = config.size / 2.0;
    let step = 360.0 / config.edges.max(1) as f64;
    let mut rng = SeededRandom::new(seed);

    (0..config.edges)
        .map(|i| {
            let r = jittered_radius(&mut rng, config.growth, radius);
            let angle = (i as f64 * step).to_radians();
            (
                (center + r * angle.cos()).round(),
                (center + r * angle.sin()).round(),
            )
        })
        .collect()
}

/// Closed quadratic outline through the midpoints of consecutive points,
/// scaled by `scale` and moved to `origin`. Fewer than 3 points give an empty path.
pub fn smooth_path(points: &[(f64, f64)], origin: (f32, f32), scale: f32) -> Vec<PathCommand> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let to_canvas = |(x, y): (f64, f64)| (origin.0 + x as f32 * scale, origin.1 + y as f32 * scale);
    let mid = |a: (f64, f64), b: (f64, f64)| ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);

    let (x, y) = to_canvas(mid(points[0], points[1]));
    let mut path = Vec::with_capacity(n + 2);
    path.push(PathCommand::MoveTo { x, y });

    for i in 0..n {
        let control = points[(i + 1) % n];
        let end = mid(control, points[(i + 2) % n]);
        let (cx, cy) = to_canvas(control);
        let (x, y) = to_canvas(end);
        path.push(PathCommand::QuadTo { cx, cy, x, y });
    }
    path.push(PathCommand::Close);
    path
}

/// Shape slots a style decorates: the top-right blob always, the bottom-left
/// one for `bright` only.
pub fn slots_for(style: SlideStyle) -> &'static [ShapeSlot] {
    match style {
        SlideStyle::Bright => &[ShapeSlot::TopRight, ShapeSlot::BottomLeft],
        _ => &[ShapeSlot::TopRight],
    }
}

/// Draws the style's decoration shapes in `color`. Slot `i` uses `seed + i`.
pub fn draw_decorations(style: SlideStyle, seed: u32, color: Rgb, surface: &mut dyn DrawingSurface) {
    let config = PatternConfig::for_style(style);
    let scale = DECORATION_SIZE / config.size as f32;

    for (i, slot) in slots_for(style).iter().enumerate() {
        let points = blob_points(&config, seed.wrapping_add(i as u32));
        let path = smooth_path(&points, slot.origin(), scale);
        surface.fill_path(&path, color, slot.opacity(style));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Radius of one outline point: the jitter folded back below the base radius.
fn jittered_radius(rng: &mut SeededRandom, growth: f64, base: f64) -> f64 {
    let variation = growth * (base / 10.0);
    let r = base + rng.next_f64() * variation;
    if r > base {
        r - base
    } else if r < base {
        r + base
    } else {
        r
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
