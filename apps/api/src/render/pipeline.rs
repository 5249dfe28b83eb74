//! Carousel Pipeline: Renders every slide of a deck on the blocking pool.
//!
//! # spawn_blocking pattern
//! Layout and encoding are CPU-bound, so each slide runs in its own
//! `tokio::task::spawn_blocking` task. All tasks are spawned up front; the join
//! handles are then awaited in input order, which keeps output order identical to
//! input order regardless of completion order. Tasks take owned `Arc`s to satisfy
//! the `'static` bound.
//!
//! A slide whose render fails or panics is replaced by a placeholder image and
//! reported in `failed_slides`; the rest of the deck is unaffected. If the
//! placeholder itself cannot be encoded the slot holds an empty image, so
//! `images` always has one entry per input slide.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::content::model::SlideContent;
use crate::layout::color::{Rgb, DARK_TEXT};
use crate::layout::font_roles::FontRole;
use crate::layout::surface::EmbeddedImage;
use crate::layout::LayoutEngine;
use crate::render::backend::{ImageFormat, Rasterizer, RenderError, RenderedImage};
use crate::render::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH, CONTENT_START_Y, PADDING};
use crate::render::slide::{ComposeReport, SlideComposer, SlideContext, SlideTheme};

const PLACEHOLDER_BACKGROUND: Rgb = Rgb::new(0xf3, 0xf4, 0xf6);

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Result of rendering a whole deck. Indices are zero-based slide positions.
#[derive(Debug, Clone)]
pub struct CarouselOutput {
    pub images: Vec<RenderedImage>,
    pub adapted_slides: Vec<usize>,
    pub failed_slides: Vec<usize>,
}

/// A rasterizer paired with the layout engine that measures for it.
pub struct SlideRenderer {
    rasterizer: Arc<dyn Rasterizer>,
    engine: LayoutEngine,
}

impl SlideRenderer {
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        let engine = LayoutEngine::new(rasterizer.measurer());
        Self { rasterizer, engine }
    }

    pub fn format(&self) -> ImageFormat {
        self.rasterizer.format()
    }

    /// Renders one slide synchronously.
    pub fn render_slide(
        &self,
        slide: &SlideContent,
        ctx: &SlideContext<'_>,
    ) -> Result<(RenderedImage, ComposeReport), RenderError> {
        let mut canvas = self.rasterizer.create_canvas(CANVAS_WIDTH, CANVAS_HEIGHT);
        let report = SlideComposer::new(&self.engine).compose(slide, ctx, canvas.as_surface());
        let image = canvas.finish()?;
        Ok((image, report))
    }

    /// Neutral stand-in for a slide that failed to render.
    pub fn placeholder(&self, index: usize, total: usize) -> RenderedImage {
        let mut canvas = self.rasterizer.create_canvas(CANVAS_WIDTH, CANVAS_HEIGHT);
        let cfg = FontRole::HeaderFooter.config();
        let font = self.engine.font(cfg.weight, cfg.size_px);
        let surface = canvas.as_surface();
        surface.fill_background(PLACEHOLDER_BACKGROUND);
        surface.draw_text(
            &format!("Слайд {}/{} не удалось отрисовать", index + 1, total),
            PADDING,
            CONTENT_START_Y,
            &font,
            DARK_TEXT,
            1.0,
        );

        canvas.finish().unwrap_or_else(|e| {
            error!(slide = index + 1, error = %e, "Placeholder render failed, returning empty image");
            RenderedImage {
                format: self.rasterizer.format(),
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
                data: bytes::Bytes::new(),
            }
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Public entry point
// ────────────────────────────────────────────────────────────────────────────

/// Renders all slides in parallel and returns images in input order.
pub async fn render_carousel(
    renderer: Arc<SlideRenderer>,
    slides: Arc<Vec<SlideContent>>,
    theme: Arc<SlideTheme>,
    avatar: Option<Arc<EmbeddedImage>>,
) -> CarouselOutput {
    let total = slides.len();

    let handles: Vec<_> = (0..total)
        .map(|index| {
            let renderer = Arc::clone(&renderer);
            let slides = Arc::clone(&slides);
            let theme = Arc::clone(&theme);
            let avatar = avatar.clone();
            tokio::task::spawn_blocking(move || {
                let ctx = SlideContext {
                    index,
                    total,
                    theme: &theme,
                    avatar: avatar.as_deref(),
                };
                renderer.render_slide(&slides[index], &ctx)
            })
        })
        .collect();

    let mut images = Vec::with_capacity(total);
    let mut adapted_slides = Vec::new();
    let mut failed_slides = Vec::new();

    for (index, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok((image, report))) => {
                if report.adapted {
                    adapted_slides.push(index);
                }
                if report.overflow {
                    warn!(slide = index + 1, "Slide content overflows at minimum font size");
                }
                images.push(image);
            }
            Ok(Err(e)) => {
                warn!(slide = index + 1, error = %e, "Slide render failed, using placeholder");
                failed_slides.push(index);
                images.push(renderer.placeholder(index, total));
            }
            Err(e) => {
                error!(slide = index + 1, error = %e, "Slide render task panicked, using placeholder");
                failed_slides.push(index);
                images.push(renderer.placeholder(index, total));
            }
        }
    }

    info!(
        total,
        adapted = adapted_slides.len(),
        failed = failed_slides.len(),
        "Carousel rendered"
    );

    CarouselOutput {
        images,
        adapted_slides,
        failed_slides,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
