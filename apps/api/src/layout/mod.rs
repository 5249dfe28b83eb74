//! Typographic layout engine.
//!
//! Turns marked-up slide text into positioned, styled line runs:
//! preprocess (`typography`) → tokenize (`tokenizer`) → wrap (`wrap`) →
//! position + underline (`plan`), with `fit` searching font sizes and `splitter`
//! dividing oversized bodies beforehand. Everything here is synchronous and
//! pixel-free; drawing goes through `surface::DrawingSurface`.

pub mod color;
pub mod fit;
pub mod font_cache;
pub mod font_metrics;
pub mod font_roles;
pub mod measure;
pub mod plan;
pub mod splitter;
pub mod surface;
pub mod tokenizer;
pub mod typography;
pub mod wrap;

use std::sync::Arc;

use crate::layout::color::ColorDecision;
use crate::layout::font_cache::{FontCache, FontHandle};
use crate::layout::font_metrics::FontWeight;
use crate::layout::font_roles::FontRoleConfig;
use crate::layout::measure::{measure_or_estimate, TextMeasurer};
use crate::layout::plan::{build_plan, PlanOrigin, RenderPlan};
use crate::layout::tokenizer::tokenize;
use crate::layout::typography::preprocess;
use crate::layout::wrap::{wrap_runs, Line, LineFonts};

/// One layout engine per renderer: owns the font cache and the measurer.
pub struct LayoutEngine {
    cache: FontCache,
    measurer: Arc<dyn TextMeasurer>,
}

impl LayoutEngine {
    pub fn new(measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            cache: FontCache::new(),
            measurer,
        }
    }

    pub fn font(&self, weight: FontWeight, size_px: u32) -> FontHandle {
        self.cache.font(weight, size_px)
    }

    /// Faces for a role at `size_px`: the role weight for plain runs, bold for bold runs.
    pub fn fonts_for(&self, config: &FontRoleConfig, size_px: u32) -> LineFonts {
        LineFonts::with_base_weight(&self.cache, size_px, config.weight)
    }

    pub fn measure(&self, text: &str, font: &FontHandle) -> f32 {
        measure_or_estimate(self.measurer.as_ref(), text, font)
    }

    /// Preprocesses, tokenizes and wraps one block of text.
    pub fn wrap_text(&self, text: &str, max_width: f32, fonts: &LineFonts) -> Vec<Line> {
        let runs = tokenize(&preprocess(text));
        wrap_runs(&runs, max_width, self.measurer.as_ref(), fonts)
    }

    /// Number of lines `text` wraps to for a role at `size_px`.
    pub fn line_count(&self, text: &str, max_width: f32, config: &FontRoleConfig, size_px: u32) -> usize {
        self.wrap_text(text, max_width, &self.fonts_for(config, size_px))
            .len()
    }

    /// Full pipeline for one block: wrapped, positioned and colored.
    pub fn layout_block(
        &self,
        text: &str,
        origin: PlanOrigin,
        max_width: f32,
        config: &FontRoleConfig,
        colors: &ColorDecision,
    ) -> RenderPlan {
        let fonts = self.fonts_for(config, config.size_px);
        let lines = self.wrap_text(text, max_width, &fonts);
        build_plan(&lines, origin, &fonts, config.line_height(), colors)
    }
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::color::SlideStyle;
    use crate::layout::font_roles::FontRole;
    use crate::layout::measure::MetricTableMeasurer;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(Arc::new(MetricTableMeasurer))
    }

    #[test]
    fn test_layout_block_end_to_end() {
        let engine = engine();
        let config = FontRole::Body.config();
        let colors = ColorDecision::resolve("#6366F1", SlideStyle::Default, false);
        let plan = engine.layout_block(
            "Мы **растём** и __учимся__ каждый день",
            PlanOrigin::new(144.0, 420.0),
            1312.0,
            &config,
            &colors,
        );

        assert_eq!(plan.line_count, 1);
        assert_eq!(plan.height, 90.0);
        assert_eq!(plan.underlines.len(), 1);
        assert!(plan.texts.iter().all(|t| t.y == 420.0));
    }

    #[test]
    fn test_bold_role_draws_plain_runs_bold() {
        let engine = engine();
        let config = FontRole::TitleOnly.config();
        let fonts = engine.fonts_for(&config, 136);
        assert_eq!(fonts.regular.weight(), FontWeight::Bold);
    }

    #[test]
    fn test_line_count_grows_as_width_shrinks() {
        let engine = engine();
        let config = FontRole::Body.config();
        let text = "Каждое утро начинается с плана на день и списка задач";
        let wide = engine.line_count(text, 1312.0, &config, 64);
        let narrow = engine.line_count(text, 400.0, &config, 64);
        assert!(narrow > wide);
    }

    #[test]
    fn test_font_cache_is_shared_across_calls() {
        let engine = engine();
        let config = FontRole::Body.config();
        engine.line_count("a b", 100.0, &config, 64);
        engine.line_count("c d", 100.0, &config, 64);
        assert_eq!(engine.cache.len(), 2);
    }
}
