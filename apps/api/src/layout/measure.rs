//! Text measurement seam between the layout engine and a drawing backend.
//!
//! The engine never measures glyphs itself: it asks a `TextMeasurer`. Backends
//! with real font rasterizers implement it from their glyph metrics; the static
//! table measurer below serves the SVG backend and tests.

use thiserror::Error;
use tracing::warn;

use crate::layout::font_cache::FontHandle;
use crate::layout::font_metrics::{get_metrics, FontWeight};

/// Per-character width used when a measurement fails, in em units.
const FALLBACK_EM_NORMAL: f32 = 0.55;
const FALLBACK_EM_BOLD: f32 = 0.60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    #[error("glyph {0:?} is not supported by the font")]
    UnsupportedGlyph(char),
}

/// Measures the advance width of a text string in pixels.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, font: &FontHandle) -> Result<f32, MeasureError>;
}

/// Measures `text`, substituting a character-count-proportional estimate on failure.
pub fn measure_or_estimate(measurer: &dyn TextMeasurer, text: &str, font: &FontHandle) -> f32 {
    match measurer.measure(text, font) {
        Ok(width) => width,
        Err(e) => {
            let estimate = estimate_width(text, font);
            warn!(
                error = %e,
                font = %font.descriptor(),
                estimate,
                "Text measurement failed, using proportional estimate"
            );
            estimate
        }
    }
}

/// Character-count-proportional width estimate in pixels.
pub fn estimate_width(text: &str, font: &FontHandle) -> f32 {
    let em = match font.weight() {
        FontWeight::Normal => FALLBACK_EM_NORMAL,
        FontWeight::Bold => FALLBACK_EM_BOLD,
    };
    text.chars().count() as f32 * em * font.size_px() as f32
}

/// `TextMeasurer` backed by the static Arial advance tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricTableMeasurer;

impl TextMeasurer for MetricTableMeasurer {
    fn measure(&self, text: &str, font: &FontHandle) -> Result<f32, MeasureError> {
        let em = get_metrics(font.weight()).measure_str(text)?;
        Ok(em * font.size_px() as f32)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_cache::FontCache;

    #[test]
    fn test_metric_measurer_scales_with_size() {
        let cache = FontCache::new();
        let small = cache.font(FontWeight::Normal, 32);
        let large = cache.font(FontWeight::Normal, 64);
        let m = MetricTableMeasurer;
        let ws = m.measure("Slide", &small).unwrap();
        let wl = m.measure("Slide", &large).unwrap();
        assert!((wl - 2.0 * ws).abs() < 1e-3);
    }

    #[test]
    fn test_failed_measurement_uses_estimate() {
        let cache = FontCache::new();
        let font = cache.font(FontWeight::Bold, 10);
        let width = measure_or_estimate(&MetricTableMeasurer, "ab漢", &font);
        assert!((width - 3.0 * FALLBACK_EM_BOLD * 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_successful_measurement_is_passed_through() {
        let cache = FontCache::new();
        let font = cache.font(FontWeight::Normal, 100);
        let width = measure_or_estimate(&MetricTableMeasurer, " ", &font);
        assert!((width - 27.8).abs() < 1e-3);
    }
}
