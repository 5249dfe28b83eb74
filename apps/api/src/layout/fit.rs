//! Adaptive Fit Controller: Shrinks a text role until it fits its box.
//!
//! # Search
//! Linear, descending: start at the role's base size and step down until
//! `line_count × line_height <= max_height`. Font size changes line breaks, so the
//! caller supplies a line-count function evaluated at each candidate size.
//!
//! Running out of sizes is not an error: the minimum size is returned with
//! `overflow = true` and the caller decides what to do (the composer still draws
//! the block and reports the slide as adapted).

use serde::Serialize;
use tracing::debug;

use crate::layout::font_roles::{line_height_for, FontRoleConfig};

/// Size decrement used when a role does not specify one.
pub const DEFAULT_FIT_STEP_PX: u32 = 4;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub base_size_px: u32,
    pub min_size_px: u32,
    /// A step of 0 is treated as 1.
    pub step_px: u32,
    pub max_height: f32,
    pub line_height_ratio: f32,
}

impl FitParams {
    /// Fit parameters for a role; roles without a minimum never shrink.
    pub fn for_role(config: &FontRoleConfig, max_height: f32) -> Self {
        Self {
            base_size_px: config.size_px,
            min_size_px: config.min_size_px.unwrap_or(config.size_px),
            step_px: DEFAULT_FIT_STEP_PX,
            max_height,
            line_height_ratio: config.line_height_ratio,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitOutcome {
    pub size_px: u32,
    pub line_count: usize,
    pub line_height: f32,
    /// True when even the minimum size does not fit.
    pub overflow: bool,
}

impl FitOutcome {
    pub fn height(&self) -> f32 {
        self.line_count as f32 * self.line_height
    }

    /// True when the block had to be shrunk or still overflows.
    pub fn was_adapted(&self, base_size_px: u32) -> bool {
        self.overflow || self.size_px < base_size_px
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Returns the largest candidate size whose wrapped height fits `max_height`.
///
/// Candidates are `base, base - step, …` down to the minimum, which is always tried.
pub fn fit_font_size(params: &FitParams, mut line_count: impl FnMut(u32) -> usize) -> FitOutcome {
    let step = params.step_px.max(1);
    let min = params.min_size_px.min(params.base_size_px);
    let mut size = params.base_size_px;

    loop {
        let lines = line_count(size);
        let line_height = line_height_for(size, params.line_height_ratio);
        let fits = lines as f32 * line_height <= params.max_height;

        if fits || size <= min {
            if !fits {
                debug!(
                    size_px = size,
                    lines,
                    max_height = params.max_height,
                    "Content overflows at minimum font size"
                );
            }
            return FitOutcome {
                size_px: size,
                line_count: lines,
                line_height,
                overflow: !fits,
            };
        }

        size = size.saturating_sub(step).max(min);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
