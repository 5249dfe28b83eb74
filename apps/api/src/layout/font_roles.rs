//! Static typography table: one entry per text role on a slide.

use crate::layout::font_metrics::FontWeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    IntroTitle,
    IntroSubtitle,
    /// Title of a text slide that also has a body.
    TitleWithContent,
    /// Title of a text slide with no body.
    TitleOnly,
    Body,
    QuoteLarge,
    QuoteMedium,
    QuoteSmall,
    HeaderFooter,
}

/// Typography for one role. Sizes are in pixels on the 1600×2000 canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRoleConfig {
    pub size_px: u32,
    pub weight: FontWeight,
    pub line_height_ratio: f32,
    /// Smallest size the fit controller may shrink this role to.
    pub min_size_px: Option<u32>,
}

impl FontRoleConfig {
    /// Line height at the base size.
    pub fn line_height(&self) -> f32 {
        line_height_for(self.size_px, self.line_height_ratio)
    }

    /// Copy of this config at another size, keeping weight and ratio.
    pub fn at_size(&self, size_px: u32) -> Self {
        Self { size_px, ..*self }
    }
}

/// Rounded line height in pixels for a size and ratio.
pub fn line_height_for(size_px: u32, ratio: f32) -> f32 {
    (size_px as f32 * ratio).round()
}

impl FontRole {
    pub fn config(self) -> FontRoleConfig {
        use FontWeight::{Bold, Normal};
        let (size_px, weight, line_height_ratio, min_size_px) = match self {
            FontRole::IntroTitle => (128, Bold, 1.1, Some(80)),
            FontRole::IntroSubtitle => (64, Normal, 1.25, Some(44)),
            FontRole::TitleWithContent => (96, Bold, 1.2, Some(64)),
            FontRole::TitleOnly => (136, Bold, 1.2, Some(80)),
            FontRole::Body => (64, Normal, 1.4, Some(40)),
            FontRole::QuoteLarge => (96, Bold, 1.2, Some(56)),
            FontRole::QuoteMedium => (80, Bold, 1.25, Some(52)),
            FontRole::QuoteSmall => (64, Bold, 1.3, Some(44)),
            FontRole::HeaderFooter => (48, Normal, 1.4, None),
        };
        FontRoleConfig {
            size_px,
            weight,
            line_height_ratio,
            min_size_px,
        }
    }
}
