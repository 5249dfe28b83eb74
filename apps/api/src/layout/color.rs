//! Color Contrast Policy: Picks text and accent colors for a slide background.
//!
//! Luminance follows the WCAG relative-luminance definition: each sRGB channel is
//! linearized with the piecewise gamma curve, then weighted 0.2126 / 0.7152 / 0.0722.
//! Parsing is fallible (`ColorError`). A user-supplied color that is drawn as a
//! background goes through `color_policy`, which substitutes the dark-text default
//! for malformed input. A malformed brand color is replaced by `DEFAULT_BRAND`
//! wherever a background or accent must still be painted.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Constants
// ────────────────────────────────────────────────────────────────────────────

pub const DARK_TEXT: Rgb = Rgb::new(0x00, 0x00, 0x00);
pub const LIGHT_TEXT: Rgb = Rgb::new(0xff, 0xff, 0xff);
/// Accent used for callouts on dark backgrounds, where the brand color may vanish.
pub const LIGHT_ACCENT_FALLBACK: Rgb = Rgb::new(0x87, 0xce, 0xeb);
pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(0xff, 0xff, 0xff);
pub const ELEGANT_BACKGROUND: Rgb = Rgb::new(0x1a, 0x1a, 0x1a);
pub const DEFAULT_BRAND: Rgb = Rgb::new(0x63, 0x66, 0xf1);

/// Above this luminance a background counts as light and takes dark text.
const LIGHT_BACKGROUND_THRESHOLD: f64 = 0.5;
/// HSL lightness added to the brand color for the `bright` style background.
const BRIGHT_TINT_AMOUNT: f64 = 25.0;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color '{0}' is not a #rgb or #rrggbb hex value")]
    InvalidFormat(String),

    #[error("color '{0}' contains non-hex digits")]
    InvalidDigit(String),
}

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`, `rrggbb`, `#rgb` or `rgb` (case-insensitive).
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if !hex.is_ascii() {
            return Err(ColorError::InvalidDigit(input.to_string()));
        }

        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(ColorError::InvalidFormat(input.to_string())),
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidDigit(input.to_string()))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(self) -> f64 {
        0.2126 * linearize(self.r) + 0.7152 * linearize(self.g) + 0.0722 * linearize(self.b)
    }

    pub fn is_light(self) -> bool {
        self.relative_luminance() > LIGHT_BACKGROUND_THRESHOLD
    }

    /// Returns the color with HSL lightness raised by `amount` percentage points.
    pub fn lighten(self, amount: f64) -> Self {
        let (h, s, l) = rgb_to_hsl(self);
        hsl_to_rgb(h, s, (l + amount).min(100.0))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Visual style of non-accent slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideStyle {
    /// White background, dark text.
    #[default]
    Default,
    /// Light tint of the brand color.
    Bright,
    /// Near-black background, light text.
    Elegant,
}

impl SlideStyle {
    pub const ALL: [SlideStyle; 3] = [SlideStyle::Default, SlideStyle::Bright, SlideStyle::Elegant];

    pub fn as_str(self) -> &'static str {
        match self {
            SlideStyle::Default => "default",
            SlideStyle::Bright => "bright",
            SlideStyle::Elegant => "elegant",
        }
    }

    /// Background of a regular (non-accent) slide in this style.
    pub fn background(self, brand: Rgb) -> Rgb {
        match self {
            SlideStyle::Default => DEFAULT_BACKGROUND,
            SlideStyle::Bright => brand.lighten(BRIGHT_TINT_AMOUNT),
            SlideStyle::Elegant => ELEGANT_BACKGROUND,
        }
    }
}

/// Resolved colors for one slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorDecision {
    pub background: Rgb,
    pub base_text: Rgb,
    pub accent_text: Rgb,
    /// True when the background is the brand color itself.
    pub is_accent_slide: bool,
}

impl ColorDecision {
    /// Resolves slide colors from a user-supplied brand color.
    ///
    /// A malformed brand color is replaced by `DEFAULT_BRAND` for painting and
    /// logged. On accent slides the brand hex is the background, so its text
    /// color comes from `color_policy`: malformed input gets dark text.
    pub fn resolve(brand_hex: &str, style: SlideStyle, is_accent_slide: bool) -> Self {
        let brand = Rgb::from_hex(brand_hex).unwrap_or_else(|e| {
            warn!(error = %e, "Invalid brand color, using default brand color");
            DEFAULT_BRAND
        });
        let mut decision = Self::for_brand(brand, style, is_accent_slide);
        if is_accent_slide {
            decision.base_text = color_policy(brand_hex);
        }
        decision
    }

    pub fn for_brand(brand: Rgb, style: SlideStyle, is_accent_slide: bool) -> Self {
        let background = if is_accent_slide {
            brand
        } else {
            style.background(brand)
        };

        Self {
            background,
            base_text: text_color_for(background),
            accent_text: accent_color_for(background, brand),
            is_accent_slide,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Policy functions
// ────────────────────────────────────────────────────────────────────────────

/// Dark text on light backgrounds, light text on dark ones.
pub fn text_color_for(background: Rgb) -> Rgb {
    if background.is_light() {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

/// Callout accent: the brand color on light backgrounds, a light fallback on dark ones.
pub fn accent_color_for(background: Rgb, brand: Rgb) -> Rgb {
    if background.is_light() {
        brand
    } else {
        LIGHT_ACCENT_FALLBACK
    }
}

/// Text color for a hex background. Malformed input yields `DARK_TEXT` and a warning.
pub fn color_policy(background_hex: &str) -> Rgb {
    match Rgb::from_hex(background_hex) {
        Ok(background) => text_color_for(background),
        Err(e) => {
            warn!(error = %e, "Could not determine contrast color, falling back to dark text");
            DARK_TEXT
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Returns `(hue degrees, saturation %, lightness %)`.
fn rgb_to_hsl(color: Rgb) -> (f64, f64, f64) {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l * 100.0);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s * 100.0, l * 100.0)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h / 360.0;
    let s = s / 100.0;
    let l = l / 100.0;

    let to_u8 = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_u8(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Rgb::new(
        to_u8(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_channel(p, q, h)),
        to_u8(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
