//! Static advance-width tables for the slide typeface (Arial / Helvetica metrics).
//!
//! Widths are in em units (relative to font size), taken from the Helvetica AFM
//! advances that Arial is metric-compatible with. Printable ASCII is covered
//! exactly; Cyrillic, common typographic punctuation and Latin-1 letters use
//! per-class approximations. Anything else is reported as an unsupported glyph
//! so the caller can decide how to degrade.
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

use crate::layout::measure::MeasureError;

// ────────────────────────────────────────────────────────────────────────────
// Font weight
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_css(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one weight of the slide typeface.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for accented Latin letters.
    pub average_char_width: f32,
    pub cyrillic_upper_width: f32,
    pub cyrillic_lower_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    /// Width of a single character in em units.
    pub fn char_width(&self, c: char) -> Result<f32, MeasureError> {
        let code = c as u32;
        let width = match c {
            ' '..='~' => self.widths[(code - 32) as usize],
            '\u{00A0}' | '\t' | '\n' => self.space_width,
            '\u{200B}' | '\u{00AD}' => 0.0,
            '«' | '»' | '–' | '€' | '₽' => 0.556,
            '—' | '…' | '→' | '№' => 1.0,
            '“' | '”' | '„' => 0.333,
            '‘' | '’' => 0.222,
            '•' => 0.35,
            'Ё' | 'А'..='Я' => self.cyrillic_upper_width,
            'ё' | 'а'..='я' => self.cyrillic_lower_width,
            '\u{0400}'..='\u{04FF}' => self.cyrillic_lower_width,
            '\u{00C0}'..='\u{017F}' => self.average_char_width,
            _ => return Err(MeasureError::UnsupportedGlyph(c)),
        };
        Ok(width)
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> Result<f32, MeasureError> {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static ARIAL_REGULAR_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.55,
    cyrillic_upper_width: 0.70,
    cyrillic_lower_width: 0.55,
    space_width: 0.278,
};

static ARIAL_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.60,
    cyrillic_upper_width: 0.74,
    cyrillic_lower_width: 0.60,
    space_width: 0.278,
};

/// Returns the static metric table for a given weight.
pub fn get_metrics(weight: FontWeight) -> &'static FontMetricTable {
    match weight {
        FontWeight::Normal => &ARIAL_REGULAR_TABLE,
        FontWeight::Bold => &ARIAL_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        let metrics = get_metrics(FontWeight::Normal);
        assert_eq!(metrics.measure_str(""), Ok(0.0));
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        let metrics = get_metrics(FontWeight::Normal);
        // "Rust" = R(0.722) + u(0.556) + s(0.500) + t(0.278) = 2.056
        let width = metrics.measure_str("Rust").unwrap();
        assert!((width - 2.056).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Carousel layout";
        let regular = get_metrics(FontWeight::Normal).measure_str(text).unwrap();
        let bold = get_metrics(FontWeight::Bold).measure_str(text).unwrap();
        assert!(bold > regular, "bold {bold} should exceed regular {regular}");
    }

    #[test]
    fn test_nbsp_measures_as_space() {
        let metrics = get_metrics(FontWeight::Normal);
        assert_eq!(metrics.char_width('\u{00A0}'), Ok(metrics.space_width));
        assert_eq!(metrics.char_width('\u{200B}'), Ok(0.0));
    }

    #[test]
    fn test_cyrillic_is_supported() {
        let metrics = get_metrics(FontWeight::Normal);
        let width = metrics.measure_str("Привет").unwrap();
        let expected = metrics.cyrillic_upper_width + 5.0 * metrics.cyrillic_lower_width;
        assert!((width - expected).abs() < 1e-4);
    }

    #[test]
    fn test_unsupported_glyph_is_an_error() {
        let metrics = get_metrics(FontWeight::Normal);
        assert_eq!(
            metrics.measure_str("ok 漢"),
            Err(MeasureError::UnsupportedGlyph('漢'))
        );
    }
}
