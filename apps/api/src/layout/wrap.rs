//! Wrap Engine: Greedy line breaking over styled runs.
//!
//! # Algorithm
//! 1. Runs are expanded into words. ASCII whitespace and U+200B are break
//!    opportunities; U+00A0 is not, except on the edge of a run (protection holds
//!    inside a single style run only). Runs that touch without whitespace form one
//!    compound word made of several styled segments.
//! 2. Words are placed greedily: a word joins the current line when
//!    `line_width + gap_width + word_width <= max_width`, otherwise the line is
//!    closed and the word starts the next one. The gap at a wrap point is dropped.
//! 3. A word wider than `max_width` on its own is broken character by character,
//!    without a hyphen. A single character wider than the line is still placed.
//!
//! Every iteration consumes one word or one character, so the loop always terminates.

use tracing::warn;

use crate::layout::font_cache::{FontCache, FontHandle};
use crate::layout::font_metrics::FontWeight;
use crate::layout::measure::{measure_or_estimate, TextMeasurer};
use crate::layout::tokenizer::{RunStyle, StyleRun};
use crate::layout::typography::NBSP;

/// Zero-width break opportunity inserted after forced hyphens.
pub const ZERO_WIDTH_BREAK: char = '\u{200B}';

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A run of text placed on a line, with its measured advance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub text: String,
    pub style: RunStyle,
    pub width: f32,
    /// Inter-word space. Carries the style of the run the whitespace came from.
    pub is_space: bool,
}

/// One visual row of placed runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub runs: Vec<PlacedRun>,
    pub width: f32,
}

impl Line {
    /// Visible text of the line, with joiners rendered as plain spaces.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<String>()
            .replace(NBSP, " ")
    }

    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn push(&mut self, text: &str, style: RunStyle, width: f32, is_space: bool) {
        match self.runs.last_mut() {
            Some(last) if !is_space && !last.is_space && last.style == style => {
                last.text.push_str(text);
                last.width += width;
            }
            _ => self.runs.push(PlacedRun {
                text: text.to_string(),
                style,
                width,
                is_space,
            }),
        }
        self.width += width;
    }
}

/// Regular and bold faces at one size.
#[derive(Debug, Clone)]
pub struct LineFonts {
    pub regular: FontHandle,
    pub bold: FontHandle,
}

impl LineFonts {
    pub fn new(cache: &FontCache, size_px: u32) -> Self {
        Self {
            regular: cache.font(FontWeight::Normal, size_px),
            bold: cache.font(FontWeight::Bold, size_px),
        }
    }

    /// All text in the role's weight, with bold runs staying bold.
    pub fn with_base_weight(cache: &FontCache, size_px: u32, weight: FontWeight) -> Self {
        Self {
            regular: cache.font(weight, size_px),
            bold: cache.font(FontWeight::Bold, size_px),
        }
    }

    pub fn for_style(&self, style: RunStyle) -> &FontHandle {
        if style.is_bold() {
            &self.bold
        } else {
            &self.regular
        }
    }

    pub fn size_px(&self) -> u32 {
        self.regular.size_px()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Word expansion
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum GapKind {
    Space,
    ZeroWidth,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gap {
    kind: GapKind,
    style: RunStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    text: String,
    style: RunStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Word {
    /// Break opportunity before this word; `None` only for the first word.
    gap_before: Option<Gap>,
    segments: Vec<Segment>,
}

#[derive(Default)]
struct WordBuilder {
    words: Vec<Word>,
    current: Word,
    pending_gap: Option<Gap>,
}

impl WordBuilder {
    fn push_gap(&mut self, gap: Gap) {
        self.finish_word();
        // Collapse consecutive gaps: a real space beats a zero-width break.
        self.pending_gap = match self.pending_gap {
            Some(existing) if existing.kind == GapKind::Space => Some(existing),
            _ => Some(gap),
        };
    }

    fn push_char(&mut self, ch: char, style: RunStyle) {
        if self.current.segments.is_empty() {
            self.current.gap_before = self.pending_gap.take();
        }
        match self.current.segments.last_mut() {
            Some(seg) if seg.style == style => seg.text.push(ch),
            _ => self.current.segments.push(Segment {
                text: ch.to_string(),
                style,
            }),
        }
    }

    fn finish_word(&mut self) {
        if !self.current.segments.is_empty() {
            self.words.push(std::mem::take(&mut self.current));
        }
    }

    fn into_words(mut self) -> Vec<Word> {
        self.finish_word();
        if let Some(first) = self.words.first_mut() {
            first.gap_before = None;
        }
        self.words
    }
}

fn expand_words(runs: &[StyleRun]) -> Vec<Word> {
    let mut builder = WordBuilder::default();

    for run in runs {
        let chars: Vec<char> = run.text.chars().collect();
        let lead = chars.iter().take_while(|&&c| c == NBSP).count();
        let trail = if lead == chars.len() {
            0
        } else {
            chars.iter().rev().take_while(|&&c| c == NBSP).count()
        };

        for (i, &ch) in chars.iter().enumerate() {
            let on_edge = i < lead || i >= chars.len() - trail;
            if ch.is_ascii_whitespace() || (ch == NBSP && on_edge) {
                builder.push_gap(Gap {
                    kind: GapKind::Space,
                    style: run.style,
                });
            } else if ch == ZERO_WIDTH_BREAK {
                builder.push_gap(Gap {
                    kind: GapKind::ZeroWidth,
                    style: run.style,
                });
            } else {
                builder.push_char(ch, run.style);
            }
        }
    }

    builder.into_words()
}

// ────────────────────────────────────────────────────────────────────────────
// Greedy wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Wraps styled runs into lines no wider than `max_width` pixels.
///
/// A `max_width` that is not a positive finite number disables wrapping: all words
/// are placed on one line and a warning is logged.
pub fn wrap_runs(
    runs: &[StyleRun],
    max_width: f32,
    measurer: &dyn TextMeasurer,
    fonts: &LineFonts,
) -> Vec<Line> {
    let words = expand_words(runs);
    if words.is_empty() {
        return Vec::new();
    }

    let unconstrained = !(max_width.is_finite() && max_width > 0.0);
    if unconstrained {
        warn!(max_width, "Non-positive wrap width, laying out without wrapping");
    }

    let mut wrapper = Wrapper {
        lines: Vec::new(),
        line: Line::default(),
        max_width: if unconstrained { f32::INFINITY } else { max_width },
        measurer,
        fonts,
    };

    for word in &words {
        wrapper.place_word(word);
    }
    wrapper.finish()
}

struct Wrapper<'a> {
    lines: Vec<Line>,
    line: Line,
    max_width: f32,
    measurer: &'a dyn TextMeasurer,
    fonts: &'a LineFonts,
}

impl Wrapper<'_> {
    fn measure(&self, text: &str, style: RunStyle) -> f32 {
        measure_or_estimate(self.measurer, text, self.fonts.for_style(style))
    }

    fn place_word(&mut self, word: &Word) {
        let widths: Vec<f32> = word
            .segments
            .iter()
            .map(|s| self.measure(&s.text, s.style))
            .collect();
        let word_width: f32 = widths.iter().sum();

        if !self.line.is_empty() {
            let gap_width = match word.gap_before {
                Some(Gap {
                    kind: GapKind::Space,
                    style,
                }) => self.measure(" ", style),
                _ => 0.0,
            };

            if self.line.width + gap_width + word_width <= self.max_width {
                if let Some(Gap {
                    kind: GapKind::Space,
                    style,
                }) = word.gap_before
                {
                    self.line.push(" ", style, gap_width, true);
                }
                self.push_segments(word, &widths);
                return;
            }
            self.close_line();
        }

        if word_width <= self.max_width {
            self.push_segments(word, &widths);
        } else {
            self.break_word(word);
        }
    }

    fn push_segments(&mut self, word: &Word, widths: &[f32]) {
        for (seg, &w) in word.segments.iter().zip(widths) {
            self.line.push(&seg.text, seg.style, w, false);
        }
    }

    /// Character-by-character fallback for a word wider than the line.
    fn break_word(&mut self, word: &Word) {
        let mut buf = [0u8; 4];
        for seg in &word.segments {
            for ch in seg.text.chars() {
                let s = ch.encode_utf8(&mut buf);
                let w = self.measure(s, seg.style);
                if !self.line.is_empty() && self.line.width + w > self.max_width {
                    self.close_line();
                }
                self.line.push(s, seg.style, w, false);
            }
        }
    }

    fn close_line(&mut self) {
        if !self.line.is_empty() {
            self.lines.push(std::mem::take(&mut self.line));
        }
    }

    fn finish(mut self) -> Vec<Line> {
        self.close_line();
        self.lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::measure::MeasureError;
    use crate::layout::tokenizer::tokenize;

    /// 10px per char regular, 12px per char bold, spaces 5px; rejects '☃'.
    pub(crate) struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, font: &FontHandle) -> Result<f32, MeasureError> {
            text.chars()
                .map(|c| match c {
                    '☃' => Err(MeasureError::UnsupportedGlyph(c)),
                    ' ' | NBSP => Ok(5.0),
                    ZERO_WIDTH_BREAK => Ok(0.0),
                    _ if font.weight() == FontWeight::Bold => Ok(12.0),
                    _ => Ok(10.0),
                })
                .sum()
        }
    }

    pub(crate) fn fonts(cache: &FontCache) -> LineFonts {
        LineFonts::new(cache, 10)
    }

    fn wrap(text: &str, width: f32) -> Vec<Line> {
        let cache = FontCache::new();
        wrap_runs(&tokenize(text), width, &FixedMeasurer, &fonts(&cache))
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap("", 100.0).is_empty());
        assert!(wrap("   \n  ", 100.0).is_empty());
    }

    #[test]
    fn test_fits_on_one_line() {
        let lines = wrap("ab cd", 100.0);
        assert_eq!(texts(&lines), vec!["ab cd"]);
        assert_eq!(lines[0].width, 45.0);
    }

    #[test]
    fn test_exact_fit_uses_less_or_equal() {
        // "ab cd" = 20 + 5 + 20 = 45
        assert_eq!(texts(&wrap("ab cd", 45.0)), vec!["ab cd"]);
        assert_eq!(texts(&wrap("ab cd", 44.9)), vec!["ab", "cd"]);
    }

    #[test]
    fn test_wrap_point_space_is_dropped() {
        let lines = wrap("aaa bbb ccc", 70.0);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc"]);
        for line in &lines {
            assert!(!line.runs.first().unwrap().is_space);
            assert!(!line.runs.last().unwrap().is_space);
        }
    }

    #[test]
    fn test_long_word_breaks_per_character() {
        let lines = wrap("abcdefghij", 35.0);
        assert_eq!(texts(&lines), vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn test_long_word_starts_on_fresh_line() {
        let lines = wrap("xy abcdefgh", 50.0);
        assert_eq!(texts(&lines), vec!["xy", "abcde", "fgh"]);
    }

    #[test]
    fn test_single_char_wider_than_line_is_placed() {
        let lines = wrap("ab", 5.0);
        assert_eq!(texts(&lines), vec!["a", "b"]);
        assert!(lines.iter().all(|l| l.width == 10.0));
    }

    #[test]
    fn test_non_positive_width_does_not_wrap() {
        for width in [0.0, -10.0, f32::NAN] {
            let lines = wrap("one two three", width);
            assert_eq!(texts(&lines), vec!["one two three"]);
        }
    }

    #[test]
    fn test_nbsp_inside_run_is_not_a_break() {
        let lines = wrap("aa и\u{00A0}bb", 50.0);
        assert_eq!(texts(&lines), vec!["aa", "и bb"]);
    }

    #[test]
    fn test_nbsp_on_style_boundary_is_a_break() {
        // "и\u{00A0}" ends the plain run, so the joiner does not bind to the bold word.
        let lines = wrap("aa и\u{00A0}**bb**", 50.0);
        assert_eq!(texts(&lines), vec!["aa и", "bb"]);
    }

    #[test]
    fn test_touching_runs_form_one_word() {
        let lines = wrap("**bold**, next", 85.0);
        assert_eq!(texts(&lines), vec!["bold,", "next"]);
        assert_eq!(lines[0].runs.len(), 2);
        assert_eq!(lines[0].runs[0].style, RunStyle::Bold);
        assert_eq!(lines[0].runs[1].text, ",");
    }

    #[test]
    fn test_zero_width_break_allows_wrap_without_space() {
        let lines = wrap("abc-\u{200B}def", 45.0);
        assert_eq!(texts(&lines), vec!["abc-", "def"]);
        let lines = wrap("ab-\u{200B}cd", 100.0);
        assert_eq!(texts(&lines), vec!["ab-cd"]);
    }

    #[test]
    fn test_bold_words_measure_wider() {
        let lines = wrap("**abc**", 100.0);
        assert_eq!(lines[0].width, 36.0);
    }

    #[test]
    fn test_space_inherits_style_of_its_run() {
        let lines = wrap("__one two__ three", 200.0);
        let spaces: Vec<RunStyle> = lines[0]
            .runs
            .iter()
            .filter(|r| r.is_space)
            .map(|r| r.style)
            .collect();
        assert_eq!(spaces, vec![RunStyle::Underline, RunStyle::Plain]);
    }

    #[test]
    fn test_unsupported_glyph_uses_estimate() {
        let lines = wrap("a☃", 1000.0);
        assert_eq!(lines.len(), 1);
        // 'a' = 10, '☃' is not measured individually: the whole segment falls back
        // to 2 chars × 0.55em × 10px.
        assert!((lines[0].width - 11.0).abs() < 1e-4);
    }

    #[test]
    fn test_every_line_fits_and_text_is_preserved() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do \
                    eiusmod tempor incididunt ut labore et dolore magna aliqua";
        for width in [120.0, 200.0, 333.0, 1000.0] {
            let lines = wrap(text, width);
            for line in &lines {
                assert!(line.width <= width, "width {width}: {:?}", line.text());
            }
            let joined = texts(&lines).join(" ");
            assert_eq!(joined, text, "width {width}");
        }
    }

    #[test]
    fn test_character_fallback_preserves_text() {
        let lines = wrap("supercalifragilistic", 70.0);
        assert_eq!(texts(&lines).concat(), "supercalifragilistic");
        assert!(lines.iter().all(|l| l.width <= 70.0));
    }

    #[test]
    fn test_line_width_equals_sum_of_runs() {
        let lines = wrap("A **bold** and __under__ text", 90.0);
        for line in &lines {
            let sum: f32 = line.runs.iter().map(|r| r.width).sum();
            assert!((sum - line.width).abs() < 1e-4);
        }
    }
}
