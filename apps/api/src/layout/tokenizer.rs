//! Inline Tokenizer: Turns `**bold**` / `__underline__` markup into style runs.
//!
//! Grammar (one nesting level, no escaping):
//! - `**x**`            → bold
//! - `__x__`            → underline
//! - `__**x**__`, `**__x__**`, `**a __b__ c**` → the inner part is bold + underline
//!
//! The scanner makes two passes: the outer pass finds the first delimiter pair of
//! either kind, the inner pass scans the enclosed text for the *other* delimiter only.
//!
//! Malformed input:
//! - an opening delimiter with no closing partner is kept as literal text;
//! - an empty pair (`****`, `____`) is consumed and produces no run.

use serde::{Deserialize, Serialize};

/// The (bold, underline) combination of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStyle {
    #[default]
    Plain,
    Bold,
    Underline,
    BoldUnderline,
}

impl RunStyle {
    pub fn from_flags(bold: bool, underline: bool) -> Self {
        match (bold, underline) {
            (false, false) => RunStyle::Plain,
            (true, false) => RunStyle::Bold,
            (false, true) => RunStyle::Underline,
            (true, true) => RunStyle::BoldUnderline,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, RunStyle::Bold | RunStyle::BoldUnderline)
    }

    pub fn is_underline(self) -> bool {
        matches!(self, RunStyle::Underline | RunStyle::BoldUnderline)
    }

    fn with(self, delimiter: Delimiter) -> Self {
        match delimiter {
            Delimiter::Bold => Self::from_flags(true, self.is_underline()),
            Delimiter::Underline => Self::from_flags(self.is_bold(), true),
        }
    }
}

/// A maximal span of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleRun {
    pub text: String,
    pub style: RunStyle,
}

impl StyleRun {
    pub fn new(text: impl Into<String>, style: RunStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Bold,
    Underline,
}

impl Delimiter {
    fn marker(self) -> &'static str {
        match self {
            Delimiter::Bold => "**",
            Delimiter::Underline => "__",
        }
    }

    fn other(self) -> Self {
        match self {
            Delimiter::Bold => Delimiter::Underline,
            Delimiter::Underline => Delimiter::Bold,
        }
    }
}

/// Tokenizes inline markup into style runs, merging adjacent runs of equal style.
pub fn tokenize(text: &str) -> Vec<StyleRun> {
    let mut runs = Vec::new();
    scan(
        text,
        RunStyle::Plain,
        &[Delimiter::Bold, Delimiter::Underline],
        true,
        &mut runs,
    );
    merge_adjacent(runs)
}

/// Removes markup, returning only the visible text.
pub fn strip_markup(text: &str) -> String {
    tokenize(text).into_iter().map(|r| r.text).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Scanner
// ────────────────────────────────────────────────────────────────────────────

fn scan(
    text: &str,
    style: RunStyle,
    delimiters: &[Delimiter],
    outer: bool,
    out: &mut Vec<StyleRun>,
) {
    let mut pos = 0;
    let mut literal_start = 0;

    while let Some((open, delimiter)) = find_next(text, pos, delimiters) {
        let marker = delimiter.marker();
        let content_start = open + marker.len();

        let Some(rel_close) = text[content_start..].find(marker) else {
            // Unmatched: the marker stays in the literal text.
            pos = content_start;
            continue;
        };
        let close = content_start + rel_close;

        push_run(out, &text[literal_start..open], style);

        let inner_style = style.with(delimiter);
        let content = &text[content_start..close];
        if outer {
            scan(content, inner_style, &[delimiter.other()], false, out);
        } else {
            push_run(out, content, inner_style);
        }

        pos = close + marker.len();
        literal_start = pos;
    }

    push_run(out, &text[literal_start..], style);
}

/// Earliest occurrence at or after `pos` of any allowed delimiter.
fn find_next(text: &str, pos: usize, delimiters: &[Delimiter]) -> Option<(usize, Delimiter)> {
    delimiters
        .iter()
        .filter_map(|&d| text[pos..].find(d.marker()).map(|i| (pos + i, d)))
        .min_by_key(|&(i, _)| i)
}

fn push_run(out: &mut Vec<StyleRun>, text: &str, style: RunStyle) {
    if !text.is_empty() {
        out.push(StyleRun::new(text, style));
    }
}

fn merge_adjacent(runs: Vec<StyleRun>) -> Vec<StyleRun> {
    let mut merged: Vec<StyleRun> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    merged
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(runs: &[StyleRun]) -> Vec<(&str, RunStyle)> {
        runs.iter().map(|r| (r.text.as_str(), r.style)).collect()
    }

    #[test]
    fn test_plain_text_is_one_run() {
        let runs = tokenize("just text");
        assert_eq!(styles(&runs), vec![("just text", RunStyle::Plain)]);
    }

    #[test]
    fn test_empty_input_yields_no_runs() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_mixed_markup_sentence() {
        let runs = tokenize("A **bold** and __underlined__ and **__both__** text.");
        assert_eq!(
            styles(&runs),
            vec![
                ("A ", RunStyle::Plain),
                ("bold", RunStyle::Bold),
                (" and ", RunStyle::Plain),
                ("underlined", RunStyle::Underline),
                (" and ", RunStyle::Plain),
                ("both", RunStyle::BoldUnderline),
                (" text.", RunStyle::Plain),
            ]
        );
    }

    #[test]
    fn test_underline_outside_bold_inside() {
        let runs = tokenize("__**x**__");
        assert_eq!(styles(&runs), vec![("x", RunStyle::BoldUnderline)]);
    }

    #[test]
    fn test_partial_nesting_splits_the_outer_run() {
        let runs = tokenize("**one __two__ three**");
        assert_eq!(
            styles(&runs),
            vec![
                ("one ", RunStyle::Bold),
                ("two", RunStyle::BoldUnderline),
                (" three", RunStyle::Bold),
            ]
        );
    }

    #[test]
    fn test_adjacent_equal_styles_are_merged() {
        let runs = tokenize("**a****b** c");
        assert_eq!(
            styles(&runs),
            vec![("ab", RunStyle::Bold), (" c", RunStyle::Plain)]
        );
    }

    #[test]
    fn test_unmatched_delimiter_is_literal() {
        let runs = tokenize("price **drops");
        assert_eq!(styles(&runs), vec![("price **drops", RunStyle::Plain)]);

        let runs = tokenize("a __b **c__");
        assert_eq!(
            styles(&runs),
            vec![("a ", RunStyle::Plain), ("b **c", RunStyle::Underline)]
        );
    }

    #[test]
    fn test_unmatched_then_matched() {
        let runs = tokenize("__x **y**");
        assert_eq!(
            styles(&runs),
            vec![("__x ", RunStyle::Plain), ("y", RunStyle::Bold)]
        );
    }

    #[test]
    fn test_empty_pair_is_consumed() {
        let runs = tokenize("a****b");
        assert_eq!(styles(&runs), vec![("ab", RunStyle::Plain)]);
    }

    #[test]
    fn test_single_underscores_are_plain() {
        let runs = tokenize("snake_case_name");
        assert_eq!(styles(&runs), vec![("snake_case_name", RunStyle::Plain)]);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("**Hi** __there__"), "Hi there");
    }

    #[test]
    fn test_style_flags() {
        assert!(RunStyle::BoldUnderline.is_bold());
        assert!(RunStyle::BoldUnderline.is_underline());
        assert!(!RunStyle::Bold.is_underline());
        assert_eq!(RunStyle::from_flags(false, true), RunStyle::Underline);
    }
}
