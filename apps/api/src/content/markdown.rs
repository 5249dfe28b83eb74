//! Markdown Slide Builder: Turns loosely marked text into slide descriptors.
//!
//! # Rules
//! - `# Title` starts an accent intro slide. A paragraph directly after it becomes
//!   the subtitle.
//! - `## Title` starts a text slide; following paragraphs and lists attach to it.
//! - `> quote` becomes an accent quote slide sized by its visible length.
//! - Paragraphs and lists before the first `##` (other than an intro subtitle)
//!   have no slide to attach to and are dropped.
//! - Deeper headings and thematic breaks are ignored.
//!
//! Inline markup (`**bold**`, `__underline__`) is kept verbatim for the tokenizer.

use tracing::debug;

use crate::content::model::{Block, QuoteSize, SlideColor, SlideContent};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A block-level markdown element.
#[derive(Debug, Clone, PartialEq, Eq)]
enum MdBlock {
    Heading { depth: usize, text: String },
    Paragraph(String),
    List(Vec<String>),
    Quote(String),
}

/// What the line scanner is accumulating.
#[derive(Debug, Default)]
enum Pending {
    #[default]
    None,
    Paragraph(Vec<String>),
    List(Vec<String>),
    Quote(Vec<String>),
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Parses markdown into slides. Returns an empty vec when nothing maps to a slide.
pub fn parse_markdown(text: &str) -> Vec<SlideContent> {
    let blocks = scan_blocks(text);
    let mut slides: Vec<SlideContent> = Vec::new();
    let mut current_text: Option<usize> = None;
    let mut iter = blocks.into_iter().peekable();

    while let Some(block) = iter.next() {
        match block {
            MdBlock::Heading { depth: 1, text } => {
                let subtitle = match iter.peek() {
                    Some(MdBlock::Paragraph(_)) => match iter.next() {
                        Some(MdBlock::Paragraph(p)) => Some(p),
                        _ => None,
                    },
                    _ => None,
                };
                slides.push(SlideContent::Intro {
                    title: text,
                    subtitle,
                    color: SlideColor::Accent,
                    show_abstraction: None,
                });
            }
            MdBlock::Heading { depth: 2, text } => {
                slides.push(SlideContent::Text {
                    title: Some(text),
                    blocks: Vec::new(),
                    color: SlideColor::Default,
                });
                current_text = Some(slides.len() - 1);
            }
            MdBlock::Heading { depth, text } => {
                debug!(depth, heading = %text, "Ignoring deep heading");
            }
            MdBlock::Quote(text) => {
                let size = QuoteSize::for_text(&text);
                slides.push(SlideContent::Quote {
                    text,
                    size,
                    color: SlideColor::Accent,
                    show_abstraction: None,
                });
            }
            MdBlock::Paragraph(text) => attach(&mut slides, current_text, Block::Paragraph { text }),
            MdBlock::List(items) => attach(&mut slides, current_text, Block::List { items }),
        }
    }

    debug!(slides = slides.len(), "Parsed markdown");
    slides
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn attach(slides: &mut [SlideContent], current: Option<usize>, block: Block) {
    match current.and_then(|i| slides.get_mut(i)) {
        Some(SlideContent::Text { blocks, .. }) => blocks.push(block),
        _ => debug!("Dropping body block with no enclosing slide"),
    }
}

/// Line scanner producing block elements in document order.
fn scan_blocks(text: &str) -> Vec<MdBlock> {
    let mut out = Vec::new();
    let mut pending = Pending::None;

    for raw in text.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            flush(&mut pending, &mut out);
            continue;
        }

        if let Some((depth, heading)) = heading(trimmed) {
            flush(&mut pending, &mut out);
            out.push(MdBlock::Heading {
                depth,
                text: heading.to_string(),
            });
            continue;
        }

        if is_thematic_break(trimmed) {
            flush(&mut pending, &mut out);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('>') {
            let rest = rest.trim();
            match &mut pending {
                Pending::Quote(lines) => lines.push(rest.to_string()),
                _ => {
                    flush(&mut pending, &mut out);
                    pending = Pending::Quote(vec![rest.to_string()]);
                }
            }
            continue;
        }

        if let Some(item) = list_item(trimmed) {
            match &mut pending {
                Pending::List(items) => items.push(item.to_string()),
                _ => {
                    flush(&mut pending, &mut out);
                    pending = Pending::List(vec![item.to_string()]);
                }
            }
            continue;
        }

        match &mut pending {
            Pending::Paragraph(lines) | Pending::Quote(lines) => lines.push(trimmed.to_string()),
            // Lazy continuation of the last list item.
            Pending::List(items) if line.starts_with(char::is_whitespace) => {
                if let Some(last) = items.last_mut() {
                    last.push(' ');
                    last.push_str(trimmed);
                }
            }
            _ => {
                flush(&mut pending, &mut out);
                pending = Pending::Paragraph(vec![trimmed.to_string()]);
            }
        }
    }

    flush(&mut pending, &mut out);
    out
}

fn flush(pending: &mut Pending, out: &mut Vec<MdBlock>) {
    match std::mem::take(pending) {
        Pending::None => {}
        Pending::Paragraph(lines) => out.push(MdBlock::Paragraph(lines.join(" "))),
        Pending::List(items) => out.push(MdBlock::List(items)),
        Pending::Quote(lines) => {
            let text = lines
                .iter()
                .map(String::as_str)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                out.push(MdBlock::Quote(text));
            }
        }
    }
}

/// ATX heading: 1 to 6 `#` followed by a space. Trailing `#`s are stripped.
fn heading(line: &str) -> Option<(usize, &str)> {
    let depth = line.chars().take_while(|&c| c == '#').count();
    if depth == 0 || depth > 6 {
        return None;
    }
    let rest = &line[depth..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    Some((depth, text))
}

/// `- item`, `* item`, `+ item` or `1. item` / `1) item`.
fn list_item(line: &str) -> Option<&str> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(rest.trim());
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
        .map(str::trim)
}

fn is_thematic_break(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && (compact.chars().all(|c| c == '-')
            || compact.chars().all(|c| c == '*')
            || compact.chars().all(|c| c == '_'))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intro_takes_following_paragraph_as_subtitle() {
        let slides = parse_markdown("# Как расти\n\nПять привычек\n\n## Первая\n\nТекст");
        assert_eq!(
            slides[0],
            SlideContent::Intro {
                title: "Как расти".into(),
                subtitle: Some("Пять привычек".into()),
                color: SlideColor::Accent,
                show_abstraction: None,
            }
        );
        assert_eq!(slides.len(), 2);
    }

    #[test]
    fn test_intro_without_subtitle() {
        let slides = parse_markdown("# Только заголовок\n## Дальше");
        assert!(matches!(&slides[0], SlideContent::Intro { subtitle: None, .. }));
    }

    #[test]
    fn test_text_slide_collects_paragraphs_and_lists_in_order() {
        let md = "## Шаги\n\nСначала **важное**.\n\n- один\n- два\n  продолжение\n\nИтог";
        let slides = parse_markdown(md);
        assert_eq!(
            slides,
            vec![SlideContent::Text {
                title: Some("Шаги".into()),
                blocks: vec![
                    Block::paragraph("Сначала **важное**."),
                    Block::List {
                        items: vec!["один".into(), "два продолжение".into()],
                    },
                    Block::paragraph("Итог"),
                ],
                color: SlideColor::Default,
            }]
        );
    }

    #[test]
    fn test_soft_wrapped_paragraph_is_joined() {
        let slides = parse_markdown("## T\nпервая строка\nвторая строка");
        match &slides[0] {
            SlideContent::Text { blocks, .. } => {
                assert_eq!(blocks, &vec![Block::paragraph("первая строка вторая строка")]);
            }
            other => panic!("unexpected slide {other:?}"),
        }
    }

    #[test]
    fn test_quote_becomes_accent_slide() {
        let slides = parse_markdown("> Делай сейчас.\n> Потом не будет.");
        assert_eq!(
            slides,
            vec![SlideContent::Quote {
                text: "Делай сейчас. Потом не будет.".into(),
                size: QuoteSize::Large,
                color: SlideColor::Accent,
                show_abstraction: None,
            }]
        );
    }

    #[test]
    fn test_long_quote_is_small() {
        let md = format!("> {}", "слово ".repeat(30));
        match &parse_markdown(&md)[0] {
            SlideContent::Quote { size, .. } => assert_eq!(*size, QuoteSize::Small),
            other => panic!("unexpected slide {other:?}"),
        }
    }

    #[test]
    fn test_orphan_paragraphs_are_dropped() {
        assert!(parse_markdown("Просто текст без заголовков").is_empty());
    }

    #[test]
    fn test_ordered_list_and_deep_heading() {
        let slides = parse_markdown("## Список\n1. a\n2) b\n### ignored\n---");
        match &slides[0] {
            SlideContent::Text { blocks, .. } => assert_eq!(
                blocks,
                &vec![Block::List {
                    items: vec!["a".into(), "b".into()],
                }]
            ),
            other => panic!("unexpected slide {other:?}"),
        }
        assert_eq!(slides.len(), 1);
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("## Title ##"), Some((2, "Title")));
        assert_eq!(heading("#"), Some((1, "")));
    }
}
