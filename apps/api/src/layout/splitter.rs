//! Content Splitter: Divides oversized bodies before layout.
//!
//! Splitting is character-budget based and runs once, before any fitting:
//! - `split_blocks` packs whole blocks into slide-sized groups; blocks are never cut;
//! - `break_long_words` pre-breaks unbreakable words so the wrap engine can
//!   place them without falling back to per-character breaks;
//! - `split_text_slides` applies `split_blocks` to every text slide of a deck.

use tracing::debug;

use crate::content::model::{Block, SlideContent};
use crate::layout::wrap::ZERO_WIDTH_BREAK;

/// Packs consecutive blocks into groups of at most `max_chars` characters.
///
/// A single block larger than the threshold forms its own group.
pub fn split_blocks(blocks: &[Block], max_chars: usize) -> Vec<Vec<Block>> {
    let mut groups: Vec<Vec<Block>> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut current_len = 0usize;

    for block in blocks {
        let len = block.char_len();
        if !current.is_empty() && current_len + len > max_chars {
            groups.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push(block.clone());
        current_len += len;
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Inserts `-` plus a zero-width break into words longer than `max_word_len` characters.
///
/// Each resulting piece, hyphen included, is at most `max_word_len` characters.
/// Breaks are only placed between two letters or digits so inline markup is
/// never cut. Thresholds below 2 disable breaking.
pub fn break_long_words(text: &str, max_word_len: usize) -> String {
    if max_word_len < 2 {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut word = String::new();

    for ch in text.chars() {
        if ch.is_whitespace() {
            push_broken_word(&mut out, &word, max_word_len);
            word.clear();
            out.push(ch);
        } else {
            word.push(ch);
        }
    }
    push_broken_word(&mut out, &word, max_word_len);
    out
}

fn push_broken_word(out: &mut String, word: &str, max_word_len: usize) {
    if word.chars().count() <= max_word_len {
        out.push_str(word);
        return;
    }

    let chars: Vec<char> = word.chars().collect();
    let mut piece_len = 0usize;

    for (i, &ch) in chars.iter().enumerate() {
        out.push(ch);
        piece_len += 1;

        let next = chars.get(i + 1);
        let breakable = ch.is_alphanumeric() && next.is_some_and(|n| n.is_alphanumeric());
        // Leave room for the hyphen and do not strand a single trailing character.
        if breakable && piece_len >= max_word_len - 1 && i + 2 < chars.len() {
            out.push('-');
            out.push(ZERO_WIDTH_BREAK);
            piece_len = 0;
        }
    }
}

/// Expands every text slide whose body exceeds `max_chars` into continuation slides.
///
/// Continuations keep the title and color of the slide they were split from.
pub fn split_text_slides(slides: Vec<SlideContent>, max_chars: usize) -> Vec<SlideContent> {
    let mut out = Vec::with_capacity(slides.len());

    for slide in slides {
        match slide {
            SlideContent::Text {
                title,
                blocks,
                color,
            } if blocks.iter().map(Block::char_len).sum::<usize>() > max_chars => {
                let groups = split_blocks(&blocks, max_chars);
                debug!(
                    parts = groups.len(),
                    title = title.as_deref().unwrap_or(""),
                    "Splitting oversized text slide"
                );
                out.extend(groups.into_iter().map(|group| SlideContent::Text {
                    title: title.clone(),
                    blocks: group,
                    color,
                }));
            }
            other => out.push(other),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::SlideColor;

    fn para(len: usize) -> Block {
        Block::paragraph("x".repeat(len))
    }

    #[test]
    fn test_single_oversized_paragraph_is_not_split() {
        let groups = split_blocks(&[para(1000)], 600);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0][0].char_len(), 1000);
    }

    #[test]
    fn test_blocks_are_packed_until_threshold() {
        let blocks = vec![para(200), para(300), para(200), para(100), para(500)];
        let groups = split_blocks(&blocks, 600);
        let sizes: Vec<usize> = groups
            .iter()
            .map(|g| g.iter().map(Block::char_len).sum())
            .collect();
        assert_eq!(sizes, vec![500, 300, 500]);
    }

    #[test]
    fn test_block_order_is_preserved() {
        let blocks: Vec<Block> = (1..=5).map(|i| para(i * 100)).collect();
        let flattened: Vec<Block> = split_blocks(&blocks, 300).into_iter().flatten().collect();
        assert_eq!(flattened, blocks);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_blocks(&[], 600).is_empty());
    }

    #[test]
    fn test_long_word_gets_hyphen_and_break() {
        let word = "a".repeat(30);
        let broken = break_long_words(&word, 24);
        let expected = format!("{}-\u{200B}{}", "a".repeat(23), "a".repeat(7));
        assert_eq!(broken, expected);
    }

    #[test]
    fn test_short_words_and_whitespace_untouched() {
        let text = "short words\nstay  as they are";
        assert_eq!(break_long_words(text, 24), text);
    }

    #[test]
    fn test_pieces_respect_threshold() {
        let broken = break_long_words(&"б".repeat(100), 10);
        for piece in broken.split(ZERO_WIDTH_BREAK) {
            assert!(piece.chars().count() <= 10, "{piece}");
        }
        assert_eq!(broken.replace(['-', ZERO_WIDTH_BREAK], ""), "б".repeat(100));
    }

    #[test]
    fn test_markup_is_never_cut() {
        let text = format!("**{}**", "a".repeat(40));
        let broken = break_long_words(&text, 10);
        assert!(broken.starts_with("**a"));
        assert!(broken.ends_with("a**"));
    }

    #[test]
    fn test_oversized_text_slide_becomes_continuations() {
        let slide = SlideContent::Text {
            title: Some("Tips".into()),
            blocks: vec![para(400), para(400), para(400)],
            color: SlideColor::Accent,
        };
        let slides = split_text_slides(vec![slide], 600);
        assert_eq!(slides.len(), 3);
        for s in &slides {
            match s {
                SlideContent::Text { title, color, .. } => {
                    assert_eq!(title.as_deref(), Some("Tips"));
                    assert_eq!(*color, SlideColor::Accent);
                }
                other => panic!("unexpected slide {other:?}"),
            }
        }
    }

    #[test]
    fn test_other_slides_pass_through() {
        let intro = SlideContent::Intro {
            title: "x".repeat(2000),
            subtitle: None,
            color: SlideColor::Accent,
            show_abstraction: None,
        };
        let slides = split_text_slides(vec![intro.clone()], 600);
        assert_eq!(slides, vec![intro]);
    }
}
