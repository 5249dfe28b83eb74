//! Slide content: the descriptor model, the markdown builder and deck preparation.

pub mod final_slide;
pub mod markdown;
pub mod model;

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::layout::splitter::{break_long_words, split_text_slides};
use final_slide::{FinalSlideBuilder, FinalSlideSettings};
use model::{Block, SlideColor, SlideContent};

const FALLBACK_TITLE: &str = "Ваш контент";
/// Characters of raw input shown on the fallback slide.
const FALLBACK_CHARS: usize = 200;
/// Accepted values of an explicit `maxSlides`.
pub const MAX_SLIDES_RANGE: RangeInclusive<usize> = 3..=20;

/// Client cap on deck length: a slide count or `"auto"` (no cap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "MaxSlidesRepr", into = "MaxSlidesRepr")]
pub enum MaxSlides {
    #[default]
    Auto,
    Count(usize),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MaxSlidesRepr {
    Count(usize),
    Keyword(String),
}

impl TryFrom<MaxSlidesRepr> for MaxSlides {
    type Error = String;

    fn try_from(repr: MaxSlidesRepr) -> Result<Self, Self::Error> {
        match repr {
            MaxSlidesRepr::Count(n) => Ok(MaxSlides::Count(n)),
            MaxSlidesRepr::Keyword(k) if k == "auto" => Ok(MaxSlides::Auto),
            MaxSlidesRepr::Keyword(k) => Err(format!("maxSlides must be a number or \"auto\", got \"{k}\"")),
        }
    }
}

impl From<MaxSlides> for MaxSlidesRepr {
    fn from(max: MaxSlides) -> Self {
        match max {
            MaxSlides::Auto => MaxSlidesRepr::Keyword("auto".to_string()),
            MaxSlides::Count(n) => MaxSlidesRepr::Count(n),
        }
    }
}

/// Limits applied while turning descriptors into a renderable deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareOptions {
    pub max_chars_per_slide: usize,
    pub max_word_length: usize,
    pub max_slides: MaxSlides,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            max_chars_per_slide: 600,
            max_word_length: 24,
            max_slides: MaxSlides::Auto,
        }
    }
}

/// Summary of a prepared deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total_slides: usize,
    pub intro_slides: usize,
    pub text_slides: usize,
    pub quote_slides: usize,
    /// Slides added by splitting oversized text slides.
    pub continuation_slides: usize,
    /// Slides cut off by `maxSlides`.
    pub dropped_slides: usize,
    /// Raw characters of the deck, markup included, before long words are broken.
    pub total_characters: usize,
}

impl DeckStats {
    pub fn of(slides: &[SlideContent], continuation_slides: usize, dropped_slides: usize) -> Self {
        let mut stats = DeckStats {
            total_slides: slides.len(),
            continuation_slides,
            dropped_slides,
            ..Default::default()
        };
        for slide in slides {
            match slide {
                SlideContent::Intro { .. } => stats.intro_slides += 1,
                SlideContent::Text { .. } => stats.text_slides += 1,
                SlideContent::Quote { .. } => stats.quote_slides += 1,
            }
            stats.total_characters += slide.char_len();
        }
        stats
    }
}

/// Parses markdown and prepares the resulting deck.
///
/// When neither the text nor the final slide settings produce a slide, a single
/// text slide with the start of the raw input is used instead.
pub fn slides_from_markdown(
    text: &str,
    final_slide: Option<&FinalSlideSettings>,
    options: &PrepareOptions,
) -> (Vec<SlideContent>, DeckStats) {
    let mut slides = markdown::parse_markdown(text);
    if slides.is_empty() && final_slide.map_or(true, |f| !f.enabled) {
        debug!("No slides parsed, using fallback slide");
        slides.push(fallback_slide(text));
    }
    prepare_slides(slides, final_slide, options)
}

/// Splits oversized text slides, applies the `maxSlides` cap, appends the
/// optional final slide and pre-breaks long words.
///
/// The cap counts the final slide, which is always kept last. Stats describe the
/// deck before word breaking.
pub fn prepare_slides(
    slides: Vec<SlideContent>,
    final_slide: Option<&FinalSlideSettings>,
    options: &PrepareOptions,
) -> (Vec<SlideContent>, DeckStats) {
    let final_slide = final_slide
        .and_then(FinalSlideBuilder::from_settings)
        .map(FinalSlideBuilder::build);

    let before = slides.len() + usize::from(final_slide.is_some());
    let mut slides = split_text_slides(slides, options.max_chars_per_slide);
    let continuation_slides = slides.len() + usize::from(final_slide.is_some()) - before;

    let mut dropped_slides = 0;
    if let MaxSlides::Count(max) = options.max_slides {
        let keep = max.saturating_sub(usize::from(final_slide.is_some()));
        if slides.len() > keep {
            dropped_slides = slides.len() - keep;
            warn!(max_slides = max, dropped = dropped_slides, "Deck exceeds maxSlides, dropping trailing slides");
            slides.truncate(keep);
        }
    }
    slides.extend(final_slide);

    let stats = DeckStats::of(&slides, continuation_slides, dropped_slides);
    let slides = slides
        .into_iter()
        .map(|slide| slide.map_body(|text| break_long_words(text, options.max_word_length)))
        .collect();

    info!(
        slides = stats.total_slides,
        continuations = stats.continuation_slides,
        dropped = stats.dropped_slides,
        "Deck prepared"
    );
    (slides, stats)
}

fn fallback_slide(text: &str) -> SlideContent {
    let excerpt: String = text.trim().chars().take(FALLBACK_CHARS).collect();
    SlideContent::Text {
        title: Some(FALLBACK_TITLE.to_string()),
        blocks: vec![Block::paragraph(excerpt)],
        color: SlideColor::Default,
    }
}
