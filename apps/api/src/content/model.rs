//! Slide descriptors: the structured input of the layout engine.

use serde::{Deserialize, Serialize};

use crate::layout::font_roles::FontRole;
use crate::layout::tokenizer::strip_markup;

/// Quotes longer than this (in visible characters) use the small role.
const QUOTE_SMALL_THRESHOLD: usize = 140;
/// Quotes longer than this use the medium role.
const QUOTE_MEDIUM_THRESHOLD: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideColor {
    #[default]
    Default,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl QuoteSize {
    /// Picks a size from the visible length of the quote.
    pub fn for_text(text: &str) -> Self {
        let len = strip_markup(text).chars().count();
        if len > QUOTE_SMALL_THRESHOLD {
            QuoteSize::Small
        } else if len > QUOTE_MEDIUM_THRESHOLD {
            QuoteSize::Medium
        } else {
            QuoteSize::Large
        }
    }

    pub fn role(self) -> FontRole {
        match self {
            QuoteSize::Small => FontRole::QuoteSmall,
            QuoteSize::Medium => FontRole::QuoteMedium,
            QuoteSize::Large => FontRole::QuoteLarge,
        }
    }
}

/// A body block of a text slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph { text: String },
    List { items: Vec<String> },
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph { text: text.into() }
    }

    /// Character count of the raw block text, markup included.
    pub fn char_len(&self) -> usize {
        match self {
            Block::Paragraph { text } => text.chars().count(),
            Block::List { items } => items.iter().map(|i| i.chars().count()).sum(),
        }
    }

    /// Applies `f` to every text fragment of the block.
    pub fn map_text(self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            Block::Paragraph { text } => Block::Paragraph { text: f(&text) },
            Block::List { items } => Block::List {
                items: items.iter().map(|i| f(i)).collect(),
            },
        }
    }
}

/// One slide's structured text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SlideContent {
    Intro {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        #[serde(default)]
        color: SlideColor,
        /// Decoration shapes are drawn unless this is `Some(false)`.
        #[serde(default, rename = "showAbstraction", skip_serializing_if = "Option::is_none")]
        show_abstraction: Option<bool>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        blocks: Vec<Block>,
        #[serde(default)]
        color: SlideColor,
    },
    Quote {
        text: String,
        #[serde(default)]
        size: QuoteSize,
        #[serde(default)]
        color: SlideColor,
        #[serde(default, rename = "showAbstraction", skip_serializing_if = "Option::is_none")]
        show_abstraction: Option<bool>,
    },
}

impl SlideContent {
    pub fn color(&self) -> SlideColor {
        match self {
            SlideContent::Intro { color, .. }
            | SlideContent::Text { color, .. }
            | SlideContent::Quote { color, .. } => *color,
        }
    }

    pub fn is_accent(&self) -> bool {
        self.color() == SlideColor::Accent
    }

    /// Intro and quote slides carry decoration shapes unless switched off.
    pub fn shows_abstraction(&self) -> bool {
        match self {
            SlideContent::Intro { show_abstraction, .. } | SlideContent::Quote { show_abstraction, .. } => {
                show_abstraction.unwrap_or(true)
            }
            SlideContent::Text { .. } => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SlideContent::Intro { .. } => "intro",
            SlideContent::Text { .. } => "text",
            SlideContent::Quote { .. } => "quote",
        }
    }

    /// Total raw characters across title and body.
    pub fn char_len(&self) -> usize {
        match self {
            SlideContent::Intro { title, subtitle, .. } => {
                title.chars().count() + subtitle.as_deref().map_or(0, |s| s.chars().count())
            }
            SlideContent::Text { title, blocks, .. } => {
                title.as_deref().map_or(0, |t| t.chars().count())
                    + blocks.iter().map(Block::char_len).sum::<usize>()
            }
            SlideContent::Quote { text, .. } => text.chars().count(),
        }
    }

    /// Applies `f` to every body text fragment. Titles are left untouched.
    pub fn map_body(self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            SlideContent::Intro {
                title,
                subtitle,
                color,
                show_abstraction,
            } => SlideContent::Intro {
                title,
                subtitle: subtitle.map(|s| f(&s)),
                color,
                show_abstraction,
            },
            SlideContent::Text {
                title,
                blocks,
                color,
            } => SlideContent::Text {
                title,
                blocks: blocks.into_iter().map(|b| b.map_text(&mut f)).collect(),
                color,
            },
            SlideContent::Quote {
                text,
                size,
                color,
                show_abstraction,
            } => SlideContent::Quote {
                text: f(&text),
                size,
                color,
                show_abstraction,
            },
        }
    }
}
