//! Optional closing slide: call-to-action, contact card or brand sign-off.

use serde::{Deserialize, Serialize};

use crate::content::model::{Block, SlideColor, SlideContent};

const FALLBACK_TITLE: &str = "Спасибо за внимание!";
const FALLBACK_TEXT: &str = "Больше контента в профиле";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalSlideKind {
    Cta,
    Contact,
    Brand,
}

impl FinalSlideKind {
    fn template(self) -> (&'static str, &'static str, SlideColor) {
        match self {
            FinalSlideKind::Cta => (
                "Подписывайтесь!",
                "Ставьте лайк если полезно\n\nБольше контента в профиле",
                SlideColor::Accent,
            ),
            FinalSlideKind::Contact => (
                "Связаться со мной:",
                "email@example.com\n\nTelegram: @username\n\nwebsite.com",
                SlideColor::Default,
            ),
            FinalSlideKind::Brand => (
                "Спасибо за внимание!",
                "Помогаю бизнесу расти\n\nКонсультации и стратегии",
                SlideColor::Accent,
            ),
        }
    }
}

/// Request settings for the closing slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSlideSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FinalSlideKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SlideColor>,
}

/// Builds the closing text slide from a template plus explicit overrides.
///
/// Without a template the generic thank-you slide is used. Empty overrides are
/// ignored. Paragraphs in the text are separated by blank lines.
#[derive(Debug, Clone, Default)]
pub struct FinalSlideBuilder {
    kind: Option<FinalSlideKind>,
    title: Option<String>,
    text: Option<String>,
    color: Option<SlideColor>,
}

impl FinalSlideBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: FinalSlideKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = non_empty(text.into());
        self
    }

    pub fn color(mut self, color: SlideColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Returns `None` when the settings do not enable a final slide.
    pub fn from_settings(settings: &FinalSlideSettings) -> Option<Self> {
        if !settings.enabled {
            return None;
        }
        let mut builder = Self::new();
        if let Some(kind) = settings.kind {
            builder = builder.kind(kind);
        }
        if let Some(title) = &settings.title {
            builder = builder.title(title.as_str());
        }
        if let Some(text) = &settings.text {
            builder = builder.text(text.as_str());
        }
        if let Some(color) = settings.color {
            builder = builder.color(color);
        }
        Some(builder)
    }

    pub fn build(self) -> SlideContent {
        let (title, text, color) = self
            .kind
            .map(FinalSlideKind::template)
            .unwrap_or((FALLBACK_TITLE, FALLBACK_TEXT, SlideColor::Accent));

        let title = self.title.unwrap_or_else(|| title.to_string());
        let text = self.text.unwrap_or_else(|| text.to_string());
        let blocks = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(Block::paragraph)
            .collect();

        SlideContent::Text {
            title: Some(title),
            blocks,
            color: self.color.unwrap_or(color),
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cta_template() {
        let slide = FinalSlideBuilder::new().kind(FinalSlideKind::Cta).build();
        assert_eq!(
            slide,
            SlideContent::Text {
                title: Some("Подписывайтесь!".into()),
                blocks: vec![
                    Block::paragraph("Ставьте лайк если полезно"),
                    Block::paragraph("Больше контента в профиле"),
                ],
                color: SlideColor::Accent,
            }
        );
    }

    #[test]
    fn test_overrides_replace_template_fields() {
        let slide = FinalSlideBuilder::new()
            .kind(FinalSlideKind::Contact)
            .title("Пишите")
            .color(SlideColor::Accent)
            .build();
        match slide {
            SlideContent::Text { title, blocks, color } => {
                assert_eq!(title.as_deref(), Some("Пишите"));
                assert_eq!(blocks.len(), 3);
                assert_eq!(color, SlideColor::Accent);
            }
            other => panic!("unexpected slide {other:?}"),
        }
    }

    #[test]
    fn test_no_template_uses_fallback() {
        let slide = FinalSlideBuilder::new().text("   ").build();
        assert_eq!(
            slide,
            SlideContent::Text {
                title: Some(FALLBACK_TITLE.into()),
                blocks: vec![Block::paragraph(FALLBACK_TEXT)],
                color: SlideColor::Accent,
            }
        );
    }

    #[test]
    fn test_disabled_settings_build_nothing() {
        let settings: FinalSlideSettings =
            serde_json::from_value(json!({ "type": "brand" })).unwrap();
        assert!(FinalSlideBuilder::from_settings(&settings).is_none());
    }

    #[test]
    fn test_settings_deserialize_with_overrides() {
        let settings: FinalSlideSettings = serde_json::from_value(json!({
            "enabled": true,
            "type": "brand",
            "text": "Своя подпись",
            "color": "default"
        }))
        .unwrap();
        let slide = FinalSlideBuilder::from_settings(&settings).unwrap().build();
        assert_eq!(
            slide,
            SlideContent::Text {
                title: Some("Спасибо за внимание!".into()),
                blocks: vec![Block::paragraph("Своя подпись")],
                color: SlideColor::Default,
            }
        );
    }
}
