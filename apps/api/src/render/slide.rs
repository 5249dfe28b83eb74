//! Slide Composer: Places header, content and footer for one slide.
//!
//! # Layout
//! - Header (baseline `HEADER_FOOTER_PADDING`): optional avatar, `@username` on the
//!   left, `n/total` right-aligned.
//! - Content (first baseline `CONTENT_START_Y`): per slide kind, each text block
//!   fitted to the remaining height by the fit controller.
//! - Footer (baseline `height - HEADER_FOOTER_PADDING`): full name on the left, a
//!   next arrow on every slide but the last.
//!
//! Header and footer are drawn at `HEADER_FOOTER_OPACITY` in the base text color.

use serde::Serialize;
use tracing::debug;

use crate::content::model::{Block, SlideContent};
use crate::layout::color::{ColorDecision, SlideStyle};
use crate::layout::fit::{fit_font_size, FitOutcome, FitParams};
use crate::layout::font_cache::FontHandle;
use crate::layout::font_metrics::FontWeight;
use crate::layout::font_roles::{FontRole, FontRoleConfig};
use crate::layout::plan::PlanOrigin;
use crate::layout::surface::{DrawingSurface, EmbeddedImage};
use crate::layout::LayoutEngine;
use crate::render::geometry::*;
use crate::render::pattern::draw_decorations;

/// Share of the content height a title may use when a body follows.
const TITLE_MAX_SHARE: f32 = 0.4;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Deck-wide presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideTheme {
    pub brand_color: String,
    pub style: SlideStyle,
    pub author_username: String,
    pub author_full_name: String,
    /// Seeds the decoration outlines; slide `i` uses `pattern_seed + 2i`.
    pub pattern_seed: u32,
}

impl Default for SlideTheme {
    fn default() -> Self {
        Self {
            brand_color: "#6366F1".to_string(),
            style: SlideStyle::Default,
            author_username: "@username".to_string(),
            author_full_name: "Your Name".to_string(),
            pattern_seed: 0,
        }
    }
}

/// Position of a slide in its deck plus shared assets.
#[derive(Debug, Clone, Copy)]
pub struct SlideContext<'a> {
    /// Zero-based.
    pub index: usize,
    pub total: usize,
    pub theme: &'a SlideTheme,
    pub avatar: Option<&'a EmbeddedImage>,
}

impl SlideContext<'_> {
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.total
    }
}

/// What the composer had to do to make the content fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeReport {
    /// At least one block was drawn below its base size.
    pub adapted: bool,
    /// At least one block still overflows at its minimum size.
    pub overflow: bool,
}

impl ComposeReport {
    fn record(&mut self, outcome: &FitOutcome, base_size_px: u32) {
        self.adapted |= outcome.was_adapted(base_size_px);
        self.overflow |= outcome.overflow;
    }
}

/// One body paragraph or list item.
#[derive(Debug, Clone, PartialEq)]
struct BodyItem<'a> {
    text: &'a str,
    bullet: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

pub struct SlideComposer<'a> {
    engine: &'a LayoutEngine,
}

impl<'a> SlideComposer<'a> {
    pub fn new(engine: &'a LayoutEngine) -> Self {
        Self { engine }
    }

    pub fn compose(
        &self,
        slide: &SlideContent,
        ctx: &SlideContext<'_>,
        surface: &mut dyn DrawingSurface,
    ) -> ComposeReport {
        let colors = ColorDecision::resolve(&ctx.theme.brand_color, ctx.theme.style, slide.is_accent());
        debug!(
            slide = ctx.index + 1,
            kind = slide.kind(),
            background = %colors.background,
            text = %colors.base_text,
            accent = %colors.accent_text,
            "Composing slide"
        );

        surface.fill_background(colors.background);
        if slide.shows_abstraction() {
            let seed = ctx.theme.pattern_seed.wrapping_add((ctx.index as u32).wrapping_mul(2));
            draw_decorations(ctx.theme.style, seed, colors.base_text, surface);
        }
        self.draw_header(ctx, &colors, surface);

        let report = match slide {
            SlideContent::Intro {
                title, subtitle, ..
            } => self.draw_intro(title, subtitle.as_deref(), &colors, surface),
            SlideContent::Text { title, blocks, .. } => {
                self.draw_text_slide(title.as_deref(), blocks, &colors, surface)
            }
            SlideContent::Quote { text, size, .. } => {
                self.draw_quote(text, size.role().config(), &colors, surface)
            }
        };

        self.draw_footer(ctx, &colors, surface);
        report
    }

    // ── Header / footer ─────────────────────────────────────────────────────

    fn draw_header(&self, ctx: &SlideContext<'_>, colors: &ColorDecision, surface: &mut dyn DrawingSurface) {
        let font = self.header_font();
        let baseline = HEADER_FOOTER_PADDING;

        let mut name_x = PADDING;
        if let Some(avatar) = ctx.avatar {
            let top = baseline - AVATAR_SIZE / 2.0 - AVATAR_BASELINE_LIFT;
            surface.draw_image(avatar, PADDING, top, AVATAR_SIZE);
            name_x += AVATAR_SIZE + AVATAR_GAP;
        }
        surface.draw_text(
            &ctx.theme.author_username,
            name_x,
            baseline,
            &font,
            colors.base_text,
            HEADER_FOOTER_OPACITY,
        );

        let counter = format!("{}/{}", ctx.index + 1, ctx.total);
        self.draw_right_aligned(&counter, baseline, colors, surface);
    }

    fn draw_footer(&self, ctx: &SlideContext<'_>, colors: &ColorDecision, surface: &mut dyn DrawingSurface) {
        let font = self.header_font();
        let baseline = footer_baseline();

        surface.draw_text(
            &ctx.theme.author_full_name,
            PADDING,
            baseline,
            &font,
            colors.base_text,
            HEADER_FOOTER_OPACITY,
        );
        if !ctx.is_last() {
            self.draw_right_aligned(NEXT_ARROW, baseline, colors, surface);
        }
    }

    fn draw_right_aligned(&self, text: &str, baseline: f32, colors: &ColorDecision, surface: &mut dyn DrawingSurface) {
        let font = self.header_font();
        let width = self.engine.measure(text, &font);
        let x = CANVAS_WIDTH as f32 - PADDING - width;
        surface.draw_text(text, x, baseline, &font, colors.base_text, HEADER_FOOTER_OPACITY);
    }

    fn header_font(&self) -> FontHandle {
        let cfg = FontRole::HeaderFooter.config();
        self.engine.font(cfg.weight, cfg.size_px)
    }

    // ── Content ─────────────────────────────────────────────────────────────

    fn draw_intro(
        &self,
        title: &str,
        subtitle: Option<&str>,
        colors: &ColorDecision,
        surface: &mut dyn DrawingSurface,
    ) -> ComposeReport {
        let mut report = ComposeReport::default();
        let width = content_width();
        let title_cfg = FontRole::IntroTitle.config();
        let sub_cfg = FontRole::IntroSubtitle.config();
        let subtitle = subtitle.filter(|s| !s.trim().is_empty());

        // Reserve the subtitle at its base size, then give the title the rest.
        let reserved = subtitle.map_or(0.0, |s| {
            H2_TO_P + self.engine.line_count(s, width, &sub_cfg, sub_cfg.size_px) as f32 * sub_cfg.line_height()
        });
        let title_fit = self.fit_block(title, &title_cfg, width, content_height() - reserved);
        report.record(&title_fit, title_cfg.size_px);

        let origin = PlanOrigin::new(PADDING, CONTENT_START_Y);
        let plan = self.engine.layout_block(title, origin, width, &title_cfg.at_size(title_fit.size_px), colors);
        plan.draw(surface);

        if let Some(subtitle) = subtitle {
            let remaining = content_height() - plan.height - H2_TO_P;
            let sub_fit = self.fit_block(subtitle, &sub_cfg, width, remaining);
            report.record(&sub_fit, sub_cfg.size_px);

            let origin = PlanOrigin::new(PADDING, CONTENT_START_Y + plan.height + H2_TO_P);
            self.engine
                .layout_block(subtitle, origin, width, &sub_cfg.at_size(sub_fit.size_px), colors)
                .draw_with_opacity(surface, SUBTITLE_OPACITY);
        }
        report
    }

    fn draw_text_slide(
        &self,
        title: Option<&str>,
        blocks: &[Block],
        colors: &ColorDecision,
        surface: &mut dyn DrawingSurface,
    ) -> ComposeReport {
        let mut report = ComposeReport::default();
        let width = content_width();
        let items = body_items(blocks);
        let title = title.filter(|t| !t.trim().is_empty());
        let mut y = CONTENT_START_Y;

        if let Some(title) = title {
            let (role, max_height) = if items.is_empty() {
                (FontRole::TitleOnly, content_height())
            } else {
                (FontRole::TitleWithContent, content_height() * TITLE_MAX_SHARE)
            };
            let cfg = role.config();
            let fit = self.fit_block(title, &cfg, width, max_height);
            report.record(&fit, cfg.size_px);

            let plan = self
                .engine
                .layout_block(title, PlanOrigin::new(PADDING, y), width, &cfg.at_size(fit.size_px), colors);
            plan.draw(surface);
            y += plan.height;
            if !items.is_empty() {
                y += H2_TO_P;
            }
        }

        if items.is_empty() {
            return report;
        }

        let body_cfg = FontRole::Body.config();
        let gaps = P_TO_P * (items.len() - 1) as f32;
        let available = CONTENT_START_Y + content_height() - y - gaps;
        let fit = fit_font_size(&FitParams::for_role(&body_cfg, available), |size| {
            items
                .iter()
                .map(|item| {
                    let item_width = width - self.bullet_indent(item, size);
                    self.engine.line_count(item.text, item_width, &body_cfg, size)
                })
                .sum()
        });
        report.record(&fit, body_cfg.size_px);

        let cfg = body_cfg.at_size(fit.size_px);
        let marker_font = self.engine.font(FontWeight::Bold, fit.size_px);
        for (i, item) in items.iter().enumerate() {
            let indent = self.bullet_indent(item, fit.size_px);
            if item.bullet {
                surface.draw_text(BULLET_MARKER, PADDING, y, &marker_font, colors.base_text, 1.0);
            }
            let plan = self
                .engine
                .layout_block(item.text, PlanOrigin::new(PADDING + indent, y), width - indent, &cfg, colors);
            plan.draw(surface);
            y += plan.height;
            if i + 1 < items.len() {
                y += P_TO_P;
            }
        }
        report
    }

    fn draw_quote(
        &self,
        text: &str,
        cfg: FontRoleConfig,
        colors: &ColorDecision,
        surface: &mut dyn DrawingSurface,
    ) -> ComposeReport {
        let mut report = ComposeReport::default();
        let width = content_width();
        let fit = self.fit_block(text, &cfg, width, content_height());
        report.record(&fit, cfg.size_px);

        let top = CONTENT_START_Y + ((content_height() - fit.height()) / 2.0).max(0.0);
        self.engine
            .layout_block(text, PlanOrigin::new(PADDING, top), width, &cfg.at_size(fit.size_px), colors)
            .draw(surface);
        report
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    fn fit_block(&self, text: &str, cfg: &FontRoleConfig, width: f32, max_height: f32) -> FitOutcome {
        fit_font_size(&FitParams::for_role(cfg, max_height), |size| {
            self.engine.line_count(text, width, cfg, size)
        })
    }

    /// Horizontal offset of a list item's text: the marker, a space and the gap.
    fn bullet_indent(&self, item: &BodyItem<'_>, size_px: u32) -> f32 {
        if !item.bullet {
            return 0.0;
        }
        let font = self.engine.font(FontWeight::Bold, size_px);
        self.engine.measure(&format!("{BULLET_MARKER} "), &font) + BULLET_GAP
    }
}

/// Flattens blocks into drawable paragraphs: one per non-empty paragraph line,
/// one bullet per list item. Paragraph lines starting with `•` are bullets too.
fn body_items(blocks: &[Block]) -> Vec<BodyItem<'_>> {
    let mut items = Vec::new();
    for block in blocks {
        match block {
            Block::Paragraph { text } => {
                for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    match line.strip_prefix('•') {
                        Some(rest) => items.push(BodyItem {
                            text: rest.trim_start(),
                            bullet: true,
                        }),
                        None => items.push(BodyItem {
                            text: line,
                            bullet: false,
                        }),
                    }
                }
            }
            Block::List { items: list } => {
                items.extend(
                    list.iter()
                        .map(|i| i.trim())
                        .filter(|i| !i.is_empty())
                        .map(|text| BodyItem { text, bullet: true }),
                );
            }
        }
    }
    items
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::content::model::{QuoteSize, SlideColor};
    use crate::layout::color::{Rgb, DARK_TEXT, DEFAULT_BACKGROUND};
    use crate::layout::measure::MetricTableMeasurer;
    use crate::layout::surface::tests::{DrawCall, RecordingSurface};

    fn engine() -> LayoutEngine {
        LayoutEngine::new(Arc::new(MetricTableMeasurer))
    }

    fn compose(slide: &SlideContent, index: usize, total: usize, avatar: Option<&EmbeddedImage>) -> (RecordingSurface, ComposeReport) {
        compose_themed(slide, &SlideTheme::default(), index, total, avatar)
    }

    fn compose_themed(
        slide: &SlideContent,
        theme: &SlideTheme,
        index: usize,
        total: usize,
        avatar: Option<&EmbeddedImage>,
    ) -> (RecordingSurface, ComposeReport) {
        let engine = engine();
        let ctx = SlideContext {
            index,
            total,
            theme,
            avatar,
        };
        let mut surface = RecordingSurface::default();
        let report = SlideComposer::new(&engine).compose(slide, &ctx, &mut surface);
        (surface, report)
    }

    fn text_call<'a>(surface: &'a RecordingSurface, needle: &str) -> Option<&'a DrawCall> {
        surface
            .calls
            .iter()
            .find(|c| matches!(c, DrawCall::Text { text, .. } if text == needle))
    }

    fn text_slide(blocks: Vec<Block>) -> SlideContent {
        SlideContent::Text {
            title: Some("Заголовок".into()),
            blocks,
            color: SlideColor::Default,
        }
    }

    #[test]
    fn test_accent_intro_uses_brand_background() {
        let slide = SlideContent::Intro {
            title: "Как расти быстрее".into(),
            subtitle: Some("Пять привычек".into()),
            color: SlideColor::Accent,
            show_abstraction: None,
        };
        let (surface, report) = compose(&slide, 0, 3, None);

        assert_eq!(surface.calls[0], DrawCall::Background(Rgb::new(0x63, 0x66, 0xf1)));
        assert!(!report.adapted);
        match text_call(&surface, "Как расти быстрее") {
            Some(DrawCall::Text { y, x, .. }) => {
                assert_eq!(*y, CONTENT_START_Y);
                assert_eq!(*x, PADDING);
            }
            other => panic!("title not drawn: {other:?}"),
        }
        match text_call(&surface, "Пять привычек") {
            Some(DrawCall::Text { y, opacity, .. }) => {
                assert_eq!(*y, CONTENT_START_Y + 141.0 + H2_TO_P);
                assert_eq!(*opacity, SUBTITLE_OPACITY);
            }
            other => panic!("subtitle not drawn: {other:?}"),
        }
    }

    #[test]
    fn test_header_counter_is_right_aligned() {
        let slide = text_slide(vec![Block::paragraph("Текст")]);
        let (surface, _) = compose(&slide, 1, 5, None);
        let engine = engine();
        let font = engine.font(FontWeight::Normal, 48);
        let width = engine.measure("2/5", &font);

        match text_call(&surface, "2/5") {
            Some(DrawCall::Text { x, y, opacity, .. }) => {
                assert!((x + width - (CANVAS_WIDTH as f32 - PADDING)).abs() < 1e-3);
                assert_eq!(*y, HEADER_FOOTER_PADDING);
                assert_eq!(*opacity, HEADER_FOOTER_OPACITY);
            }
            other => panic!("counter not drawn: {other:?}"),
        }
    }

    #[test]
    fn test_next_arrow_only_before_last_slide() {
        let slide = text_slide(vec![Block::paragraph("Текст")]);
        let (middle, _) = compose(&slide, 0, 2, None);
        let (last, _) = compose(&slide, 1, 2, None);
        let arrows = |s: &RecordingSurface| s.texts().iter().filter(|t| **t == NEXT_ARROW).count();
        assert_eq!(arrows(&middle), 1);
        assert_eq!(arrows(&last), 0);
    }

    #[test]
    fn test_avatar_shifts_username() {
        let avatar = EmbeddedImage::new("image/png", Bytes::from_static(b"png"));
        let slide = text_slide(vec![]);
        let (surface, _) = compose(&slide, 0, 1, Some(&avatar));

        assert!(surface.calls.contains(&DrawCall::Image {
            x: PADDING,
            y: 133.0,
            size: AVATAR_SIZE
        }));
        match text_call(&surface, "@username") {
            Some(DrawCall::Text { x, .. }) => assert_eq!(*x, PADDING + AVATAR_SIZE + AVATAR_GAP),
            other => panic!("username not drawn: {other:?}"),
        }
    }

    #[test]
    fn test_list_items_get_markers_and_indent() {
        let slide = text_slide(vec![Block::List {
            items: vec!["Первый".into(), "Второй".into()],
        }]);
        let (surface, _) = compose(&slide, 0, 1, None);

        let markers = surface.texts().iter().filter(|t| **t == BULLET_MARKER).count();
        assert_eq!(markers, 2);
        match text_call(&surface, "Первый") {
            Some(DrawCall::Text { x, .. }) => assert!(*x > PADDING + BULLET_GAP),
            other => panic!("item not drawn: {other:?}"),
        }
    }

    #[test]
    fn test_paragraph_gaps_between_blocks() {
        let slide = SlideContent::Text {
            title: None,
            blocks: vec![Block::paragraph("Один"), Block::paragraph("Два")],
            color: SlideColor::Default,
        };
        let (surface, _) = compose(&slide, 0, 1, None);
        let y_of = |t: &str| match text_call(&surface, t) {
            Some(DrawCall::Text { y, .. }) => *y,
            other => panic!("{t} not drawn: {other:?}"),
        };
        // Body line height at 64px is 90.
        assert_eq!(y_of("Один"), CONTENT_START_Y);
        assert_eq!(y_of("Два"), CONTENT_START_Y + 90.0 + P_TO_P);
    }

    #[test]
    fn test_overlong_body_is_shrunk() {
        let paragraph = "Очень длинный абзац с большим количеством слов и деталей. ".repeat(6);
        let blocks = (0..6).map(|_| Block::paragraph(paragraph.clone())).collect();
        let (_, report) = compose(&text_slide(blocks), 0, 1, None);
        assert!(report.adapted);
    }

    #[test]
    fn test_quote_is_vertically_centered() {
        let slide = SlideContent::Quote {
            text: "Коротко".into(),
            size: QuoteSize::Large,
            color: SlideColor::Accent,
            show_abstraction: None,
        };
        let (surface, _) = compose(&slide, 0, 1, None);
        match text_call(&surface, "Коротко") {
            Some(DrawCall::Text { y, .. }) => {
                // One 115px line centred in the content box.
                assert_eq!(*y, CONTENT_START_Y + (content_height() - 115.0) / 2.0);
            }
            other => panic!("quote not drawn: {other:?}"),
        }
    }

    #[test]
    fn test_default_slide_has_white_background_and_dark_text() {
        let slide = text_slide(vec![Block::paragraph("Текст")]);
        let (surface, _) = compose(&slide, 0, 1, None);
        assert_eq!(surface.calls[0], DrawCall::Background(DEFAULT_BACKGROUND));
        match text_call(&surface, "Текст") {
            Some(DrawCall::Text { color, .. }) => assert_eq!(*color, DARK_TEXT),
            other => panic!("body not drawn: {other:?}"),
        }
    }

    fn intro(show_abstraction: Option<bool>) -> SlideContent {
        SlideContent::Intro {
            title: "Заголовок".into(),
            subtitle: None,
            color: SlideColor::Default,
            show_abstraction,
        }
    }

    #[test]
    fn test_intro_draws_decoration_behind_text() {
        let (surface, _) = compose(&intro(None), 0, 2, None);
        assert_eq!(surface.paths(), vec![(DARK_TEXT, 0.1)]);
        assert!(matches!(surface.calls[1], DrawCall::Path { .. }));
    }

    #[test]
    fn test_decoration_can_be_turned_off() {
        let (surface, _) = compose(&intro(Some(false)), 0, 2, None);
        assert!(surface.paths().is_empty());

        let (surface, _) = compose(&text_slide(vec![Block::paragraph("Текст")]), 0, 2, None);
        assert!(surface.paths().is_empty());
    }

    #[test]
    fn test_bright_quote_draws_two_shapes_in_text_color() {
        let theme = SlideTheme {
            style: SlideStyle::Bright,
            ..SlideTheme::default()
        };
        let quote = SlideContent::Quote {
            text: "Цитата".into(),
            size: QuoteSize::Medium,
            color: SlideColor::Accent,
            show_abstraction: Some(true),
        };
        let (surface, _) = compose_themed(&quote, &theme, 0, 1, None);
        let colors = ColorDecision::resolve(&theme.brand_color, SlideStyle::Bright, true);
        assert_eq!(
            surface.paths(),
            vec![(colors.base_text, 0.15), (colors.base_text, 0.08)]
        );
    }

    #[test]
    fn test_decoration_depends_on_seed_and_position() {
        let draw = |seed: u32, index: usize| {
            let theme = SlideTheme {
                pattern_seed: seed,
                ..SlideTheme::default()
            };
            compose_themed(&intro(None), &theme, index, 3, None)
                .0
                .calls
                .into_iter()
                .find(|c| matches!(c, DrawCall::Path { .. }))
        };
        assert_eq!(draw(9, 1), draw(9, 1));
        assert_ne!(draw(9, 1), draw(10, 1));
        assert_ne!(draw(9, 0), draw(9, 1));
    }

    #[test]
    fn test_malformed_brand_on_accent_slide_gets_dark_text() {
        let theme = SlideTheme {
            brand_color: "not-a-color".into(),
            ..SlideTheme::default()
        };
        let slide = SlideContent::Intro {
            title: "Заголовок".into(),
            subtitle: None,
            color: SlideColor::Accent,
            show_abstraction: Some(false),
        };
        let (surface, _) = compose_themed(&slide, &theme, 0, 1, None);
        assert_eq!(surface.calls[0], DrawCall::Background(Rgb::new(0x63, 0x66, 0xf1)));
        match text_call(&surface, "Заголовок") {
            Some(DrawCall::Text { color, .. }) => assert_eq!(*color, DARK_TEXT),
            other => panic!("title not drawn: {other:?}"),
        }
    }

    #[test]
    fn test_body_items_flatten_blocks() {
        let blocks = vec![
            Block::paragraph("one\n\n• two\nthree"),
            Block::List {
                items: vec!["four".into(), "  ".into()],
            },
        ];
        let items = body_items(&blocks);
        let flat: Vec<(&str, bool)> = items.iter().map(|i| (i.text, i.bullet)).collect();
        assert_eq!(
            flat,
            vec![("one", false), ("two", true), ("three", false), ("four", true)]
        );
    }
}
