use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::content::final_slide::FinalSlideSettings;
use crate::content::model::SlideContent;
use crate::content::{
    prepare_slides, slides_from_markdown, DeckStats, MaxSlides, PrepareOptions, MAX_SLIDES_RANGE,
};
use crate::errors::AppError;
use crate::layout::color::SlideStyle;
use crate::render::backend::{ImageFormat, RenderedImage};
use crate::render::pipeline::render_carousel;
use crate::render::slide::SlideTheme;
use crate::state::AppState;

/// Longest accepted markdown input, in characters.
pub const MAX_TEXT_CHARS: usize = 50_000;
/// Most slide descriptors accepted in one request.
pub const MAX_SLIDES: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Request / response models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub style: SlideStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_slide: Option<FinalSlideSettings>,
    #[serde(default)]
    pub max_slides: MaxSlides,
    /// Seed of the decoration shapes; random per request when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_seed: Option<u32>,
}

impl CarouselSettings {
    fn theme(&self, default_brand: &str, request_id: Uuid) -> SlideTheme {
        let defaults = SlideTheme::default();
        SlideTheme {
            brand_color: non_blank(&self.brand_color).unwrap_or(default_brand).to_string(),
            style: self.style,
            author_username: non_blank(&self.author_username)
                .map_or(defaults.author_username, str::to_string),
            author_full_name: non_blank(&self.author_full_name)
                .map_or(defaults.author_full_name, str::to_string),
            pattern_seed: self.pattern_seed.unwrap_or(request_id.as_u128() as u32),
        }
    }
}

/// Either markdown `text` or ready-made `slides`. `slides` wins when both are set.
#[derive(Debug, Deserialize)]
pub struct CarouselRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub slides: Option<Vec<SlideContent>>,
    #[serde(default)]
    pub settings: CarouselSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselMetadata {
    pub request_id: Uuid,
    pub total_slides: usize,
    pub generated_at: String,
    pub processing_time_ms: u64,
    pub adapted_slides: Vec<usize>,
    pub failed_slides: Vec<usize>,
    pub settings: CarouselSettings,
}

#[derive(Debug, Serialize)]
pub struct CarouselResponse {
    pub slides: Vec<SlideContent>,
    /// Base64-encoded images, one per slide, in slide order.
    pub images: Vec<String>,
    pub format: ImageFormat,
    pub metadata: CarouselMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewMetadata {
    pub total_slides: usize,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub slides: Vec<SlideContent>,
    pub stats: DeckStats,
    pub metadata: PreviewMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/styles
pub async fn handle_styles() -> Json<Value> {
    let styles: Vec<Value> = SlideStyle::ALL
        .iter()
        .map(|style| {
            let (name, description) = style_label(*style);
            json!({ "id": style.as_str(), "name": name, "description": description })
        })
        .collect();
    Json(json!({ "count": styles.len(), "styles": styles }))
}

/// POST /api/preview-slides
pub async fn handle_preview_slides(
    State(state): State<AppState>,
    Json(req): Json<CarouselRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    let (slides, stats) = build_deck(&state, &req)?;
    Ok(Json(PreviewResponse {
        metadata: PreviewMetadata {
            total_slides: slides.len(),
            generated_at: Utc::now().to_rfc3339(),
        },
        slides,
        stats,
    }))
}

/// POST /api/generate-carousel
pub async fn handle_generate_carousel(
    State(state): State<AppState>,
    Json(req): Json<CarouselRequest>,
) -> Result<Json<CarouselResponse>, AppError> {
    let started = Instant::now();
    let request_id = Uuid::new_v4();

    let (slides, _) = build_deck(&state, &req)?;
    let theme = req.settings.theme(&state.config.brand_color, request_id);

    let avatar = match non_blank(&req.settings.avatar_url) {
        Some(url) => match state.avatars.fetch(url).await {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                warn!(%request_id, error = %e, "Avatar unavailable, rendering without it");
                None
            }
        },
        None => None,
    };

    info!(
        %request_id,
        slides = slides.len(),
        style = theme.style.as_str(),
        avatar = avatar.is_some(),
        "Generating carousel"
    );

    let slides = Arc::new(slides);
    let output = render_carousel(
        Arc::clone(&state.renderer),
        Arc::clone(&slides),
        Arc::new(theme),
        avatar,
    )
    .await;

    if !output.failed_slides.is_empty() {
        warn!(%request_id, failed = ?output.failed_slides, "Some slides were replaced by placeholders");
    }

    let processing_time_ms = started.elapsed().as_millis() as u64;
    info!(%request_id, processing_time_ms, "Carousel generated");

    let slides = Arc::try_unwrap(slides).unwrap_or_else(|shared| (*shared).clone());
    Ok(Json(CarouselResponse {
        images: output.images.iter().map(RenderedImage::to_base64).collect(),
        format: state.renderer.format(),
        metadata: CarouselMetadata {
            request_id,
            total_slides: slides.len(),
            generated_at: Utc::now().to_rfc3339(),
            processing_time_ms,
            adapted_slides: output.adapted_slides,
            failed_slides: output.failed_slides,
            settings: req.settings,
        },
        slides,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

/// Validates the request and turns it into a prepared deck.
fn build_deck(state: &AppState, req: &CarouselRequest) -> Result<(Vec<SlideContent>, DeckStats), AppError> {
    let final_slide = req.settings.final_slide.as_ref();
    if let MaxSlides::Count(n) = req.settings.max_slides {
        if !MAX_SLIDES_RANGE.contains(&n) {
            return Err(AppError::Validation(format!(
                "maxSlides must be between {} and {} or \"auto\"",
                MAX_SLIDES_RANGE.start(),
                MAX_SLIDES_RANGE.end()
            )));
        }
    }
    let options = PrepareOptions {
        max_slides: req.settings.max_slides,
        ..state.config.prepare_options()
    };

    if let Some(slides) = &req.slides {
        if slides.is_empty() {
            return Err(AppError::Validation("At least one slide is required".into()));
        }
        if slides.len() > MAX_SLIDES {
            return Err(AppError::Validation(format!("At most {MAX_SLIDES} slides are allowed")));
        }
        return Ok(prepare_slides(slides.clone(), final_slide, &options));
    }

    let text = req.text.as_deref().unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".into()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "Text is too long (max {MAX_TEXT_CHARS} characters)"
        )));
    }
    Ok(slides_from_markdown(text, final_slide, &options))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn style_label(style: SlideStyle) -> (&'static str, &'static str) {
    match style {
        SlideStyle::Default => ("Минималистичный", "Чистый и современный дизайн"),
        SlideStyle::Bright => ("Яркий", "Динамичный стиль с выразительными элементами"),
        SlideStyle::Elegant => ("Элегантный", "Изысканный дизайн с балансированными пропорциями"),
    }
}
