mod avatar;
mod config;
mod content;
mod errors;
mod layout;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::avatar::HttpAvatarSource;
use crate::config::Config;
use crate::layout::color::Rgb;
use crate::render::pipeline::SlideRenderer;
use crate::render::svg::SvgRasterizer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carousel API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = Rgb::from_hex(&config.brand_color) {
        tracing::warn!("BRAND_COLOR is invalid ({e}); slides will use the fallback brand color");
    }

    // Initialize the drawing backend and its layout engine
    let renderer = Arc::new(SlideRenderer::new(Arc::new(SvgRasterizer::new())));
    info!("Renderer initialized (format: {})", renderer.format().as_str());

    // Initialize avatar loader
    let avatars = Arc::new(HttpAvatarSource::new(Duration::from_secs(
        config.avatar_timeout_secs,
    ))?);
    info!("Avatar loader initialized (timeout: {}s)", config.avatar_timeout_secs);

    // Build app state
    let state = AppState {
        config: config.clone(),
        renderer,
        avatars,
    };

    // Build router
    let app = build_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
