use std::sync::Arc;

use crate::avatar::AvatarSource;
use crate::config::Config;
use crate::render::pipeline::SlideRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Rasterizer plus layout engine, shared by every render task.
    pub renderer: Arc<SlideRenderer>,
    /// Pluggable avatar loader. Default: HttpAvatarSource.
    pub avatars: Arc<dyn AvatarSource>,
}
