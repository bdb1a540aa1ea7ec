//! # HTTP Server
//!
//! Thin axum adapter over the core. Paths match what the existing
//! dashboard and game page call.
//!
//! ```text
//! POST   /submit, /story_data       story JSON → start session story
//! GET    /new_chapter_from_choice   ?choice=   → advance, return view
//! GET    /story_image_data                     → current chapter view
//! GET    /make_image_from_text      ?text=     → proxied image bytes
//! DELETE /session                              → end session
//! GET    /health
//! ```

pub mod error;
pub mod routes;
pub mod view;

use std::io;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{delete, get, post};
use log::{info, warn};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::ImageBackend;
use crate::core::SessionRegistry;
use crate::core::config::ResolvedConfig;
use crate::images::{
    FixedImageProvider, ImageError, ImageFetcher, ImageProvider, ImageSettings,
    OpenAiImageProvider,
};

pub use error::ApiError;
pub use view::{ChapterView, IMAGE_ROUTE};

/// Shared handles every request needs. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub images: Arc<dyn ImageProvider>,
    pub fetcher: Arc<ImageFetcher>,
    pub demo_story: bool,
}

impl AppState {
    pub fn new(images: Arc<dyn ImageProvider>, fetcher: ImageFetcher, demo_story: bool) -> Self {
        Self {
            sessions: Arc::new(SessionRegistry::new()),
            images,
            fetcher: Arc::new(fetcher),
            demo_story,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, ImageError> {
        let provider = build_provider(config)?;
        info!("Image provider: {}", provider.name());
        Ok(Self::new(
            provider,
            ImageFetcher::new(config.archive_dir.clone()),
            config.demo_story,
        ))
    }
}

/// Builds the configured image provider.
pub fn build_provider(config: &ResolvedConfig) -> Result<Arc<dyn ImageProvider>, ImageError> {
    match config.image_backend {
        ImageBackend::OpenAi => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                ImageError::Config(
                    "no OpenAI API key; set OPENAI_API_KEY or images.api_key, \
                     or use the fixed provider"
                        .to_string(),
                )
            })?;
            let settings = ImageSettings {
                model: config.image_model.clone(),
                size: config.image_size.clone(),
                quality: config.image_quality.clone(),
            };
            Ok(Arc::new(OpenAiImageProvider::new(
                api_key,
                Some(config.openai_base_url.clone()),
                settings,
            )))
        }
        ImageBackend::Fixed => Ok(Arc::new(FixedImageProvider::new(Some(
            config.fixed_image_url.clone(),
        )))),
    }
}

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/submit", post(routes::submit))
        .route("/story_data", post(routes::submit))
        .route("/new_chapter_from_choice", get(routes::choose))
        .route("/story_image_data", get(routes::current_chapter))
        .route(IMAGE_ROUTE, get(routes::image))
        .route("/session", delete(routes::end_session))
        .route("/health", get(routes::health))
        .with_state(state);

    match cors_layer(allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Credentialed CORS for the listed origins, or `None` if there are none.
fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

/// Binds `config.bind` and serves until the process is stopped.
pub async fn serve(config: &ResolvedConfig) -> io::Result<()> {
    let state = AppState::from_config(config).map_err(io::Error::other)?;
    let app = router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
