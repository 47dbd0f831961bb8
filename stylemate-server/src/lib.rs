//! stylemate-server library - Remote Collection API
//!
//! Per-user clothing items, outfits and profile over HTTP, an image blob
//! store, and thin endpoints in front of the AI gateway.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use stylemate_ai::StyleGateway;
use stylemate_common::auth::TokenVerifier;
use stylemate_common::config::DEFAULT_MAX_BODY_BYTES;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Server database (all users)
    pub db: SqlitePool,
    /// Bearer token verification for protected routes
    pub verifier: Arc<TokenVerifier>,
    /// Absent when no Gemini API key is configured
    pub gateway: Option<StyleGateway>,
    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(db: SqlitePool, verifier: TokenVerifier) -> Self {
        Self {
            db,
            verifier: Arc::new(verifier),
            gateway: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_gateway(mut self, gateway: StyleGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Gateway, or a 500 when the model is not configured
    pub fn require_gateway(&self) -> ApiResult<&StyleGateway> {
        self.gateway
            .as_ref()
            .ok_or_else(|| ApiError::Internal("GEMINI_API_KEY not configured".to_string()))
    }
}

/// Build application router
///
/// Protected routes require a bearer token; image downloads, health and build
/// info are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    // Protected routes (require authentication)
    let protected = Router::new()
        .route(
            "/api/items",
            get(api::list_items).post(api::create_item).delete(api::delete_item),
        )
        .route("/api/items/:id/tags", put(api::set_item_tags))
        .route(
            "/api/outfits",
            get(api::list_outfits).post(api::create_outfit).delete(api::delete_outfit),
        )
        .route(
            "/api/profile",
            get(api::get_profile).put(api::put_profile).delete(api::clear_profile),
        )
        .route("/api/images", post(api::upload_image))
        .route("/api/images/:id", delete(api::delete_image))
        .route("/api/generate-outfits", post(api::generate_outfits))
        .route("/api/classify", post(api::classify))
        .route("/api/extract-traits", post(api::extract_traits))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/images/:id", get(api::download_image))
        .merge(api::service_routes());

    let body_limit = state.max_body_bytes;

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
