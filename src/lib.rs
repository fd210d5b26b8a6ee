// Library exports for binary tools and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod workflow;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use services::{sessions::SessionRegistry, store::RatingStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RatingStore>,
    pub sessions: Arc<SessionRegistry>,
    pub redis: Option<redis::aio::MultiplexedConnection>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn RatingStore>, config: Arc<Config>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionRegistry::new()),
            redis: None,
            config,
        }
    }

    pub fn with_redis(mut self, redis: redis::aio::MultiplexedConnection) -> Self {
        self.redis = Some(redis);
        self
    }
}

/// Allows localhost during development plus the configured app origin.
fn cors_layer(base_url: String) -> CorsLayer {
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let o = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };
        o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") || o == base_url
    });

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_origin(cors_origin)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.app_base_url.clone());

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .route("/weekdays", get(routes::ratings::list_weekdays))
        // Ratings
        .route("/ratings", get(routes::ratings::list_ratings).post(routes::ratings::create_rating))
        .route("/ratings/overview", get(routes::ratings::get_overview))
        // Workflow sessions
        .route("/sessions", post(routes::sessions::create_session))
        .route(
            "/sessions/{id}",
            get(routes::sessions::get_session).delete(routes::sessions::end_session),
        )
        .route("/sessions/{id}/actions", post(routes::sessions::dispatch_action))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Ratings are small; 64 KiB leaves room for long comments
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}
