// HTTP API
// Router assembly, shared state and server entry point

mod config;
mod error;
mod health;
mod middleware;
mod themes;

use std::future::Future;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
};

use crate::config::ServerConfig;
use crate::services::{
    AuthError, ConfigStore, JellyfinClient, RepositoryError, ThemeRepositoryClient, ThemeStore, ThemeStoreError,
};

pub use error::{ApiError, ErrorResponse};
pub use middleware::request_token;
pub use themes::ThemeIdResponse;

#[derive(Clone)]
pub struct AppState {
    pub theme_store: Arc<ThemeStore>,
    pub config_store: Arc<ConfigStore>,
    pub jellyfin: JellyfinClient,
    pub theme_repository: Arc<ThemeRepositoryClient>,
    pub rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    ThemeStore(#[from] ThemeStoreError),

    #[error("Failed to build Jellyfin client: {0}")]
    Jellyfin(#[from] AuthError),

    #[error("Failed to build theme repository client: {0}")]
    Repository(#[from] RepositoryError),
}

impl AppState {
    /// Open the stores and build the outbound clients. Fails if the themes
    /// directory cannot be created or read.
    pub fn from_config(config: &ServerConfig) -> Result<Self, StartupError> {
        let theme_store = ThemeStore::open(config.themes_dir.clone(), config.theme_write_mode)?;

        let rate_limit = NonZeroU32::new(config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            theme_store: Arc::new(theme_store),
            config_store: Arc::new(ConfigStore::new(config.config_path.clone())),
            jellyfin: JellyfinClient::new()?,
            theme_repository: Arc::new(ThemeRepositoryClient::new(&config.theme_repository_url)?),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rate_limit))),
        })
    }
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-emby-token"),
            HeaderName::from_static("x-jellyfin-url"),
        ]);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let allowed_origins = origins.to_vec();
    cors.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let origin_str = match origin.to_str() {
            Ok(s) => s,
            Err(_) => return false,
        };

        allowed_origins.iter().any(|allowed| origin_matches(allowed, origin_str))
    }))
}

/// `http://localhost:*` matches any port on that host
fn origin_matches(allowed: &str, origin: &str) -> bool {
    match allowed.strip_suffix(":*") {
        Some(prefix) => {
            origin.starts_with(prefix)
                && origin[prefix.len()..]
                    .strip_prefix(':')
                    .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
        }
        None => origin == allowed,
    }
}

pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let mut protected_routes = Router::new()
        .route("/api/config", post(config::update_config).put(config::update_config))
        .route("/api/themes", post(themes::create_theme))
        .route(
            "/api/themes/:id",
            put(themes::update_theme).delete(themes::delete_theme),
        )
        .route(
            "/api/themes/repository/:id/install",
            post(themes::install_repository_theme),
        );

    if config.auth_enabled {
        protected_routes =
            protected_routes.layer(axum_middleware::from_fn_with_state(state.clone(), middleware::require_admin));
    }

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api/config", get(config::get_config))
        .route("/api/themes", get(themes::list_themes))
        .route("/api/themes/repository", get(themes::repository_index))
        .route("/api/themes/:id", get(themes::get_theme));

    let mut app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state.clone())
        .layer(axum_middleware::from_fn_with_state(state, middleware::rate_limit));

    if let Some(origins) = &config.cors_origins {
        app = app.layer(build_cors_layer(origins));
    }

    app = app.layer(axum_middleware::from_fn(middleware::log_requests));

    // Optionally serve the built frontend
    if let Some(ui_dir) = &config.ui_dir {
        if ui_dir.is_dir() {
            log::info!("Serving UI from {}", ui_dir.display());
            app = app.fallback_service(ServeDir::new(ui_dir).fallback(ServeFile::new(ui_dir.join("index.html"))));
        } else {
            log::warn!("UI_DIR {} is not a directory, static UI disabled", ui_dir.display());
        }
    }

    app
}

/// Run the router on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}
