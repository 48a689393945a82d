//! Outreach Content Backend
//!
//! Reviews, news articles, team members, statistics and like/view counters for the
//! outreach website, persisted in a key-value document store and edited through a
//! session-gated admin API.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod store;
mod upload;
mod validation;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionManager;
use config::{Config, LogFormat};
use db::Repository;
use store::{DocumentStore, LocalBlobStore};
use upload::ImageUploader;

/// Room for form fields next to the largest accepted image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Arc<SessionManager>,
    pub uploader: Arc<ImageUploader>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!("Starting Outreach Content Backend");
    tracing::info!("Store: {}", config.store_url);
    tracing::info!("Upload directory: {:?}", config.upload_dir);
    tracing::info!("Bind address: {}", config.bind_addr);

    let password = match config.require_admin_password() {
        Ok(password) => password.to_string(),
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };
    if !config.secure_cookies {
        tracing::warn!("Session cookies are not marked Secure (OUTREACH_ENV is not production)");
    }

    // Connect the document store
    let store = store::connect(&config.store_url).await?;
    if let Err(e) = store.ping().await {
        tracing::warn!("Document store did not answer ping: {}", e);
    }

    let blobs = Arc::new(LocalBlobStore::new(
        config.upload_dir.clone(),
        &config.public_media_url,
    ));
    let uploader = Arc::new(ImageUploader::new(blobs, config.max_upload_bytes));

    let state = AppState {
        repo: Arc::new(Repository::new(store.clone(), uploader.clone())),
        sessions: Arc::new(SessionManager::new(
            store.clone(),
            password,
            config.session_ttl,
        )),
        store,
        uploader,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Admin routes, all behind a live session
    let admin_routes = Router::new()
        .route("/initialize", post(api::initialize_content))
        // Reviews
        .route("/reviews", get(api::list_reviews).post(api::create_review))
        .route(
            "/reviews/{id}",
            put(api::update_review).delete(api::delete_review),
        )
        // Articles
        .route(
            "/articles",
            get(api::list_all_articles).post(api::create_article),
        )
        .route(
            "/articles/{id}",
            put(api::update_article).delete(api::delete_article),
        )
        // People
        .route("/people", get(api::list_all_people).post(api::create_person))
        .route("/people/reorder", put(api::reorder_people))
        .route(
            "/people/{id}",
            put(api::update_person).delete(api::delete_person),
        )
        .route("/people/{id}/move", post(api::move_person))
        // Stats
        .route("/stats/homepage", put(api::update_homepage_stats))
        .route("/stats/chapters/{chapter}", put(api::update_chapter_stats))
        // Counters
        .route("/views", get(api::list_views))
        .route("/views/{id}", put(api::set_views).delete(api::reset_views))
        .route("/views/{id}/initialize", post(api::initialize_views))
        .route("/likes/initialize", post(api::initialize_likes))
        // Uploads
        .route("/upload", post(api::upload_image))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            auth::require_session,
        ));

    // Public API routes
    let api_routes = Router::new()
        .route("/reviews", get(api::list_reviews))
        .route("/articles", get(api::list_published_articles))
        .route("/articles/{slug}", get(api::get_article))
        .route("/articles/{slug}/view", post(api::record_article_view))
        .route("/people", get(api::list_people))
        .route("/stats/homepage", get(api::get_homepage_stats))
        .route("/stats/chapters/{chapter}", get(api::get_chapter_stats))
        .route("/counters/likes", get(api::get_like_counts))
        .route(
            "/counters/{id}/likes",
            get(api::get_likes).post(api::toggle_like),
        )
        .route(
            "/counters/{id}/views",
            get(api::get_views).post(api::increment_views),
        )
        // Session
        .route("/admin/login", post(api::login))
        .route("/admin/logout", post(api::logout))
        .route("/admin/session", get(api::session_status))
        .nest("/admin", admin_routes);

    let mut app = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check));

    if let Some(mount) = state.config.media_mount() {
        app = app.nest_service(mount, ServeDir::new(&state.config.upload_dir));
    }

    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint; fails while the document store is unreachable.
async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable")
        }
    }
}
