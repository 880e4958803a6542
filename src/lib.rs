//! PM Codex library: application state, router, and modules.
//!
//! The binary in `main.rs` only wires configuration and logging to the
//! router built here, so tests can drive the same `Router`.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod fixtures;
pub mod handlers;
pub mod highlight;
pub mod kb;
pub mod logging;
pub mod models;
pub mod templates;
pub mod text_layer;
pub mod viewer;

use auth::{LoginRateLimit, UserStore};
use config::Config;
use error::AppError;
use fixtures::Library;
use viewer::DocumentCache;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub config: Config,
    pub library: Library,
    pub documents: DocumentCache,
    pub users: Mutex<UserStore>,
    /// Session signing key.
    pub secret: Vec<u8>,
    pub login_rate_limit: Mutex<LoginRateLimit>,
}

impl AppState {
    pub fn new(config: Config, library: Library) -> Self {
        let secret = match &config.secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "{} not set; sessions will not survive a restart",
                    config::SECRET_VAR
                );
                auth::random_secret()
            }
        };

        Self {
            config,
            library,
            documents: DocumentCache::default(),
            users: Mutex::new(UserStore::default()),
            secret,
            login_rate_limit: Mutex::new(LoginRateLimit::default()),
        }
    }
}

/// Lock a state mutex, turning poisoning into a server error.
pub fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("state lock poisoned".into()))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let docs = ServeDir::new(&state.config.docs_dir);

    Router::new()
        // Pages
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/compare", get(handlers::compare))
        .route("/analytics", get(handlers::analytics))
        .route("/search", get(handlers::knowledge_base))
        .route("/search2", get(handlers::knowledge_base_search))
        // Viewer
        .route("/pdf", get(handlers::pdf_viewer))
        .route("/book", get(handlers::book_viewer))
        .route("/book-123", get(handlers::book_preset))
        // Auth pages
        .route("/login", get(handlers::login_page))
        .route("/signup", get(handlers::signup_page))
        .route("/forgot-password", get(handlers::forgot_password_page))
        .route("/logout", get(handlers::logout))
        // JSON API
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/signup", post(api::signup))
        .route("/api/auth/forgot-password", post(api::forgot_password))
        .route("/api/pdf/{id}/page/{page}", get(api::page_text))
        .route("/api/pdf/{id}/section", get(api::section_page))
        .route("/data", post(api::knowledge_base_data))
        .route("/healthz", get(handlers::healthz))
        // Documents
        .nest_service("/pdfs", docs)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
