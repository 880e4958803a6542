//! PM Codex - a reading companion for project management standards.
//!
//! This is the main entry point for the web server. The application is
//! organized into the following modules:
//!
//! - `fixtures` / `models`: Bundled reference data and its types
//! - `highlight` / `text_layer`: Phrase matching and the page text highlighter
//! - `viewer`: Deep links, page clamping, and PDF text extraction
//! - `kb`: Knowledge-base browser state and search
//! - `auth`: Accounts, sessions, and login throttling
//! - `handlers` / `api`: HTML pages and JSON endpoints

use std::process::ExitCode;
use std::sync::Arc;

use pmcodex::{config::Config, fixtures::Library, logging, router, AppState};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    let library = Library::load()?;

    tracing::info!(
        topics = library.topics.len(),
        documents = library.documents.len(),
        tabs = library.knowledge_base.len(),
        "reference data loaded"
    );
    if !config.docs_dir.is_dir() {
        tracing::warn!(dir = %config.docs_dir.display(), "documents directory missing; the viewer will report load failures");
    }

    let addr = config.addr.clone();
    let docs_dir = config.docs_dir.display().to_string();
    let app = router(Arc::new(AppState::new(config, library)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, docs_dir = %docs_dir, "PM Codex running at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
