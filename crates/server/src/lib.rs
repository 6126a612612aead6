//! HTTP surface for the knowledge-graph chat backend
//!
//! Exposes upload, query, and info operations over axum. The companion
//! chat client in `kgchat-cli` talks to this API.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use kgchat_agents::{ContentIngestor, Extractor, GraphBuilder, LlmClient, QueryAgent};
use kgchat_db::{AuditLog, DbConnection, GraphExecutor, Repository};
use std::path::Path;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Uploads can carry a WAV recording; leave room for one.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared handles for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub builder: GraphBuilder,
    pub query: QueryAgent,
    pub ingestor: ContentIngestor,
    pub repo: Repository,
}

impl AppState {
    /// Wire up the full pipeline over an open store. Uploaded content and
    /// the statement side-logs live under `data_dir`.
    pub fn new(db: DbConnection, data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();

        let llm = LlmClient::from_env();
        let repo = Repository::new(db.clone());
        let executor = GraphExecutor::new(db, AuditLog::new(data_dir));
        let builder = GraphBuilder::new(Extractor::new(llm.clone()), executor, repo.clone());
        let query = QueryAgent::new(llm, repo.clone());
        let ingestor = ContentIngestor::from_env(data_dir.join("uploaded-content"));

        Self {
            builder,
            query,
            ingestor,
            repo,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload-text", post(handlers::upload_text))
        .route("/upload-file", post(handlers::upload_file))
        .route("/query", post(handlers::query))
        .route("/info", get(handlers::info))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await
}
