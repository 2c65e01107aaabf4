use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/blogs", get(handlers::list_articles))
        .route("/api/blogs/fetch", post(handlers::fetch_articles))
        .route(
            "/api/blogs/:id",
            get(handlers::get_article).delete(handlers::delete_article),
        )
        .route("/api/sources", get(handlers::list_sources))
        .route("/api/sources/orphans", get(handlers::list_orphans))
        .route("/api/sources/:id", get(handlers::get_source))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves the API on `bind` until the process is stopped.
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use rb_core::{Article, Error, Result};
    pub use crate::{create_app, serve, AppState};
}
