//! Axum router: maps all URL paths to handlers.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::handlers::{
    dashboard::{dashboard, set_feed_filter},
    graph::{graph_drag, graph_hover, graph_page, graph_view},
    media::{export_media, filter_media, media_detail, media_page},
    search::launch_search,
};
use crate::sse::sse_handler;
use crate::state::SharedState;

/// Build and return the full Axum router.
pub fn build_router(state: SharedState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        // Pages
        .route("/",      get(dashboard))
        .route("/media", get(media_page))
        .route("/graph", get(graph_page))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/search",       post(launch_search))
        .route("/api/feed/filter",  post(set_feed_filter))
        .route("/api/media/filter", get(filter_media))
        .route("/api/media/detail", get(media_detail))
        .route("/api/media/export", get(export_media))
        .route("/api/graph",        get(graph_view))
        .route("/api/graph/drag",   post(graph_drag))
        .route("/api/graph/hover",  post(graph_hover))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
