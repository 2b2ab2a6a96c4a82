//! Relationship graph: SVG canvas, drag and hover interaction.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::render;
use crate::state::{SharedState, ViewEvent};

#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub reload: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Deserialize)]
pub struct DragRequest {
    pub id: String,
    pub phase: DragPhase,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct HoverRequest {
    /// `None` when the pointer left the node.
    pub id: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// GET /graph - Graph page; loads a fresh snapshot
pub async fn graph_page(State(state): State<SharedState>) -> Html<String> {
    state.reload_graph().await;
    let svg = render::graph_svg(&state.graph.lock().await.view());
    Html(render::page("Relationship Graph", render::graph_page_html(svg)))
}

/// GET /api/graph - Current layout as SVG
pub async fn graph_view(State(state): State<SharedState>, Query(q): Query<GraphQuery>) -> Html<String> {
    if q.reload {
        state.reload_graph().await;
    }
    Html(render::graph_svg(&state.graph.lock().await.view()))
}

/// POST /api/graph/drag - Pin, move or release a node
pub async fn graph_drag(
    State(state): State<SharedState>,
    Json(req): Json<DragRequest>,
) -> Result<StatusCode, ApiError> {
    let mut graph = state.graph.lock().await;
    let found = match req.phase {
        DragPhase::Start => graph.drag_start(&req.id),
        DragPhase::Move => graph.drag_to(&req.id, req.x, req.y),
        DragPhase::End => graph.drag_end(&req.id),
    };
    if !found {
        return Err(ApiError::NotFound(format!("node {}", req.id)));
    }
    state.publish(ViewEvent::Graph { html: render::graph_svg(&graph.view()) });
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/graph/hover - Show or fade the tooltip
pub async fn graph_hover(
    State(state): State<SharedState>,
    Json(req): Json<HoverRequest>,
) -> Html<String> {
    let mut graph = state.graph.lock().await;
    match req.id.as_deref() {
        Some(id) => {
            if graph.hover(id, req.x, req.y).is_none() {
                graph.hover_out();
            }
        }
        None => graph.hover_out(),
    }
    Html(graph.tooltip().map(render::tooltip_html).unwrap_or_default())
}
