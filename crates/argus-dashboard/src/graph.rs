//! Relationship graph: snapshot replace, node styling, drag and tooltips.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use argus_common::error::Result;
use argus_common::models::{GraphEdge, GraphNode, GraphSnapshot, NodeType};
use argus_common::transport::Backend;

use crate::cards::format_trust;
use crate::layout::{ForceConfig, Simulation};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Alpha target held while any node is being dragged.
const DRAG_ALPHA_TARGET: f64 = 0.3;
const TOOLTIP_OPACITY: f64 = 0.9;
const TOOLTIP_FADE_IN: Duration = Duration::from_millis(200);
const TOOLTIP_FADE_OUT: Duration = Duration::from_millis(500);

pub fn node_color(node: &GraphNode) -> &'static str {
    match node.node_type {
        NodeType::Document => "#007bff",
        NodeType::Domain => "#ffc107",
        NodeType::Keyword => "#28a745",
        NodeType::Unknown => "#6c757d",
    }
}

pub fn node_radius(node: &GraphNode) -> f64 {
    let count = node.count.unwrap_or(0) as f64;
    match node.node_type {
        NodeType::Document => 8.0,
        NodeType::Domain => (8.0 + count).min(15.0),
        NodeType::Keyword => (6.0 + count).min(12.0),
        NodeType::Unknown => 6.0,
    }
}

/// Heading plus detail lines, by node type.
pub fn tooltip_content(node: &GraphNode) -> (String, Vec<String>) {
    let count = node.count.unwrap_or(0);
    match node.node_type {
        NodeType::Document => (
            node.label.clone(),
            vec![
                format!("URL: {}", node.url.as_deref().unwrap_or("")),
                format!(
                    "Trust Score: {}",
                    format_trust(node.trust_score.filter(|s| *s != 0.0))
                ),
                format!("Media Items: {}", node.media_count.unwrap_or(0)),
            ],
        ),
        NodeType::Domain => (format!("Domain: {}", node.label), vec![format!("Documents: {}", count)]),
        NodeType::Keyword => (format!("Keyword: {}", node.label), vec![format!("Mentions: {}", count)]),
        NodeType::Unknown => (node.label.clone(), Vec::new()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub heading: String,
    pub lines: Vec<String>,
    pub left: f64,
    pub top: f64,
    /// Opacity the tooltip is transitioning to.
    pub opacity: f64,
    pub transition_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
}

/// Drawn in order: edges, then nodes, then labels (labels reuse `nodes`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphView {
    pub width: f64,
    pub height: f64,
    pub edges: Vec<EdgeView>,
    pub nodes: Vec<NodeView>,
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    width: f64,
    height: f64,
    nodes: Vec<GraphNode>,
    edges: Vec<(usize, usize)>,
    index: HashMap<String, usize>,
    sim: Simulation,
    active_drags: usize,
    tooltip: Option<Tooltip>,
}

impl Default for RelationshipGraph {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl RelationshipGraph {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            sim: Simulation::new(0, &[], ForceConfig::for_canvas(width, height)),
            active_drags: 0,
            tooltip: None,
        }
    }

    pub async fn load(&mut self, backend: &dyn Backend) {
        self.apply_load(backend.graph_data().await);
    }

    /// Replace on success; on failure log and keep what is drawn.
    pub fn apply_load(&mut self, result: Result<GraphSnapshot>) -> bool {
        match result {
            Ok(snapshot) => {
                self.replace(snapshot);
                true
            }
            Err(e) => {
                warn!(error = %e, "Error loading graph data");
                false
            }
        }
    }

    /// Clear everything and restart the layout over the new node set.
    /// Edges naming unknown nodes are dropped.
    pub fn replace(&mut self, snapshot: GraphSnapshot) {
        let GraphSnapshot { nodes, links } = snapshot;

        let index: HashMap<String, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut dropped = 0usize;
        let edges: Vec<(usize, usize)> = links
            .iter()
            .filter_map(|GraphEdge { source, target, .. }| {
                match (index.get(source), index.get(target)) {
                    (Some(&s), Some(&t)) => Some((s, t)),
                    _ => {
                        dropped += 1;
                        None
                    }
                }
            })
            .collect();
        if dropped > 0 {
            warn!(dropped, "graph links reference unknown nodes");
        }

        info!(nodes = nodes.len(), links = edges.len(), "graph snapshot replaced");

        self.sim = Simulation::new(nodes.len(), &edges, ForceConfig::for_canvas(self.width, self.height));
        self.sim.restart();
        self.nodes = nodes;
        self.edges = edges;
        self.index = index;
        self.active_drags = 0;
        self.tooltip = None;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).and_then(|&i| self.nodes.get(i))
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn tick(&mut self) -> bool {
        self.sim.tick()
    }

    /// Tick until settled or `max_ticks` is reached.
    pub fn run(&mut self, max_ticks: usize) -> usize {
        self.sim.run(max_ticks)
    }

    pub fn is_settled(&self) -> bool {
        self.sim.is_settled()
    }

    // ── Drag ──────────────────────────────────────────────────────────────────

    /// Pin the node where it is and warm the simulation.
    pub fn drag_start(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else { return false };
        if self.active_drags == 0 {
            self.sim.set_alpha_target(DRAG_ALPHA_TARGET);
        }
        self.active_drags += 1;
        if let Some(b) = self.sim.body(i).copied() {
            self.sim.pin(i, b.x, b.y);
        }
        true
    }

    pub fn drag_to(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(&i) = self.index.get(id) else { return false };
        self.sim.pin(i, x, y);
        true
    }

    /// Release the pin; the simulation cools once no drag remains.
    pub fn drag_end(&mut self, id: &str) -> bool {
        let Some(&i) = self.index.get(id) else { return false };
        self.active_drags = self.active_drags.saturating_sub(1);
        if self.active_drags == 0 {
            self.sim.set_alpha_target(0.0);
        }
        self.sim.unpin(i);
        true
    }

    // ── Hover ─────────────────────────────────────────────────────────────────

    pub fn hover(&mut self, id: &str, pointer_x: f64, pointer_y: f64) -> Option<&Tooltip> {
        let node = self.node(id)?;
        let (heading, lines) = tooltip_content(node);
        self.tooltip = Some(Tooltip {
            heading,
            lines,
            left: pointer_x + 10.0,
            top: pointer_y - 28.0,
            opacity: TOOLTIP_OPACITY,
            transition_ms: TOOLTIP_FADE_IN.as_millis() as u64,
        });
        self.tooltip.as_ref()
    }

    /// Fade out; content stays in place while it fades.
    pub fn hover_out(&mut self) {
        if let Some(t) = self.tooltip.as_mut() {
            t.opacity = 0.0;
            t.transition_ms = TOOLTIP_FADE_OUT.as_millis() as u64;
        }
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn view(&self) -> GraphView {
        let bodies = self.sim.bodies();
        GraphView {
            width: self.width,
            height: self.height,
            edges: self
                .edges
                .iter()
                .map(|&(s, t)| EdgeView {
                    x1: bodies[s].x,
                    y1: bodies[s].y,
                    x2: bodies[t].x,
                    y2: bodies[t].y,
                })
                .collect(),
            nodes: self
                .nodes
                .iter()
                .zip(bodies)
                .map(|(n, b)| NodeView {
                    id: n.id.clone(),
                    label: n.label.clone(),
                    x: b.x,
                    y: b.y,
                    radius: node_radius(n),
                    color: node_color(n),
                })
                .collect(),
            tooltip: self.tooltip.clone(),
        }
    }
}
