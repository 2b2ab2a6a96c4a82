//! Relationship graph reloads against the backend double.

use argus_common::models::{GraphSnapshot, NodeType};
use argus_dashboard::graph::{node_radius, RelationshipGraph};
use argus_test_utils::{assert_eq, graph_edge, graph_node, sample_graph, MockBackend};

#[tokio::test]
async fn test_load_replaces_and_restarts_layout() {
    let backend = MockBackend::new().with_graph(sample_graph());
    let mut graph = RelationshipGraph::default();
    graph.load(&backend).await;

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.simulation().alpha(), 1.0);

    let view = graph.view();
    assert_eq!(view.edges.len(), 2);
    let domain = view.nodes.iter().find(|n| n.id == "acme.com").unwrap();
    assert_eq!(domain.radius, 12.0);
    assert_eq!(domain.color, "#ffc107");

    for _ in 0..50 {
        graph.tick();
    }
    assert!(graph.simulation().alpha() < 1.0);

    backend.set_graph(Some(GraphSnapshot {
        nodes: vec![graph_node("solo", NodeType::Keyword, Some(1))],
        links: vec![],
    }));
    graph.load(&backend).await;
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.node("doc-1").is_none());
    assert_eq!(graph.simulation().alpha(), 1.0);
}

#[tokio::test]
async fn test_empty_snapshot_clears_everything() {
    let backend = MockBackend::new().with_graph(sample_graph());
    let mut graph = RelationshipGraph::default();
    graph.load(&backend).await;
    graph.hover("acme", 10.0, 10.0);

    backend.set_graph(Some(GraphSnapshot::default()));
    graph.load(&backend).await;

    let view = graph.view();
    assert!(view.nodes.is_empty());
    assert!(view.edges.is_empty());
    assert!(view.tooltip.is_none());
}

#[tokio::test]
async fn test_failed_reload_keeps_prior_graph() {
    let backend = MockBackend::new().with_graph(sample_graph());
    let mut graph = RelationshipGraph::default();
    graph.load(&backend).await;

    backend.set_graph(None);
    graph.load(&backend).await;
    assert_eq!(graph.node_count(), 3);
    assert_eq!(backend.call_count("graph_data"), 2);
}

#[test]
fn test_dragged_node_stays_pinned_while_layout_runs() {
    let mut graph = RelationshipGraph::new(800.0, 600.0);
    graph.replace(GraphSnapshot {
        nodes: vec![
            graph_node("a", NodeType::Document, None),
            graph_node("b", NodeType::Domain, Some(2)),
            graph_node("c", NodeType::Keyword, Some(20)),
        ],
        links: vec![graph_edge("a", "b"), graph_edge("b", "c")],
    });
    assert_eq!(node_radius(graph.node("c").unwrap()), 12.0);

    graph.drag_start("b");
    graph.drag_to("b", 100.0, 100.0);
    for _ in 0..300 {
        graph.tick();
    }
    let b = graph.view().nodes.into_iter().find(|n| n.id == "b").unwrap();
    assert_eq!((b.x, b.y), (100.0, 100.0));
    assert!(!graph.is_settled());

    graph.drag_end("b");
    graph.run(5_000);
    assert!(graph.is_settled());
}
