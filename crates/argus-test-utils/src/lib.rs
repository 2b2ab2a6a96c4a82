//! argus-test-utils: In-memory backend and push-channel doubles plus
//! fixtures shared by the Argus test suites.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use argus_common::error::{ArgusError, Result};
use argus_common::models::{
    BasicStats, EnhancedStats, GraphEdge, GraphNode, GraphSnapshot, MediaItem, MediaSnapshot,
    MediaStats, NodeType, SearchRequest, SearchStarted,
};
use argus_common::transport::{Backend, EventChannel};

pub use pretty_assertions::assert_eq;

/// Status code returned for any endpoint the test did not configure.
pub const UNCONFIGURED_STATUS: u16 = 503;

#[derive(Debug, Default)]
struct Responses {
    /// Handed out in order; the last id repeats once the rest are used.
    search_ids: VecDeque<String>,
    stats: Option<BasicStats>,
    enhanced_stats: Option<EnhancedStats>,
    media: Option<MediaSnapshot>,
    media_stats: Option<MediaStats>,
    graph: Option<GraphSnapshot>,
}

/// Backend double. Unconfigured endpoints fail with a 503 status error;
/// every call is recorded by endpoint name.
#[derive(Debug, Default)]
pub struct MockBackend {
    responses: Mutex<Responses>,
    calls: Mutex<Vec<String>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_id(self, id: impl Into<String>) -> Self {
        self.with_search_ids([id])
    }

    /// One id per successive start-search call.
    pub fn with_search_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(|r| r.search_ids = ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_basic_stats(self, stats: BasicStats) -> Self {
        self.set(|r| r.stats = Some(stats));
        self
    }

    pub fn with_enhanced_stats(self, stats: EnhancedStats) -> Self {
        self.set(|r| r.enhanced_stats = Some(stats));
        self
    }

    pub fn with_media(self, media: MediaSnapshot, stats: MediaStats) -> Self {
        self.set(|r| {
            r.media = Some(media);
            r.media_stats = Some(stats);
        });
        self
    }

    pub fn with_graph(self, graph: GraphSnapshot) -> Self {
        self.set_graph(Some(graph));
        self
    }

    /// Swap the graph response; `None` makes the endpoint fail.
    pub fn set_graph(&self, graph: Option<GraphSnapshot>) {
        self.set(|r| r.graph = graph);
    }

    pub fn set_basic_stats(&self, stats: Option<BasicStats>) {
        self.set(|r| r.stats = stats);
    }

    /// Endpoint names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, endpoint: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == endpoint).count()
    }

    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn set(&self, f: impl FnOnce(&mut Responses)) {
        if let Ok(mut r) = self.responses.lock() {
            f(&mut *r);
        }
    }

    fn respond<T>(&self, endpoint: &str, pick: impl FnOnce(&mut Responses) -> Option<T>) -> Result<T> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(endpoint.to_string());
        }
        let found = self.responses.lock().ok().and_then(|mut r| pick(&mut *r));
        found.ok_or_else(|| ArgusError::Status {
            status: UNCONFIGURED_STATUS,
            path: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn start_search(&self, request: &SearchRequest) -> Result<SearchStarted> {
        if let Ok(mut reqs) = self.requests.lock() {
            reqs.push(request.clone());
        }
        let search_id = self.respond("start_search", |r| {
            if r.search_ids.len() > 1 {
                r.search_ids.pop_front()
            } else {
                r.search_ids.front().cloned()
            }
        })?;
        Ok(SearchStarted { search_id, status: Some("started".into()) })
    }

    async fn stats(&self) -> Result<BasicStats> {
        self.respond("stats", |r| r.stats.clone())
    }

    async fn enhanced_stats(&self) -> Result<EnhancedStats> {
        self.respond("enhanced_stats", |r| r.enhanced_stats.clone())
    }

    async fn media_data(&self) -> Result<MediaSnapshot> {
        self.respond("media_data", |r| r.media.clone())
    }

    async fn media_stats(&self) -> Result<MediaStats> {
        self.respond("media_stats", |r| r.media_stats.clone())
    }

    async fn graph_data(&self) -> Result<GraphSnapshot> {
        self.respond("graph_data", |r| r.graph.clone())
    }
}

/// Push-channel double that records every joined search id.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    joined: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose joins always fail (after recording the attempt).
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn joined(&self) -> Vec<String> {
        self.joined.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventChannel for RecordingChannel {
    async fn join(&self, search_id: &str) -> Result<()> {
        if let Ok(mut joined) = self.joined.lock() {
            joined.push(search_id.to_string());
        }
        if self.fail {
            return Err(ArgusError::WebSocket("channel closed".into()));
        }
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn media_item(url: &str, title: &str, domain: &str, engine: &str) -> MediaItem {
    MediaItem {
        url: url.to_string(),
        title: Some(title.to_string()),
        domain: Some(domain.to_string()),
        engine: Some(engine.to_string()),
        ..Default::default()
    }
}

/// Two domains, two engines, one item in every category except audio.
pub fn sample_media() -> (MediaSnapshot, MediaStats) {
    let snapshot = MediaSnapshot {
        images: vec![
            media_item("https://acme.com/logo.png", "Acme Logo", "acme.com", "google"),
            MediaItem {
                alt: Some("Board photo".into()),
                ..media_item("https://beta.org/board.jpg", "", "beta.org", "duckduckgo")
            },
        ],
        videos: vec![media_item("https://acme.com/intro.mp4", "Acme Intro", "acme.com", "youtube_dork")],
        documents: vec![MediaItem {
            media_type: Some("pdf".into()),
            filename: Some("annual-report.pdf".into()),
            ..media_item("https://beta.org/annual-report.pdf", "Annual Report", "beta.org", "google")
        }],
        audio: Vec::new(),
    };
    let stats = MediaStats { total_images: 2, total_videos: 1, total_documents: 1, total_audio: 0 };
    (snapshot, stats)
}

pub fn graph_node(id: &str, node_type: NodeType, count: Option<u64>) -> GraphNode {
    GraphNode {
        id: id.to_string(),
        label: id.to_string(),
        node_type,
        count,
        ..Default::default()
    }
}

pub fn graph_edge(source: &str, target: &str) -> GraphEdge {
    GraphEdge { source: source.to_string(), target: target.to_string(), kind: None }
}

/// A document linked to its domain and one keyword.
pub fn sample_graph() -> GraphSnapshot {
    GraphSnapshot {
        nodes: vec![
            GraphNode {
                url: Some("https://acme.com/about".into()),
                trust_score: Some(8.0),
                media_count: Some(3),
                ..graph_node("doc-1", NodeType::Document, None)
            },
            graph_node("acme.com", NodeType::Domain, Some(4)),
            graph_node("acme", NodeType::Keyword, Some(2)),
        ],
        links: vec![graph_edge("doc-1", "acme.com"), graph_edge("doc-1", "acme")],
    }
}

/// Raw `scraping_success` payload as the backend sends it.
pub fn scraping_success_payload(title: &str, engine: &str) -> serde_json::Value {
    json!({
        "search_id": "abc123def456",
        "doc_id": "doc-1",
        "engine": engine,
        "title": title,
        "url": format!("https://acme.com/{}", title.to_lowercase().replace(' ', "-")),
        "domain": "acme.com",
        "trust_score": 7.5,
        "media_count": {"images": 2, "videos": 0},
        "data_type": "traditional",
        "content_preview": "Acme Corp builds anvils",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}
