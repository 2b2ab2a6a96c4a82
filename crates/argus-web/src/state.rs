//! Shared application state for the web server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use argus_common::transport::{Backend, EventChannel};
use argus_common::PushEvent;
use argus_dashboard::media::MediaCatalog;
use argus_dashboard::stats::StatsPoller;
use argus_dashboard::{Dashboard, RelationshipGraph, SearchLauncher, Variant};

use crate::config::Config;
use crate::render;

/// Events pushed to connected clients via SSE. Each carries a rendered
/// fragment for one region of the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Activity feed changed
    Feed { html: String },
    /// Intelligence / discovery cards changed
    Cards { html: String },
    /// Counters refreshed
    Stats { html: String },
    /// Operation phase or search progress changed
    Phase { html: String },
    /// Graph layout advanced or was replaced
    Graph { html: String },
    /// Media catalog reloaded
    Media,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    pub variant: Variant,
    pub backend: Arc<dyn Backend>,
    pub dashboard: Mutex<Dashboard>,
    pub launcher: Mutex<SearchLauncher>,
    pub stats_poller: StatsPoller,
    pub media: Mutex<MediaCatalog>,
    pub graph: Mutex<RelationshipGraph>,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<ViewEvent>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>, channel: Arc<dyn EventChannel>) -> anyhow::Result<Self> {
        let variant = config.variant()?;
        let (event_tx, _) = broadcast::channel(config.server.event_buffer.max(1));
        Ok(Self {
            variant,
            dashboard: Mutex::new(Dashboard::new(variant)),
            launcher: Mutex::new(SearchLauncher::new(backend.clone(), channel)),
            stats_poller: StatsPoller::new(backend.clone(), variant.stats_source()),
            media: Mutex::new(MediaCatalog::new()),
            graph: Mutex::new(RelationshipGraph::new(config.graph.width, config.graph.height)),
            backend,
            config,
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.event_tx.subscribe()
    }

    /// Send to every subscriber; having none is not an error.
    pub fn publish(&self, event: ViewEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Apply one push event and broadcast the regions it touched.
    pub async fn handle_push(&self, event: PushEvent) {
        let touches_cards = matches!(event, PushEvent::ScrapingSuccess(_) | PushEvent::OsintDiscovery(_));
        let touches_phase = matches!(
            event,
            PushEvent::SearchPhaseStart(_) | PushEvent::ScrapingStart(_) | PushEvent::SearchComplete(_)
        );

        let effects = {
            let mut dashboard = self.dashboard.lock().await;
            let effects = dashboard.handle(event);
            self.publish(ViewEvent::Feed { html: render::feed_html(&dashboard.feed().view()) });
            if touches_cards {
                self.publish(ViewEvent::Cards { html: render::cards_html(&dashboard.cards().view()) });
            }
            if touches_phase {
                self.publish(ViewEvent::Phase {
                    html: render::phase_html(dashboard.phase(), dashboard.progress()),
                });
            }
            effects
        };

        if effects.refresh_stats {
            self.refresh_stats().await;
        }
    }

    pub async fn refresh_stats(&self) {
        let result = self.stats_poller.fetch().await;
        let mut dashboard = self.dashboard.lock().await;
        if dashboard.stats_mut().apply_result(result) {
            self.publish(ViewEvent::Stats { html: render::stats_html(dashboard.stats()) });
        }
    }

    pub async fn reload_media(&self) {
        let result = MediaCatalog::fetch(self.backend.as_ref()).await;
        self.media.lock().await.apply_load(result);
        self.publish(ViewEvent::Media);
    }

    pub async fn reload_graph(&self) {
        let result = self.backend.graph_data().await;
        let mut graph = self.graph.lock().await;
        if graph.apply_load(result) {
            self.publish(ViewEvent::Graph { html: render::graph_svg(&graph.view()) });
        }
    }

    /// Advance the layout by one frame. Returns `false` once settled.
    pub async fn step_graph(&self) -> bool {
        let mut graph = self.graph.lock().await;
        if graph.is_settled() {
            return false;
        }
        for _ in 0..self.config.graph.ticks_per_frame.max(1) {
            if !graph.tick() {
                break;
            }
        }
        debug!(alpha = graph.simulation().alpha(), "graph frame");
        self.publish(ViewEvent::Graph { html: render::graph_svg(&graph.view()) });
        true
    }
}

pub type SharedState = Arc<AppState>;
