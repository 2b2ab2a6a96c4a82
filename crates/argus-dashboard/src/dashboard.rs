//! Live dashboard state: turns push events into feed entries, cards,
//! phase/progress indicators and stats-refresh requests.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use argus_common::events::{
    EngineStart, OsintComplete, OsintDiscovery, PhaseStart, PushEvent, ScrapingStart, ScrapingSuccess,
    SearchComplete, SearchError,
};
use argus_common::models::{
    is_social_engine, ActivityEvent, ActivityKind, DiscoveryItem, FeedCategory, MediaCounts,
};

use crate::cards::{format_trust, CardKind, DiscoveryCardStore, DISCOVERY_CARD_CAPACITY, INTELLIGENCE_CARD_CAPACITY};
use crate::feed::{EventFeed, BASIC_FEED_CAPACITY, ENHANCED_FEED_CAPACITY};
use crate::http::{START_COMPREHENSIVE_SEARCH_PATH, START_SEARCH_PATH};
use crate::stats::{StatsPanel, StatsSource};

/// Placeholder for payload fields the backend left out.
const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Basic,
    #[default]
    Enhanced,
}

impl Variant {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "enhanced" => Some(Self::Enhanced),
            _ => None,
        }
    }

    pub fn feed_capacity(&self) -> usize {
        match self {
            Self::Basic => BASIC_FEED_CAPACITY,
            Self::Enhanced => ENHANCED_FEED_CAPACITY,
        }
    }

    pub fn card_capacity(&self) -> usize {
        match self {
            Self::Basic => DISCOVERY_CARD_CAPACITY,
            Self::Enhanced => INTELLIGENCE_CARD_CAPACITY,
        }
    }

    pub fn stats_source(&self) -> StatsSource {
        match self {
            Self::Basic => StatsSource::Basic,
            Self::Enhanced => StatsSource::Enhanced,
        }
    }

    pub fn start_search_path(&self) -> &'static str {
        match self {
            Self::Basic => START_SEARCH_PATH,
            Self::Enhanced => START_COMPREHENSIVE_SEARCH_PATH,
        }
    }
}

// ── Operation phase ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseView {
    pub icon: &'static str,
    pub color: &'static str,
    pub label: &'static str,
    pub message: String,
}

pub fn phase_view(phase: Option<&str>, message: Option<&str>) -> PhaseView {
    let (icon, color, label) = match phase {
        Some("traditional_scraping") => ("fas fa-search", "primary", "Traditional Scraping"),
        Some("osint_reconnaissance") => ("fas fa-user-secret", "danger", "OSINT Reconnaissance"),
        Some("analysis") => ("fas fa-chart-line", "success", "Intelligence Analysis"),
        _ => ("fas fa-cog", "info", "Processing"),
    };
    PhaseView { icon, color, label, message: message.unwrap_or_default().to_string() }
}

/// What the async shell should do after an event was handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Effects {
    pub refresh_stats: bool,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    variant: Variant,
    feed: EventFeed,
    cards: DiscoveryCardStore,
    stats: StatsPanel,
    phase: Option<PhaseView>,
    /// Percent complete per search id.
    progress: BTreeMap<String, f64>,
    analysis: Option<Value>,
}

impl Dashboard {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            feed: EventFeed::new(variant.feed_capacity()),
            cards: DiscoveryCardStore::new(variant.card_capacity()),
            stats: StatsPanel::default(),
            phase: None,
            progress: BTreeMap::new(),
            analysis: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn feed(&self) -> &EventFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut EventFeed {
        &mut self.feed
    }

    pub fn cards(&self) -> &DiscoveryCardStore {
        &self.cards
    }

    pub fn stats(&self) -> &StatsPanel {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatsPanel {
        &mut self.stats
    }

    pub fn phase(&self) -> Option<&PhaseView> {
        self.phase.as_ref()
    }

    pub fn progress(&self) -> &BTreeMap<String, f64> {
        &self.progress
    }

    pub fn analysis(&self) -> Option<&Value> {
        self.analysis.as_ref()
    }

    pub fn record(&mut self, event: ActivityEvent) {
        self.feed.record(event);
    }

    pub fn handle(&mut self, event: PushEvent) -> Effects {
        debug!(event = event.name(), "push event");
        match event {
            PushEvent::Connect => {
                let message = match self.variant {
                    Variant::Enhanced => "🔗 Connected to enhanced intelligence network",
                    Variant::Basic => "Connected to intelligence network",
                };
                self.record(ActivityEvent::new(message, ActivityKind::Info));
                Effects::default()
            }
            PushEvent::SearchPhaseStart(e) => self.on_phase_start(e),
            PushEvent::SearchEngineStart(e) => self.on_engine_start(e),
            PushEvent::ScrapingStart(e) => self.on_scraping_start(e),
            PushEvent::ScrapingSuccess(e) => self.on_scraping_success(e),
            PushEvent::OsintStart(e) => {
                let msg = e.message.as_deref().unwrap_or(UNKNOWN);
                self.record(ActivityEvent::new(format!("🕵️ {}", msg), ActivityKind::Osint));
                Effects::default()
            }
            PushEvent::OsintDiscovery(e) => self.on_osint_discovery(e),
            PushEvent::OsintComplete(e) => self.on_osint_complete(e),
            PushEvent::SearchComplete(e) => self.on_search_complete(e),
            PushEvent::SearchError(e) => self.on_search_error(e),
        }
    }

    fn on_phase_start(&mut self, e: PhaseStart) -> Effects {
        self.phase = Some(phase_view(e.phase.as_deref(), e.message.as_deref()));
        Effects::default()
    }

    fn on_engine_start(&mut self, e: EngineStart) -> Effects {
        let engine = e.engine.as_deref().unwrap_or(UNKNOWN);
        let keywords = e.keywords.join(", ");
        let message = match self.variant {
            Variant::Enhanced => format!(
                "🔍 Starting {} intelligence gathering for: {}",
                engine.to_uppercase(),
                keywords
            ),
            Variant::Basic => format!("🔍 Starting {} search for: {}", engine, keywords),
        };
        self.record(ActivityEvent::new(message, ActivityKind::Info));
        Effects::default()
    }

    fn on_scraping_start(&mut self, e: ScrapingStart) -> Effects {
        self.record(ActivityEvent::new(
            format!(
                "🌐 Analyzing: {} ({})",
                e.title.as_deref().unwrap_or(UNKNOWN),
                e.url.as_deref().unwrap_or(UNKNOWN)
            ),
            ActivityKind::Info,
        ));
        if let (Some(id), Some(p)) = (e.search_id, e.progress) {
            self.progress.insert(id, p.clamp(0.0, 100.0));
        }
        Effects::default()
    }

    fn on_scraping_success(&mut self, e: ScrapingSuccess) -> Effects {
        let engine = e.engine.as_deref().unwrap_or(UNKNOWN);
        let title = e.title.as_deref().unwrap_or(UNKNOWN);
        let media = media_summary(e.media_count.as_ref());

        let message = match self.variant {
            Variant::Enhanced => format!("✅ [{}] {} | Media: {}", engine.to_uppercase(), title, media),
            Variant::Basic => format!(
                "✅ Captured: {} | Trust: {}/10 | Media: {}",
                title,
                format_trust(e.trust_score),
                media
            ),
        };
        let category = e.data_type.as_deref().map(FeedCategory::parse).unwrap_or_default();
        self.record(ActivityEvent::categorized(message, ActivityKind::Success, category));

        if is_social_engine(engine) {
            self.record(ActivityEvent::categorized(
                format!("📱 [{}] {}", engine.to_uppercase(), title),
                ActivityKind::Social,
                FeedCategory::Social,
            ));
        }

        // Search results always land as web cards; the payload's data_type only picks the feed category.
        self.cards.add_card(
            DiscoveryItem {
                title: e.title,
                source_url: e.source.or_else(|| e.url.clone()),
                media_url: e.url,
                domain: e.domain,
                engine: e.engine,
                trust_score: e.trust_score,
                media_counts: e.media_count,
                discovery_date: Some(chrono::Local::now()),
                content_preview: e.content_preview,
                ..Default::default()
            },
            CardKind::Traditional,
        );
        Effects { refresh_stats: true }
    }

    fn on_osint_discovery(&mut self, e: OsintDiscovery) -> Effects {
        self.record(ActivityEvent::categorized(
            format!(
                "🎯 OSINT Discovery: {} | Intelligence: {} | Docs: {}",
                e.title.as_deref().unwrap_or(UNKNOWN),
                e.intelligence_type.as_deref().unwrap_or(UNKNOWN),
                display_count(e.documents_count)
            ),
            ActivityKind::Osint,
            FeedCategory::Osint,
        ));
        self.cards.add_card(
            DiscoveryItem {
                title: e.title,
                source_url: e.source.or_else(|| e.url.clone()),
                media_url: e.url,
                trust_score: e.trust_score,
                media_counts: e.media_count,
                discovery_date: Some(chrono::Local::now()),
                intelligence_type: e.intelligence_type,
                documents_count: e.documents_count,
                ..Default::default()
            },
            CardKind::Osint,
        );
        Effects { refresh_stats: true }
    }

    fn on_osint_complete(&mut self, e: OsintComplete) -> Effects {
        self.record(ActivityEvent::new(
            format!(
                "🏆 OSINT Complete: {} subdomains, {} intel items, {} documents",
                display_count(e.subdomains_found),
                display_count(e.intelligence_items),
                display_count(e.documents_found)
            ),
            ActivityKind::Osint,
        ));
        Effects::default()
    }

    fn on_search_complete(&mut self, e: SearchComplete) -> Effects {
        let message = match self.variant {
            Variant::Enhanced => "🎉 Intelligence operation completed! Check analysis results.".to_string(),
            Variant::Basic => format!(
                "🎯 Search completed! Found {} documents",
                display_count(e.final_stats.as_ref().and_then(|s| s.results_count))
            ),
        };
        self.record(ActivityEvent::new(message, ActivityKind::Success));
        if let Some(id) = e.search_id.as_deref() {
            self.progress.insert(id.to_string(), 100.0);
        }
        if e.analysis.is_some() {
            self.analysis = e.analysis;
        }
        Effects::default()
    }

    fn on_search_error(&mut self, e: SearchError) -> Effects {
        let error = e.error.as_deref().unwrap_or(UNKNOWN);
        let message = match self.variant {
            Variant::Enhanced => format!("❌ Operation error: {}", error),
            Variant::Basic => format!("❌ Error in search: {}", error),
        };
        self.record(ActivityEvent::new(message, ActivityKind::Error));
        Effects::default()
    }
}

/// "2 images, 1 videos", or "none" when nothing was captured.
fn media_summary(counts: Option<&MediaCounts>) -> String {
    match counts.map(MediaCounts::summary) {
        Some(s) if !s.is_empty() => s,
        _ => "none".to_string(),
    }
}

fn display_count(n: Option<u64>) -> String {
    n.map(|n| n.to_string()).unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_common::events::OsintStart;
    use serde_json::json;

    fn messages(d: &Dashboard) -> Vec<String> {
        d.feed().entries().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_connect_logs_info() {
        let mut d = Dashboard::new(Variant::Basic);
        assert_eq!(d.handle(PushEvent::Connect), Effects::default());
        assert_eq!(messages(&d), vec!["Connected to intelligence network"]);
        assert_eq!(d.feed().entries().next().map(|e| e.kind), Some(ActivityKind::Info));
    }

    #[test]
    fn test_connect_message_depends_on_variant() {
        let mut d = Dashboard::new(Variant::Enhanced);
        d.handle(PushEvent::Connect);
        assert_eq!(messages(&d), vec!["🔗 Connected to enhanced intelligence network"]);
    }

    #[test]
    fn test_phase_map_with_default() {
        assert_eq!(phase_view(Some("analysis"), None).label, "Intelligence Analysis");
        assert_eq!(phase_view(Some("osint_reconnaissance"), None).color, "danger");
        let p = phase_view(Some("mystery"), Some("working"));
        assert_eq!((p.label, p.message.as_str()), ("Processing", "working"));
    }

    #[test]
    fn test_scraping_success_enhanced() {
        let mut d = Dashboard::new(Variant::Enhanced);
        let event = PushEvent::decode(
            "scraping_success",
            json!({"engine": "google", "title": "Acme", "media_count": {"images": 2, "videos": 0}}),
        )
        .unwrap();
        let effects = d.handle(event);
        assert!(effects.refresh_stats);
        assert_eq!(messages(&d), vec!["✅ [GOOGLE] Acme | Media: 2 images"]);
        assert_eq!(d.cards().len(), 1);
        assert_eq!(d.cards().cards().next().map(|c| c.kind), Some(CardKind::Traditional));
    }

    #[test]
    fn test_scraping_success_social_adds_second_entry() {
        let mut d = Dashboard::new(Variant::Enhanced);
        let event = PushEvent::decode(
            "scraping_success",
            json!({"engine": "twitter_dork", "title": "Tweet", "data_type": "social"}),
        )
        .unwrap();
        d.handle(event);
        let entries: Vec<_> = d.feed().entries().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "📱 [TWITTER_DORK] Tweet");
        assert_eq!(entries[0].category, FeedCategory::Social);
        assert_eq!(entries[1].message, "✅ [TWITTER_DORK] Tweet | Media: none");
        assert_eq!(entries[1].category, FeedCategory::Social);
        assert_eq!(d.cards().cards().next().map(|c| c.kind), Some(CardKind::Traditional));
    }

    #[test]
    fn test_basic_variant_messages() {
        let mut d = Dashboard::new(Variant::Basic);
        d.handle(PushEvent::decode("scraping_success", json!({"title": "Doc", "trust_score": 7.5})).unwrap());
        d.handle(PushEvent::decode("search_complete", json!({"final_stats": {"results_count": 4}})).unwrap());
        assert_eq!(
            messages(&d),
            vec![
                "🎯 Search completed! Found 4 documents",
                "✅ Captured: Doc | Trust: 7.5/10 | Media: none",
            ]
        );
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let mut d = Dashboard::new(Variant::Enhanced);
        d.handle(PushEvent::OsintStart(OsintStart::default()));
        d.handle(PushEvent::decode("search_error", json!("not an object")).unwrap());
        assert_eq!(messages(&d), vec!["❌ Operation error: unknown", "🕵️ unknown"]);
    }

    #[test]
    fn test_osint_discovery_adds_osint_card() {
        let mut d = Dashboard::new(Variant::Enhanced);
        let effects = d.handle(
            PushEvent::decode(
                "osint_discovery",
                json!({"title": "sub.acme.com", "intelligence_type": "subdomain", "documents_count": 3}),
            )
            .unwrap(),
        );
        assert!(effects.refresh_stats);
        let entry = d.feed().entries().next().unwrap();
        assert_eq!(entry.message, "🎯 OSINT Discovery: sub.acme.com | Intelligence: subdomain | Docs: 3");
        assert_eq!(entry.category, FeedCategory::Osint);
        assert_eq!(d.cards().cards().next().map(|c| c.kind), Some(CardKind::Osint));
    }

    #[test]
    fn test_progress_and_analysis_tracking() {
        let mut d = Dashboard::new(Variant::Enhanced);
        d.handle(
            PushEvent::decode("scraping_start", json!({"search_id": "s1", "title": "t", "url": "u", "progress": 40}))
                .unwrap(),
        );
        assert_eq!(d.progress().get("s1"), Some(&40.0));

        d.handle(PushEvent::decode("search_complete", json!({"search_id": "s1", "analysis": {"top": 1}})).unwrap());
        assert_eq!(d.progress().get("s1"), Some(&100.0));
        assert_eq!(d.analysis(), Some(&json!({"top": 1})));
    }
}
