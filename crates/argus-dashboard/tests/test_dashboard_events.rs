//! Push-event sequences driven through the dashboard and stats poller.

use std::sync::Arc;

use serde_json::json;

use argus_common::models::{EnhancedStats, FeedCategory};
use argus_common::PushEvent;
use argus_dashboard::stats::{StatCounters, StatsPoller};
use argus_dashboard::{Dashboard, Variant};
use argus_test_utils::{assert_eq, scraping_success_payload, MockBackend};

fn decode(name: &str, data: serde_json::Value) -> PushEvent {
    PushEvent::decode(name, data).expect("known event")
}

#[tokio::test]
async fn test_scraping_success_requests_stats_refresh() {
    let backend = Arc::new(MockBackend::new().with_enhanced_stats(EnhancedStats {
        total_documents: 3,
        osint_intelligence: 1,
        total_images: 2,
        ..Default::default()
    }));
    let mut dashboard = Dashboard::new(Variant::Enhanced);
    let poller = StatsPoller::new(backend.clone(), dashboard.variant().stats_source());

    let effects = dashboard.handle(decode("scraping_success", scraping_success_payload("Acme Corp", "google")));
    assert!(effects.refresh_stats);
    assert!(poller.refresh(dashboard.stats_mut()).await);

    assert_eq!(backend.call_count("enhanced_stats"), 1);
    assert!(matches!(
        dashboard.stats().counters(),
        Some(StatCounters::Enhanced { total_documents: 3, total_media: 2, .. })
    ));
    assert_eq!(dashboard.stats().shares().map(|s| s.osint_pct), Some(25.0));
    assert_eq!(
        dashboard.feed().entries().next().map(|e| e.message.as_str()),
        Some("✅ [GOOGLE] Acme Corp | Media: 2 images")
    );
}

#[tokio::test]
async fn test_failed_poll_keeps_previous_counters() {
    let backend = Arc::new(MockBackend::new());
    let mut dashboard = Dashboard::new(Variant::Basic);
    let poller = StatsPoller::new(backend.clone(), dashboard.variant().stats_source());

    backend.set_basic_stats(Some(Default::default()));
    assert!(poller.refresh(dashboard.stats_mut()).await);
    let before = dashboard.stats().clone();

    backend.set_basic_stats(None);
    assert!(!poller.refresh(dashboard.stats_mut()).await);
    assert_eq!(dashboard.stats(), &before);
    assert_eq!(backend.call_count("stats"), 2);
}

#[test]
fn test_full_operation_sequence() {
    let mut dashboard = Dashboard::new(Variant::Enhanced);
    let events = vec![
        PushEvent::Connect,
        decode("search_phase_start", json!({"phase": "osint_reconnaissance", "message": "Mapping"})),
        decode("search_engine_start", json!({"engine": "google", "keywords": ["acme", "corp"]})),
        decode("scraping_success", scraping_success_payload("Tweet", "twitter_dork")),
        decode("osint_start", json!({"message": "Enumerating subdomains"})),
        decode("osint_discovery", json!({"title": "mail.acme.com", "intelligence_type": "subdomain"})),
        decode("osint_complete", json!({"subdomains_found": 4, "intelligence_items": 2, "documents_found": 9})),
        decode("search_complete", json!({"search_id": "abc123def456", "analysis": {"domains": 1}})),
    ];
    let refreshes = events
        .into_iter()
        .map(|e| dashboard.handle(e))
        .filter(|fx| fx.refresh_stats)
        .count();
    assert_eq!(refreshes, 2);

    assert_eq!(dashboard.phase().map(|p| p.label), Some("OSINT Reconnaissance"));
    assert_eq!(dashboard.cards().len(), 2);
    assert_eq!(dashboard.feed().len(), 8);

    let messages: Vec<_> = dashboard.feed().entries().map(|e| e.message.clone()).collect();
    assert_eq!(messages[0], "🎉 Intelligence operation completed! Check analysis results.");
    assert_eq!(messages[1], "🏆 OSINT Complete: 4 subdomains, 2 intel items, 9 documents");
    assert_eq!(messages[3], "🕵️ Enumerating subdomains");
    assert_eq!(messages[6], "🔍 Starting GOOGLE intelligence gathering for: acme, corp");
    assert_eq!(messages[7], "🔗 Connected to enhanced intelligence network");
    assert_eq!(messages[2], "🎯 OSINT Discovery: mail.acme.com | Intelligence: subdomain | Docs: unknown");

    dashboard.feed_mut().set_filter(FeedCategory::Social);
    let social: Vec<_> = dashboard.feed().visible().map(|e| e.message.clone()).collect();
    assert_eq!(social, vec!["📱 [TWITTER_DORK] Tweet".to_string()]);

    dashboard.feed_mut().set_filter(FeedCategory::All);
    assert_eq!(dashboard.feed().visible().count(), 8);
}

#[test]
fn test_unknown_event_names_are_ignored() {
    assert_eq!(PushEvent::decode("heartbeat", json!({})), None);
}
