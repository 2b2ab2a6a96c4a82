//! HTML fragments and pages for every dashboard view model.
//!
//! Fragments are swapped into the page by element id, both on first render
//! and when an SSE update arrives. All markup comes from the minijinja
//! templates under `templates/`, rendered with HTML autoescaping.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use minijinja::{context, AutoEscape, Environment, Value};
use tracing::error;

use argus_common::models::{Engine, FeedCategory, MediaKind, MediaStats};
use argus_dashboard::cards::CardView;
use argus_dashboard::dashboard::PhaseView;
use argus_dashboard::feed::FeedView;
use argus_dashboard::graph::{GraphView, Tooltip};
use argus_dashboard::media::{CategoryView, MediaDetailView};
use argus_dashboard::stats::{StatCounters, StatsPanel};
use argus_dashboard::Variant;

const TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("nav.html", include_str!("../templates/nav.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("media.html", include_str!("../templates/media.html")),
    ("graph.html", include_str!("../templates/graph.html")),
    ("feed.html", include_str!("../templates/fragments/feed.html")),
    ("feed_filter.html", include_str!("../templates/fragments/feed_filter.html")),
    ("cards.html", include_str!("../templates/fragments/cards.html")),
    ("stats.html", include_str!("../templates/fragments/stats.html")),
    ("phase.html", include_str!("../templates/fragments/phase.html")),
    ("notice.html", include_str!("../templates/fragments/notice.html")),
    ("category.html", include_str!("../templates/fragments/category.html")),
    ("options.html", include_str!("../templates/fragments/options.html")),
    ("media_detail.html", include_str!("../templates/fragments/media_detail.html")),
    ("graph.svg", include_str!("../templates/fragments/graph.svg")),
    ("tooltip.html", include_str!("../templates/fragments/tooltip.html")),
];

fn templates() -> &'static Environment<'static> {
    static TEMPLATES: OnceLock<Environment<'static>> = OnceLock::new();
    TEMPLATES.get_or_init(|| {
        let mut env = Environment::new();
        // The SVG canvas is embedded inline in HTML, so it escapes the same way.
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        for &(name, source) in TEMPLATE_SOURCES {
            if let Err(e) = env.add_template(name, source) {
                error!(template = name, error = %e, "Failed to compile template");
            }
        }
        env
    })
}

/// Render a named template; failures are logged and yield empty markup.
fn render(name: &str, ctx: Value) -> String {
    templates()
        .get_template(name)
        .and_then(|t| t.render(ctx))
        .unwrap_or_else(|e| {
            error!(template = name, error = %e, "Template render failed");
            String::new()
        })
}

/// Markup produced by another template, embedded without re-escaping.
fn rendered(html: String) -> Value {
    Value::from_safe_string(html)
}

// ── Pages ─────────────────────────────────────────────────────────────────────

/// Wrap a page body in the shared document shell.
pub fn page(title: &str, body: String) -> String {
    render("layout.html", context! { title, body => rendered(body) })
}

/// Already-rendered fragments that make up the operations dashboard.
pub struct DashboardParts {
    pub stats: String,
    pub phase: String,
    pub filters: String,
    pub feed: String,
    pub cards: String,
}

pub fn dashboard_html(variant: Variant, parts: DashboardParts) -> String {
    let (heading, cards_title) = match variant {
        Variant::Enhanced => ("Intelligence Operations", "Intelligence Discoveries"),
        Variant::Basic => ("Search Operations", "Recent Discoveries"),
    };
    let engines: Vec<Value> = Engine::ALL
        .iter()
        .map(|e| context! { name => e.as_str(), checked => *e == Engine::Google })
        .collect();
    render(
        "dashboard.html",
        context! {
            heading,
            cards_title,
            engines,
            show_osint => variant == Variant::Enhanced,
            stats => rendered(parts.stats),
            phase => rendered(parts.phase),
            filters => rendered(parts.filters),
            feed => rendered(parts.feed),
            cards => rendered(parts.cards),
        },
    )
}

/// One gallery section per media category.
pub struct MediaSection {
    pub kind: MediaKind,
    pub count: usize,
    pub grid: String,
}

pub fn media_page_html(
    stats: &MediaStats,
    search: &str,
    domains: String,
    engines: String,
    sections: Vec<MediaSection>,
) -> String {
    let tiles = [
        ("Images", stats.total_images),
        ("Videos", stats.total_videos),
        ("Documents", stats.total_documents),
        ("Audio", stats.total_audio),
    ]
    .map(|(label, value)| context! { label, value });
    let sections: Vec<Value> = sections
        .into_iter()
        .map(|s| context! { name => s.kind.as_str(), count => s.count, grid => rendered(s.grid) })
        .collect();
    render(
        "media.html",
        context! {
            tiles,
            search,
            domains => rendered(domains),
            engines => rendered(engines),
            sections,
        },
    )
}

const LEGEND: &[(&str, &str)] = &[
    ("Document", "#007bff"),
    ("Domain", "#ffc107"),
    ("Keyword", "#28a745"),
    ("Other", "#6c757d"),
];

pub fn graph_page_html(svg: String) -> String {
    let legend: Vec<Value> = LEGEND
        .iter()
        .map(|&(label, color)| context! { label, color })
        .collect();
    render("graph.html", context! { legend, svg => rendered(svg) })
}

// ── Activity feed ─────────────────────────────────────────────────────────────

pub fn feed_html(view: &FeedView) -> String {
    render("feed.html", context! { view })
}

pub fn feed_filter_html(active: FeedCategory) -> String {
    let filters: Vec<Value> = [
        (FeedCategory::All, "All"),
        (FeedCategory::Osint, "OSINT"),
        (FeedCategory::Social, "Social"),
    ]
    .into_iter()
    .map(|(f, label)| context! { value => f.as_str(), label, active => f == active })
    .collect();
    render("feed_filter.html", context! { filters })
}

// ── Cards ─────────────────────────────────────────────────────────────────────

pub fn cards_html(cards: &[CardView]) -> String {
    render("cards.html", context! { cards })
}

// ── Stats, phase, progress ────────────────────────────────────────────────────

pub fn stats_html(panel: &StatsPanel) -> String {
    let tiles: Option<Vec<Value>> = panel.counters().map(|counters| {
        let pairs = match *counters {
            StatCounters::Basic { total_documents, total_images, total_videos, domains_scraped } => [
                ("Documents", total_documents),
                ("Images", total_images),
                ("Videos", total_videos),
                ("Domains", domains_scraped),
            ],
            StatCounters::Enhanced { total_documents, osint_intelligence, subdomains_found, total_media } => [
                ("Documents", total_documents),
                ("OSINT Intelligence", osint_intelligence),
                ("Subdomains", subdomains_found),
                ("Media", total_media),
            ],
        };
        pairs.into_iter().map(|(label, value)| context! { label, value }).collect()
    });
    render("stats.html", context! { tiles, shares => panel.shares() })
}

pub fn phase_html(phase: Option<&PhaseView>, progress: &BTreeMap<String, f64>) -> String {
    render("phase.html", context! { phase, progress })
}

pub fn notice_html(level: &str, message: &str) -> String {
    render("notice.html", context! { level, message })
}

// ── Media ─────────────────────────────────────────────────────────────────────

pub fn category_html(kind: MediaKind, view: &CategoryView) -> String {
    render("category.html", context! { kind => kind.as_str(), view })
}

pub fn options_html(placeholder: &str, values: &[String], selected: &str) -> String {
    render("options.html", context! { placeholder, values, selected })
}

pub fn media_detail_html(d: &MediaDetailView) -> String {
    render("media_detail.html", context! { d })
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Edges first, then nodes, then labels so labels draw on top.
pub fn graph_svg(view: &GraphView) -> String {
    render("graph.svg", context! { view })
}

pub fn tooltip_html(tip: &Tooltip) -> String {
    render("tooltip.html", context! { tip })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_common::models::{ActivityEvent, ActivityKind, DiscoveryItem};
    use argus_dashboard::cards::{CardKind, DiscoveryCardStore};
    use argus_dashboard::feed::EventFeed;
    use argus_dashboard::graph::{EdgeView, NodeView};
    use argus_dashboard::media::MediaCardView;

    #[test]
    fn test_every_template_compiles() {
        for &(name, _) in TEMPLATE_SOURCES {
            assert!(templates().get_template(name).is_ok(), "{} failed to compile", name);
        }
    }

    #[test]
    fn test_empty_feed_shows_placeholder_then_entries() {
        let mut feed = EventFeed::new(5);
        assert!(feed_html(&feed.view()).contains("Waiting for activity..."));

        feed.record(ActivityEvent::new("<b>hi</b>", ActivityKind::Info));
        let html = feed_html(&feed.view());
        assert!(!html.contains("Waiting for activity..."));
        assert!(html.contains("&lt;b&gt;hi"));
        assert!(!html.contains("<b>"));
        assert!(html.contains(r#"data-category="all""#));
    }

    #[test]
    fn test_backend_text_cannot_inject_markup() {
        let mut store = DiscoveryCardStore::new(3);
        store.add_card(
            DiscoveryItem {
                title: Some("<script>alert(1)</script>".into()),
                source_url: Some(r#"x" onclick="steal()"#.into()),
                ..Default::default()
            },
            CardKind::Traditional,
        );
        let html = cards_html(&store.view());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains(r#"" onclick=""#));

        let notice = notice_html("danger", "<img src=x onerror=alert(1)>");
        assert!(!notice.contains("<img"));
    }

    #[test]
    fn test_hidden_entries_keep_markup() {
        let mut feed = EventFeed::new(5);
        feed.record(ActivityEvent::new("general", ActivityKind::Info));
        feed.set_filter(FeedCategory::Osint);
        let html = feed_html(&feed.view());
        assert!(html.contains("general"));
        assert!(html.contains(r#"style="display:none""#));
    }

    #[test]
    fn test_feed_filter_marks_active_button() {
        let html = feed_filter_html(FeedCategory::Social);
        assert!(html.contains(r#"btn-primary" data-feed-filter="social""#));
        assert!(html.contains(r#"btn-outline-secondary" data-feed-filter="all""#));
    }

    #[test]
    fn test_card_markup_uses_style() {
        let mut store = DiscoveryCardStore::new(3);
        store.add_card(DiscoveryItem { title: Some("Sub".into()), ..Default::default() }, CardKind::Osint);
        let html = cards_html(&store.view());
        assert!(html.contains("border-danger"));
        assert!(html.contains("OSINT"));
        assert!(html.contains("trust-score low"));
        assert!(cards_html(&[]).contains("No discoveries yet"));
    }

    #[test]
    fn test_svg_draws_edges_before_nodes_before_labels() {
        let view = GraphView {
            width: 100.0,
            height: 100.0,
            edges: vec![EdgeView { x1: 0.0, y1: 0.0, x2: 10.0, y2: 10.0 }],
            nodes: vec![NodeView {
                id: "n".into(),
                label: "Node".into(),
                x: 5.0,
                y: 5.0,
                radius: 8.0,
                color: "#007bff",
            }],
            tooltip: None,
        };
        let svg = graph_svg(&view);
        let line = svg.find("<line").unwrap();
        let circle = svg.find("<circle").unwrap();
        let text = svg.find("<text").unwrap();
        assert!(line < circle && circle < text);
        assert!(svg.contains(r##"fill="#007bff""##));
        assert!(svg.contains(r#"data-id="n""#));
    }

    #[test]
    fn test_document_icon_falls_back_to_generic_file() {
        let card = MediaCardView {
            index: 0,
            title: "Report".into(),
            url: "https://acme.com/r.xyz".into(),
            domain: "acme.com".into(),
            engine: "google".into(),
            type_label: None,
            thumbnail: None,
            platform: None,
            file_size: None,
            icon: None,
        };
        let html = category_html(MediaKind::Documents, &CategoryView::Items { items: vec![card] });
        assert!(html.contains("fa-file-alt"));
        assert!(html.contains(r#"data-kind="documents" data-index="0""#));
    }

    #[test]
    fn test_options_mark_selection() {
        let html = options_html("All Domains", &["a.com".into(), "b.com".into()], "b.com");
        assert!(html.starts_with(r#"<option value="">All Domains</option>"#));
        assert!(html.contains(r#"<option value="b.com" selected>b.com</option>"#));
        assert!(html.contains(r#"<option value="a.com">a.com</option>"#));
    }

    #[test]
    fn test_page_shell_wraps_body_unescaped() {
        let html = page("Operations", r#"<div id="body"></div>"#.to_string());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Operations — Argus</title>"));
        assert!(html.contains(r#"<div id="body"></div>"#));
        assert!(html.contains("Media Gallery"));
    }
}
