//! Media catalog: snapshot load, client-side filters, detail view and export.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use argus_common::error::Result;
use argus_common::models::{MediaItem, MediaKind, MediaSnapshot, MediaStats};
use argus_common::transport::Backend;

pub const LOAD_ERROR_MESSAGE: &str = "Failed to load media data";

/// Icon suffix (`fa-file-<icon>`) for a document extension.
pub fn document_icon(doc_type: Option<&str>) -> &'static str {
    match doc_type.map(|t| t.to_ascii_lowercase()).as_deref() {
        Some("pdf") => "pdf",
        Some("doc") | Some("docx") => "word",
        Some("xls") | Some("xlsx") => "excel",
        Some("ppt") | Some("pptx") => "powerpoint",
        _ => "alt",
    }
}

// ── Filters ───────────────────────────────────────────────────────────────────

/// The three independent predicates; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MediaFilter {
    pub search: String,
    pub domain: String,
    pub engine: String,
}

impl MediaFilter {
    pub fn new(search: &str, domain: &str, engine: &str) -> Self {
        Self {
            search: search.to_string(),
            domain: domain.to_string(),
            engine: engine.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.domain.is_empty() && self.engine.is_empty()
    }

    /// Search text is matched case-insensitively against title, alt and filename.
    pub fn matches(&self, item: &MediaItem) -> bool {
        let needle = self.search.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|v| v.to_lowercase().contains(&needle))
        };
        let search_ok = self.search.is_empty()
            || contains(&item.title)
            || contains(&item.alt)
            || contains(&item.filename);
        let domain_ok = self.domain.is_empty() || item.domain.as_deref() == Some(self.domain.as_str());
        let engine_ok = self.engine.is_empty() || item.engine.as_deref() == Some(self.engine.as_str());

        search_ok && domain_ok && engine_ok
    }
}

// ── Views ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaCardView {
    /// Position in the unfiltered category, for detail lookups.
    pub index: usize,
    pub title: String,
    pub url: String,
    pub domain: String,
    pub engine: String,
    pub type_label: Option<String>,
    pub thumbnail: Option<String>,
    pub platform: Option<String>,
    pub file_size: Option<String>,
    pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CategoryView {
    Loading,
    Items { items: Vec<MediaCardView> },
    Empty { message: &'static str },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaDetailView {
    pub heading: String,
    pub title: String,
    pub domain: String,
    pub source: String,
    pub discovery_date: String,
    pub source_url: String,
    pub url: String,
    pub show_preview: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_images: usize,
    pub total_videos: usize,
    pub total_documents: usize,
    pub total_audio: usize,
}

/// The downloadable JSON report of the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaReport {
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub media_data: MediaSnapshot,
}

impl MediaReport {
    pub fn file_name(&self) -> String {
        format!("media_report_{}.json", self.generated_at.format("%Y-%m-%d"))
    }
}

fn title_fallback(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Images => "Image",
        MediaKind::Videos => "Video",
        MediaKind::Documents => "Document",
        MediaKind::Audio => "Audio",
    }
}

fn card_title(kind: MediaKind, item: &MediaItem) -> Option<String> {
    let pick = match kind {
        MediaKind::Images => item.alt.as_ref().or(item.title.as_ref()),
        MediaKind::Documents => item.filename.as_ref(),
        MediaKind::Videos | MediaKind::Audio => item.title.as_ref(),
    };
    pick.filter(|s| !s.is_empty()).cloned()
}

fn card_view(kind: MediaKind, index: usize, item: &MediaItem) -> MediaCardView {
    MediaCardView {
        index,
        title: card_title(kind, item).unwrap_or_else(|| title_fallback(kind).to_string()),
        url: item.url.clone(),
        domain: item.domain.clone().unwrap_or_default(),
        engine: item.engine.as_deref().unwrap_or("unknown").to_uppercase(),
        type_label: item.media_type.as_deref().map(str::to_uppercase),
        thumbnail: item.thumbnail.clone(),
        platform: item.platform.as_deref().map(str::to_uppercase),
        file_size: item.file_size.clone(),
        icon: (kind == MediaKind::Documents).then(|| document_icon(item.media_type.as_deref())),
    }
}

/// Date part of an RFC 3339 or naive ISO timestamp; the raw text otherwise.
fn format_discovery_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else { return "N/A".to_string() };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.to_string();
    }
    raw.to_string()
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum CatalogState {
    Loading,
    Loaded(MediaSnapshot),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct MediaCatalog {
    state: CatalogState,
    stats: MediaStats,
    domains: Vec<String>,
    engines: Vec<String>,
    filter: MediaFilter,
    /// Indices into the snapshot per category; derived from `filter`.
    visible: BTreeMap<MediaKind, Vec<usize>>,
}

impl Default for MediaCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaCatalog {
    pub fn new() -> Self {
        Self {
            state: CatalogState::Loading,
            stats: MediaStats::default(),
            domains: Vec::new(),
            engines: Vec::new(),
            filter: MediaFilter::default(),
            visible: BTreeMap::new(),
        }
    }

    /// Fetch the snapshot and its counts concurrently.
    pub async fn fetch(backend: &dyn Backend) -> Result<(MediaSnapshot, MediaStats)> {
        let (data, stats) = tokio::join!(backend.media_data(), backend.media_stats());
        Ok((data?, stats?))
    }

    pub async fn load(&mut self, backend: &dyn Backend) {
        self.apply_load(Self::fetch(backend).await);
    }

    /// Install a fetched snapshot, or switch every category to the error view.
    pub fn apply_load(&mut self, result: Result<(MediaSnapshot, MediaStats)>) {
        match result {
            Ok((snapshot, stats)) => {
                info!(
                    images = snapshot.images.len(),
                    videos = snapshot.videos.len(),
                    documents = snapshot.documents.len(),
                    audio = snapshot.audio.len(),
                    "media snapshot loaded"
                );
                self.populate_filter_domains(&snapshot);
                self.stats = stats;
                self.state = CatalogState::Loaded(snapshot);
                self.recompute();
            }
            Err(e) => {
                warn!(error = %e, "Error loading media data");
                if !matches!(self.state, CatalogState::Loaded(_)) {
                    self.state = CatalogState::Failed(LOAD_ERROR_MESSAGE.to_string());
                    self.visible.clear();
                }
            }
        }
    }

    fn populate_filter_domains(&mut self, snapshot: &MediaSnapshot) {
        let mut seen_domains = HashSet::new();
        let mut seen_engines = HashSet::new();
        self.domains.clear();
        self.engines.clear();
        for (_, item) in snapshot.iter() {
            if let Some(d) = item.domain.as_ref().filter(|d| !d.is_empty()) {
                if seen_domains.insert(d.clone()) {
                    self.domains.push(d.clone());
                }
            }
            if let Some(e) = item.engine.as_ref().filter(|e| !e.is_empty()) {
                if seen_engines.insert(e.clone()) {
                    self.engines.push(e.clone());
                }
            }
        }
    }

    fn compute_visible(&self, kind: MediaKind) -> Vec<usize> {
        match &self.state {
            CatalogState::Loaded(snapshot) => snapshot
                .category(kind)
                .iter()
                .enumerate()
                .filter(|(_, item)| self.filter.matches(item))
                .map(|(i, _)| i)
                .collect(),
            _ => Vec::new(),
        }
    }

    fn recompute(&mut self) -> Vec<MediaKind> {
        let mut changed = Vec::new();
        for kind in MediaKind::ALL {
            let next = self.compute_visible(kind);
            if self.visible.get(&kind) != Some(&next) {
                self.visible.insert(kind, next);
                changed.push(kind);
            }
        }
        changed
    }

    /// Re-filter every category. Returns the categories whose contents changed.
    pub fn apply_filters(&mut self, search: &str, domain: &str, engine: &str) -> Vec<MediaKind> {
        self.filter = MediaFilter::new(search, domain, engine);
        self.recompute()
    }

    pub fn filter(&self) -> &MediaFilter {
        &self.filter
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, CatalogState::Loaded(_))
    }

    pub fn snapshot(&self) -> Option<&MediaSnapshot> {
        match &self.state {
            CatalogState::Loaded(s) => Some(s),
            _ => None,
        }
    }

    pub fn stats(&self) -> &MediaStats {
        &self.stats
    }

    /// Distinct domains, first-seen order.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Distinct engines, first-seen order.
    pub fn engines(&self) -> &[String] {
        &self.engines
    }

    /// Items of one category passing the current filter.
    pub fn filtered(&self, kind: MediaKind) -> Vec<&MediaItem> {
        match (&self.state, self.visible.get(&kind)) {
            (CatalogState::Loaded(s), Some(idx)) => {
                let items = s.category(kind);
                idx.iter().filter_map(|&i| items.get(i)).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn category_view(&self, kind: MediaKind) -> CategoryView {
        match &self.state {
            CatalogState::Loading => CategoryView::Loading,
            CatalogState::Failed(message) => CategoryView::Error { message: message.clone() },
            CatalogState::Loaded(snapshot) => {
                let items = snapshot.category(kind);
                let cards: Vec<_> = self
                    .visible
                    .get(&kind)
                    .map(|idx| {
                        idx.iter()
                            .filter_map(|&i| items.get(i).map(|item| card_view(kind, i, item)))
                            .collect()
                    })
                    .unwrap_or_default();
                if cards.is_empty() {
                    CategoryView::Empty { message: kind.empty_message() }
                } else {
                    CategoryView::Items { items: cards }
                }
            }
        }
    }

    pub fn detail(&self, kind: MediaKind, index: usize) -> Option<MediaDetailView> {
        let item = self.snapshot()?.category(kind).get(index)?;
        let singular = kind.singular();
        let mut heading = singular[..1].to_uppercase();
        heading.push_str(&singular[1..]);

        Some(MediaDetailView {
            heading: format!("{} Details", heading),
            title: item
                .title
                .as_ref()
                .or(item.alt.as_ref())
                .or(item.filename.as_ref())
                .filter(|s| !s.is_empty())
                .cloned()
                .unwrap_or_else(|| "N/A".to_string()),
            domain: item.domain.clone().unwrap_or_else(|| "N/A".to_string()),
            source: item.engine.as_deref().unwrap_or("unknown").to_uppercase(),
            discovery_date: format_discovery_date(item.discovery_date.as_deref()),
            source_url: item.source_url.clone().unwrap_or_default(),
            url: item.url.clone(),
            show_preview: kind == MediaKind::Images,
        })
    }

    /// `None` until a snapshot has loaded.
    pub fn export_report(&self) -> Option<MediaReport> {
        let snapshot = self.snapshot()?;
        Some(MediaReport {
            generated_at: Utc::now(),
            summary: ReportSummary {
                total_images: snapshot.images.len(),
                total_videos: snapshot.videos.len(),
                total_documents: snapshot.documents.len(),
                total_audio: snapshot.audio.len(),
            },
            media_data: snapshot.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(alt: &str, domain: &str, engine: &str) -> MediaItem {
        MediaItem {
            url: format!("http://{}/{}.png", domain, alt),
            alt: Some(alt.to_string()),
            domain: Some(domain.to_string()),
            engine: Some(engine.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_search_is_case_insensitive_across_fields() {
        let f = MediaFilter::new("LOGO", "", "");
        assert!(f.matches(&image("Company logo", "a.com", "google")));
        let doc = MediaItem { filename: Some("annual-LOGO.pdf".into()), ..Default::default() };
        assert!(f.matches(&doc));
        assert!(!f.matches(&image("banner", "a.com", "google")));
    }

    #[test]
    fn test_filter_keeps_search_text_as_typed() {
        let f = MediaFilter::new("Acme LOGO", "", "");
        assert_eq!(f.search, "Acme LOGO");
        assert!(f.matches(&image("acme logo", "a.com", "google")));

        let mut catalog = MediaCatalog::new();
        catalog.apply_filters("Annual Report", "", "");
        assert_eq!(catalog.filter().search, "Annual Report");
    }

    #[test]
    fn test_filter_domain_and_engine_are_exact() {
        let f = MediaFilter::new("", "a.com", "google");
        assert!(f.matches(&image("x", "a.com", "google")));
        assert!(!f.matches(&image("x", "sub.a.com", "google")));
        assert!(!f.matches(&image("x", "a.com", "google_dork")));
    }

    #[test]
    fn test_document_icons() {
        assert_eq!(document_icon(Some("pdf")), "pdf");
        assert_eq!(document_icon(Some("DOCX")), "word");
        assert_eq!(document_icon(Some("pptx")), "powerpoint");
        assert_eq!(document_icon(Some("csv")), "alt");
        assert_eq!(document_icon(None), "alt");
    }

    #[test]
    fn test_discovery_date_formats() {
        assert_eq!(format_discovery_date(Some("2024-03-01T10:20:30.123456")), "2024-03-01");
        assert_eq!(format_discovery_date(Some("2024-03-01T10:20:30Z")), "2024-03-01");
        assert_eq!(format_discovery_date(Some("yesterday")), "yesterday");
        assert_eq!(format_discovery_date(None), "N/A");
    }

    #[test]
    fn test_unloaded_catalog_has_no_report() {
        assert!(MediaCatalog::new().export_report().is_none());
        assert_eq!(MediaCatalog::new().category_view(MediaKind::Images), CategoryView::Loading);
    }
}
