//! Core data types mirroring the backend's REST payloads and the
//! dashboard's own view state.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::lenient::{
    count_or_zero, enum_or_default, lenient_f64, lenient_items, lenient_string, lenient_strings,
    lenient_u64, string_or_empty,
};

// ---------------------------------------------------------------------------
// Activity feed
// ---------------------------------------------------------------------------

/// Visual kind of an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Info,
    Success,
    Error,
    Osint,
    Social,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Osint => "osint",
            Self::Social => "social",
        }
    }
}

/// Feed category. Entries carry one; the feed filter selects by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedCategory {
    #[default]
    All,
    Osint,
    Social,
}

impl FeedCategory {
    /// Resolve a payload `data_type` or a filter control value.
    /// Anything unrecognised lands in `All`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "osint" | "osintfeed" => Self::Osint,
            "social" | "socialfeed" => Self::Social,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Osint => "osint",
            Self::Social => "social",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEvent {
    pub message: String,
    pub kind: ActivityKind,
    pub category: FeedCategory,
    pub timestamp: DateTime<Local>,
}

impl ActivityEvent {
    pub fn new(message: impl Into<String>, kind: ActivityKind) -> Self {
        Self::categorized(message, kind, FeedCategory::All)
    }

    pub fn categorized(message: impl Into<String>, kind: ActivityKind, category: FeedCategory) -> Self {
        Self {
            message: message.into(),
            kind,
            category,
            timestamp: Local::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Discoveries
// ---------------------------------------------------------------------------

/// Ordered `kind -> count` pairs, as the backend sent them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaCounts(pub Vec<(String, u64)>);

impl MediaCounts {
    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-zero entries only, e.g. `[("images", 2)]`.
    pub fn non_zero(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().filter(|(_, n)| *n > 0).map(|(k, n)| (k.as_str(), *n))
    }

    /// "2 images, 1 videos"; empty when every count is zero.
    pub fn summary(&self) -> String {
        self.non_zero()
            .map(|(k, n)| format!("{} {}", n, k))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'de> Deserialize<'de> for MediaCounts {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> serde::de::Visitor<'de> for CountsVisitor {
            type Value = MediaCounts;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of media kind to count")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(MediaCounts::default())
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::new();
                while let Some((k, v)) = map.next_entry::<String, serde_json::Value>()? {
                    out.push((k, crate::lenient::value_as_u64(&v).unwrap_or(0)));
                }
                Ok(MediaCounts(out))
            }
        }

        deserializer.deserialize_any(CountsVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryItem {
    pub title: Option<String>,
    pub source_url: Option<String>,
    pub media_url: Option<String>,
    pub domain: Option<String>,
    pub engine: Option<String>,
    pub trust_score: Option<f64>,
    pub media_counts: Option<MediaCounts>,
    pub discovery_date: Option<DateTime<Local>>,
    pub content_preview: Option<String>,
    pub intelligence_type: Option<String>,
    pub documents_count: Option<u64>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    Google,
    GoogleDork,
    Duckduckgo,
    TwitterDork,
    YoutubeDork,
}

impl Engine {
    pub const ALL: [Engine; 5] = [
        Engine::Google,
        Engine::GoogleDork,
        Engine::Duckduckgo,
        Engine::TwitterDork,
        Engine::YoutubeDork,
    ];

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        match raw.trim() {
            "google" => Ok(Self::Google),
            "google_dork" => Ok(Self::GoogleDork),
            "duckduckgo" => Ok(Self::Duckduckgo),
            "twitter_dork" => Ok(Self::TwitterDork),
            "youtube_dork" => Ok(Self::YoutubeDork),
            other => Err(ValidationError::UnknownEngine(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GoogleDork => "google_dork",
            Self::Duckduckgo => "duckduckgo",
            Self::TwitterDork => "twitter_dork",
            Self::YoutubeDork => "youtube_dork",
        }
    }
}

/// Engines whose results are reported in the social feed as well.
pub fn is_social_engine(engine: &str) -> bool {
    matches!(engine, "twitter_dork" | "youtube_dork")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    pub engines: Vec<Engine>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub include_osint: bool,
}

impl SearchRequest {
    pub fn new(keywords: Vec<String>, engines: Vec<Engine>) -> Self {
        Self { keywords, engines, include_osint: false }
    }

    pub fn with_osint(mut self, include: bool) -> Self {
        self.include_osint = include;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ValidationError::NoKeywords);
        }
        if self.engines.is_empty() {
            return Err(ValidationError::NoEngines);
        }
        Ok(())
    }
}

/// Reply to a start-search POST.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStarted {
    pub search_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// `GET /api/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicStats {
    #[serde(deserialize_with = "count_or_zero")]
    pub total_documents: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_images: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_videos: u64,
    #[serde(deserialize_with = "lenient_strings")]
    pub domains_scraped: Vec<String>,
    #[serde(deserialize_with = "count_or_zero")]
    pub active_searches: u64,
}

/// `GET /api/enhanced-stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancedStats {
    #[serde(deserialize_with = "count_or_zero")]
    pub total_documents: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub osint_intelligence: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub subdomains_discovered: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_images: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_videos: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_documents_media: u64,
}

/// `GET /api/media-stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaStats {
    #[serde(deserialize_with = "count_or_zero")]
    pub total_images: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_videos: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_documents: u64,
    #[serde(deserialize_with = "count_or_zero")]
    pub total_audio: u64,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Images,
    Videos,
    Documents,
    Audio,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Images,
        MediaKind::Videos,
        MediaKind::Documents,
        MediaKind::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Videos => "videos",
            Self::Documents => "documents",
            Self::Audio => "audio",
        }
    }

    /// Singular noun used by detail views ("Image Details").
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Images => "image",
            Self::Videos => "video",
            Self::Documents => "document",
            Self::Audio => "audio",
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            Self::Images => "No images found",
            Self::Videos => "No videos found",
            Self::Documents => "No documents found",
            Self::Audio => "No audio files found",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaItem {
    #[serde(deserialize_with = "string_or_empty")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub alt: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub filename: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub domain: Option<String>,
    #[serde(rename = "search_engine", deserialize_with = "lenient_string")]
    pub engine: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub media_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub discovery_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub source_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub file_size: Option<String>,
}

impl MediaItem {
    /// First of alt, title, filename that is present.
    pub fn display_name(&self) -> Option<&str> {
        self.alt
            .as_deref()
            .or(self.title.as_deref())
            .or(self.filename.as_deref())
            .filter(|s| !s.is_empty())
    }
}

/// `GET /api/media-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSnapshot {
    #[serde(deserialize_with = "lenient_items")]
    pub images: Vec<MediaItem>,
    #[serde(deserialize_with = "lenient_items")]
    pub videos: Vec<MediaItem>,
    #[serde(deserialize_with = "lenient_items")]
    pub documents: Vec<MediaItem>,
    #[serde(deserialize_with = "lenient_items")]
    pub audio: Vec<MediaItem>,
}

impl MediaSnapshot {
    pub fn category(&self, kind: MediaKind) -> &[MediaItem] {
        match kind {
            MediaKind::Images => &self.images,
            MediaKind::Videos => &self.videos,
            MediaKind::Documents => &self.documents,
            MediaKind::Audio => &self.audio,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MediaKind, &MediaItem)> {
        MediaKind::ALL
            .into_iter()
            .flat_map(move |kind| self.category(kind).iter().map(move |item| (kind, item)))
    }
}

// ---------------------------------------------------------------------------
// Relationship graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Document,
    Domain,
    Keyword,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphNode {
    #[serde(deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub label: String,
    #[serde(rename = "type", deserialize_with = "enum_or_default")]
    pub node_type: NodeType,
    #[serde(deserialize_with = "lenient_u64")]
    pub count: Option<u64>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub trust_score: Option<f64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub media_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphEdge {
    #[serde(deserialize_with = "string_or_empty")]
    pub source: String,
    #[serde(deserialize_with = "string_or_empty")]
    pub target: String,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
}

/// `GET /api/graph-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    #[serde(deserialize_with = "lenient_items")]
    pub nodes: Vec<GraphNode>,
    #[serde(deserialize_with = "lenient_items")]
    pub links: Vec<GraphEdge>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_media_counts_keep_backend_order() {
        let counts: MediaCounts =
            serde_json::from_str(r#"{"videos": 1, "images": 2, "documents": 0}"#).unwrap();
        assert_eq!(counts.summary(), "1 videos, 2 images");
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_media_counts_zero_only_is_empty_summary() {
        let counts: MediaCounts = serde_json::from_str(r#"{"images": 2, "videos": 0}"#).unwrap();
        assert_eq!(counts.summary(), "2 images");
        let none: MediaCounts = serde_json::from_str(r#"{"images": 0}"#).unwrap();
        assert_eq!(none.summary(), "");
    }

    #[test]
    fn test_search_request_validation() {
        let empty = SearchRequest::new(vec!["  ".into()], vec![Engine::Google]);
        assert_eq!(empty.validate(), Err(ValidationError::NoKeywords));

        let no_engines = SearchRequest::new(vec!["acme".into()], vec![]);
        assert_eq!(no_engines.validate(), Err(ValidationError::NoEngines));

        let ok = SearchRequest::new(vec!["acme".into()], vec![Engine::Google]);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_include_osint_only_serialized_when_set() {
        let req = SearchRequest::new(vec!["acme".into()], vec![Engine::GoogleDork]);
        let body = serde_json::to_value(&req).unwrap();
        assert!(body.get("include_osint").is_none());
        assert_eq!(body["engines"][0], "google_dork");

        let body = serde_json::to_value(req.with_osint(true)).unwrap();
        assert_eq!(body["include_osint"], true);
    }

    #[test]
    fn test_unknown_node_type_is_preserved_as_unknown() {
        let node: GraphNode =
            serde_json::from_str(r#"{"id": "x", "label": "X", "type": "person"}"#).unwrap();
        assert_eq!(node.node_type, NodeType::Unknown);
    }

    #[test]
    fn test_media_item_field_names() {
        let item: MediaItem = serde_json::from_str(
            r#"{"url": "http://a/x.png", "search_engine": "google", "type": "png", "alt": "logo"}"#,
        )
        .unwrap();
        assert_eq!(item.engine.as_deref(), Some("google"));
        assert_eq!(item.media_type.as_deref(), Some("png"));
        assert_eq!(item.display_name(), Some("logo"));
    }

    #[test]
    fn test_feed_category_parse() {
        assert_eq!(FeedCategory::parse("osint"), FeedCategory::Osint);
        assert_eq!(FeedCategory::parse("socialFeed"), FeedCategory::Social);
        assert_eq!(FeedCategory::parse("traditional"), FeedCategory::All);
    }

    #[test]
    fn test_media_file_size_accepts_integer() {
        let snapshot: MediaSnapshot = serde_json::from_str(
            r#"{"documents": [{"url": "http://a/r.pdf", "file_size": 20480, "filename": "r.pdf"}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.documents[0].file_size.as_deref(), Some("20480"));
        assert_eq!(snapshot.documents[0].filename.as_deref(), Some("r.pdf"));
    }

    #[test]
    fn test_media_null_url_becomes_empty() {
        let snapshot: MediaSnapshot =
            serde_json::from_str(r#"{"images": [{"url": null, "title": "Logo"}], "videos": null}"#).unwrap();
        assert_eq!(snapshot.images.len(), 1);
        assert_eq!(snapshot.images[0].url, "");
        assert_eq!(snapshot.images[0].title.as_deref(), Some("Logo"));
        assert!(snapshot.videos.is_empty());
    }

    #[test]
    fn test_media_malformed_entry_is_skipped_not_fatal() {
        let snapshot: MediaSnapshot = serde_json::from_str(
            r#"{"images": ["not-an-object", {"url": "http://a/x.png", "domain": 42}]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.images.len(), 1);
        assert_eq!(snapshot.images[0].domain.as_deref(), Some("42"));
    }

    #[test]
    fn test_graph_numeric_ids_are_accepted() {
        let graph: GraphSnapshot = serde_json::from_str(
            r#"{"nodes": [{"id": 7, "label": null, "type": null, "count": "4", "trust_score": "8.5"}],
                "links": [{"source": 7, "target": "acme.com"}]}"#,
        )
        .unwrap();
        let node = &graph.nodes[0];
        assert_eq!(node.id, "7");
        assert_eq!(node.label, "");
        assert_eq!(node.node_type, NodeType::Unknown);
        assert_eq!(node.count, Some(4));
        assert_eq!(node.trust_score, Some(8.5));
        assert_eq!(graph.links[0].source, "7");
    }

    #[test]
    fn test_stats_tolerate_mistyped_counters() {
        let stats: EnhancedStats =
            serde_json::from_str(r#"{"total_documents": "12", "osint_intelligence": null, "total_images": 3}"#)
                .unwrap();
        assert_eq!(stats.total_documents, 12);
        assert_eq!(stats.osint_intelligence, 0);
        assert_eq!(stats.total_images, 3);
    }
}
