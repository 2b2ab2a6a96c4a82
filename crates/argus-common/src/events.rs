//! Push events emitted by the backend over the real-time channel.
//!
//! Payload fields are all optional: the backend omits or mistypes fields
//! freely, so every field is resolved leniently and display code supplies
//! its own fallback text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::lenient::{lenient_f64, lenient_object, lenient_string, lenient_strings, lenient_u64};
use crate::models::MediaCounts;

// ── Payloads ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseStart {
    #[serde(deserialize_with = "lenient_string")]
    pub phase: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineStart {
    #[serde(deserialize_with = "lenient_string")]
    pub search_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub engine: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingStart {
    #[serde(deserialize_with = "lenient_string")]
    pub search_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingSuccess {
    #[serde(deserialize_with = "lenient_string")]
    pub search_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub doc_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub engine: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    pub media_count: Option<MediaCounts>,
    #[serde(deserialize_with = "lenient_string")]
    pub data_type: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub trust_score: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub domain: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub content_preview: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsintStart {
    #[serde(deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsintDiscovery {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub intelligence_type: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub documents_count: Option<u64>,
    #[serde(deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient_object")]
    pub media_count: Option<MediaCounts>,
    #[serde(deserialize_with = "lenient_f64")]
    pub trust_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsintComplete {
    #[serde(deserialize_with = "lenient_u64")]
    pub subdomains_found: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub intelligence_items: Option<u64>,
    #[serde(deserialize_with = "lenient_u64")]
    pub documents_found: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalStats {
    #[serde(deserialize_with = "lenient_u64")]
    pub results_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchComplete {
    #[serde(deserialize_with = "lenient_string")]
    pub search_id: Option<String>,
    pub analysis: Option<Value>,
    pub final_stats: Option<FinalStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchError {
    #[serde(deserialize_with = "lenient_string")]
    pub search_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub error: Option<String>,
}

// ── Event union ───────────────────────────────────────────────────────────────

/// Every push event the dashboard reacts to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// The transport (re)connected.
    Connect,
    SearchPhaseStart(PhaseStart),
    SearchEngineStart(EngineStart),
    ScrapingStart(ScrapingStart),
    ScrapingSuccess(ScrapingSuccess),
    OsintStart(OsintStart),
    OsintDiscovery(OsintDiscovery),
    OsintComplete(OsintComplete),
    SearchComplete(SearchComplete),
    SearchError(SearchError),
}

impl PushEvent {
    /// Decode a named event and its JSON payload.
    ///
    /// Returns `None` for event names the dashboard does not handle. A payload
    /// of the wrong shape decodes as the default (all fields missing) so the
    /// event is still shown with fallback text.
    pub fn decode(name: &str, data: Value) -> Option<Self> {
        fn payload<T: for<'de> Deserialize<'de> + Default>(name: &str, data: Value) -> T {
            serde_json::from_value(data).unwrap_or_else(|e| {
                debug!(event = name, error = %e, "malformed push payload, using fallbacks");
                T::default()
            })
        }

        let event = match name {
            "connect" => Self::Connect,
            "search_phase_start" => Self::SearchPhaseStart(payload(name, data)),
            "search_engine_start" => Self::SearchEngineStart(payload(name, data)),
            "scraping_start" => Self::ScrapingStart(payload(name, data)),
            "scraping_success" => Self::ScrapingSuccess(payload(name, data)),
            "osint_start" => Self::OsintStart(payload(name, data)),
            "osint_discovery" => Self::OsintDiscovery(payload(name, data)),
            "osint_complete" => Self::OsintComplete(payload(name, data)),
            "search_complete" => Self::SearchComplete(payload(name, data)),
            "search_error" => Self::SearchError(payload(name, data)),
            _ => return None,
        };
        Some(event)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::SearchPhaseStart(_) => "search_phase_start",
            Self::SearchEngineStart(_) => "search_engine_start",
            Self::ScrapingStart(_) => "scraping_start",
            Self::ScrapingSuccess(_) => "scraping_success",
            Self::OsintStart(_) => "osint_start",
            Self::OsintDiscovery(_) => "osint_discovery",
            Self::OsintComplete(_) => "osint_complete",
            Self::SearchComplete(_) => "search_complete",
            Self::SearchError(_) => "search_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_scraping_success() {
        let ev = PushEvent::decode(
            "scraping_success",
            json!({
                "engine": "google",
                "title": "Acme Corp",
                "media_count": {"images": 2, "videos": 0},
                "trust_score": 7.5,
                "domain": "acme.com",
            }),
        )
        .unwrap();

        let PushEvent::ScrapingSuccess(p) = ev else { panic!("wrong variant") };
        assert_eq!(p.title.as_deref(), Some("Acme Corp"));
        assert_eq!(p.trust_score, Some(7.5));
        assert_eq!(p.media_count.unwrap().summary(), "2 images");
        assert_eq!(p.url, None);
    }

    #[test]
    fn test_decode_mistyped_fields_are_coerced() {
        let ev = PushEvent::decode(
            "osint_discovery",
            json!({"title": 42, "documents_count": "7", "trust_score": "high"}),
        )
        .unwrap();
        let PushEvent::OsintDiscovery(p) = ev else { panic!("wrong variant") };
        assert_eq!(p.title.as_deref(), Some("42"));
        assert_eq!(p.documents_count, Some(7));
        assert_eq!(p.trust_score, None);
    }

    #[test]
    fn test_decode_non_object_payload_falls_back() {
        let ev = PushEvent::decode("search_error", json!("boom")).unwrap();
        assert_eq!(ev, PushEvent::SearchError(SearchError::default()));
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        assert!(PushEvent::decode("joined_search", json!({})).is_none());
    }

    #[test]
    fn test_keywords_accept_single_string() {
        let ev = PushEvent::decode("search_engine_start", json!({"engine": "google", "keywords": "acme"})).unwrap();
        let PushEvent::SearchEngineStart(p) = ev else { panic!("wrong variant") };
        assert_eq!(p.keywords, vec!["acme".to_string()]);
    }
}
