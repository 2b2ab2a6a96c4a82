//! Discovery / intelligence cards.

use std::collections::VecDeque;

use serde::Serialize;

use argus_common::models::DiscoveryItem;

/// Capacity of the intelligence card grid on the enhanced dashboard.
pub const INTELLIGENCE_CARD_CAPACITY: usize = 24;
/// Capacity of the recent-discoveries grid on the basic dashboard.
pub const DISCOVERY_CARD_CAPACITY: usize = 12;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    #[default]
    Traditional,
    Osint,
    Social,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traditional => "traditional",
            Self::Osint => "osint",
            Self::Social => "social",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardStyle {
    pub icon: &'static str,
    pub color: &'static str,
    pub badge: &'static str,
}

pub fn card_style(kind: CardKind) -> CardStyle {
    match kind {
        CardKind::Osint => CardStyle { icon: "fas fa-user-secret", color: "danger", badge: "OSINT" },
        CardKind::Social => CardStyle { icon: "fas fa-share-alt", color: "warning", badge: "SOCIAL" },
        CardKind::Traditional => CardStyle { icon: "fas fa-file-alt", color: "primary", badge: "WEB" },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustClass {
    High,
    Medium,
    Low,
}

impl TrustClass {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= 7.0 => Self::High,
            Some(s) if s >= 4.0 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// "7.5" for present scores, "N/A" otherwise. Whole numbers drop the fraction.
pub fn format_trust(score: Option<f64>) -> String {
    match score {
        Some(s) if s.fract() == 0.0 => format!("{}", s as i64),
        Some(s) => format!("{}", s),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub item: DiscoveryItem,
    pub kind: CardKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub kind: CardKind,
    pub style: CardStyle,
    pub title: String,
    pub source: String,
    pub domain: Option<String>,
    pub preview: Option<String>,
    pub url: Option<String>,
    /// "5 media items"; only when the item carried media counts.
    pub media_total: Option<String>,
    /// Non-zero per-kind badges, e.g. "2 images".
    pub media_badges: Vec<String>,
    pub trust: String,
    pub trust_class: TrustClass,
}

#[derive(Debug, Clone)]
pub struct DiscoveryCardStore {
    cards: VecDeque<Card>,
    capacity: usize,
}

impl DiscoveryCardStore {
    pub fn new(capacity: usize) -> Self {
        Self { cards: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn add_card(&mut self, item: DiscoveryItem, kind: CardKind) {
        self.cards.push_front(Card { item, kind });
        while self.cards.len() > self.capacity {
            self.cards.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest first.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter()
    }

    pub fn view(&self) -> Vec<CardView> {
        self.cards.iter().map(card_view).collect()
    }
}

fn card_view(card: &Card) -> CardView {
    let item = &card.item;
    let source = item
        .source_url
        .clone()
        .or_else(|| item.media_url.clone())
        .unwrap_or_else(|| "Unknown Source".to_string());

    CardView {
        kind: card.kind,
        style: card_style(card.kind),
        title: item.title.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| "Intelligence Item".to_string()),
        source,
        domain: item.domain.clone(),
        preview: item.content_preview.clone(),
        url: item.media_url.clone().or_else(|| item.source_url.clone()),
        media_total: item.media_counts.as_ref().map(|c| format!("{} media items", c.total())),
        media_badges: item
            .media_counts
            .as_ref()
            .map(|c| c.non_zero().map(|(k, n)| format!("{} {}", n, k)).collect())
            .unwrap_or_default(),
        trust: format_trust(item.trust_score),
        trust_class: TrustClass::from_score(item.trust_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_common::models::MediaCounts;

    fn titled(n: usize) -> DiscoveryItem {
        DiscoveryItem { title: Some(format!("item {}", n)), ..Default::default() }
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = DiscoveryCardStore::new(INTELLIGENCE_CARD_CAPACITY);
        for n in 1..=25 {
            store.add_card(titled(n), CardKind::Traditional);
        }
        assert_eq!(store.len(), 24);
        let titles: Vec<_> = store.cards().map(|c| c.item.title.clone().unwrap()).collect();
        assert_eq!(titles.first().map(String::as_str), Some("item 25"));
        assert_eq!(titles.last().map(String::as_str), Some("item 2"));
        assert!(!titles.contains(&"item 1".to_string()));
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let mut store = DiscoveryCardStore::new(DISCOVERY_CARD_CAPACITY);
        store.add_card(DiscoveryItem::default(), CardKind::default());
        let view = &store.view()[0];
        assert_eq!(view.title, "Intelligence Item");
        assert_eq!(view.source, "Unknown Source");
        assert_eq!(view.trust, "N/A");
        assert_eq!(view.media_total, None);
        assert_eq!(view.style.badge, "WEB");
    }

    #[test]
    fn test_media_and_trust_rendering() {
        let item = DiscoveryItem {
            trust_score: Some(8.0),
            media_counts: Some(MediaCounts(vec![("images".into(), 2), ("videos".into(), 0), ("documents".into(), 3)])),
            ..Default::default()
        };
        let mut store = DiscoveryCardStore::new(DISCOVERY_CARD_CAPACITY);
        store.add_card(item, CardKind::Osint);
        let view = &store.view()[0];
        assert_eq!(view.trust, "8");
        assert_eq!(view.trust_class, TrustClass::High);
        assert_eq!(view.media_total.as_deref(), Some("5 media items"));
        assert_eq!(view.media_badges, vec!["2 images", "3 documents"]);
        assert_eq!(view.style, card_style(CardKind::Osint));
    }

    #[test]
    fn test_trust_classes() {
        assert_eq!(TrustClass::from_score(Some(7.0)), TrustClass::High);
        assert_eq!(TrustClass::from_score(Some(4.0)), TrustClass::Medium);
        assert_eq!(TrustClass::from_score(Some(3.9)), TrustClass::Low);
        assert_eq!(TrustClass::from_score(None), TrustClass::Low);
    }
}
