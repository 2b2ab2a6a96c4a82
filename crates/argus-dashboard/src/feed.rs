//! Bounded, newest-first activity feed with category filtering.

use std::collections::VecDeque;

use serde::Serialize;

use argus_common::models::{ActivityEvent, ActivityKind, FeedCategory};

/// Capacity of the enhanced (OSINT) operations feed.
pub const ENHANCED_FEED_CAPACITY: usize = 100;
/// Capacity of the basic scraping feed.
pub const BASIC_FEED_CAPACITY: usize = 50;

pub const EMPTY_FEED_MESSAGE: &str = "Waiting for activity...";

/// Icon and background tint per entry kind.
pub fn kind_style(kind: ActivityKind) -> (&'static str, &'static str) {
    match kind {
        ActivityKind::Osint => ("fas fa-user-secret", "rgba(220, 53, 69, 0.1)"),
        ActivityKind::Social => ("fas fa-share-alt", "rgba(255, 193, 7, 0.1)"),
        ActivityKind::Success => ("fas fa-check-circle", "rgba(40, 167, 69, 0.1)"),
        ActivityKind::Info => ("fas fa-info-circle", "rgba(23, 162, 184, 0.1)"),
        ActivityKind::Error => ("fas fa-circle", "rgba(255, 255, 255, 0.05)"),
    }
}

fn is_visible(filter: FeedCategory, category: FeedCategory) -> bool {
    filter == FeedCategory::All || filter == category
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntryView {
    pub message: String,
    pub kind: ActivityKind,
    pub category: FeedCategory,
    pub icon: &'static str,
    pub background: &'static str,
    pub time: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedView {
    pub filter: FeedCategory,
    /// Shown only until the first entry arrives.
    pub placeholder: Option<&'static str>,
    pub entries: Vec<FeedEntryView>,
}

#[derive(Debug, Clone)]
pub struct EventFeed {
    entries: VecDeque<ActivityEvent>,
    capacity: usize,
    filter: FeedCategory,
}

impl EventFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            filter: FeedCategory::All,
        }
    }

    /// Prepend an entry and evict from the tail until within capacity.
    pub fn record(&mut self, event: ActivityEvent) {
        self.entries.push_front(event);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Change the active filter. Entries are never removed by filtering.
    pub fn set_filter(&mut self, filter: FeedCategory) {
        self.filter = filter;
    }

    pub fn filter(&self) -> FeedCategory {
        self.filter
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first.
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.entries.iter()
    }

    pub fn visible(&self) -> impl Iterator<Item = &ActivityEvent> {
        let filter = self.filter;
        self.entries.iter().filter(move |e| is_visible(filter, e.category))
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            filter: self.filter,
            placeholder: self.entries.is_empty().then_some(EMPTY_FEED_MESSAGE),
            entries: self
                .entries
                .iter()
                .map(|e| {
                    let (icon, background) = kind_style(e.kind);
                    FeedEntryView {
                        message: e.message.clone(),
                        kind: e.kind,
                        category: e.category,
                        icon,
                        background,
                        time: e.timestamp.format("%H:%M:%S").to_string(),
                        visible: is_visible(self.filter, e.category),
                    }
                })
                .collect(),
        }
    }
}
