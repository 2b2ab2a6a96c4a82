//! Aggregate counters polled from the backend.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use argus_common::error::Result;
use argus_common::models::{BasicStats, EnhancedStats};
use argus_common::transport::Backend;

pub const BASIC_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const ENHANCED_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    Basic,
    Enhanced,
}

impl StatsSource {
    pub fn interval(&self) -> Duration {
        match self {
            Self::Basic => BASIC_POLL_INTERVAL,
            Self::Enhanced => ENHANCED_POLL_INTERVAL,
        }
    }
}

/// A successful stats response, before it is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsUpdate {
    Basic(BasicStats),
    Enhanced(EnhancedStats),
}

/// Counters as displayed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum StatCounters {
    Basic {
        total_documents: u64,
        total_images: u64,
        total_videos: u64,
        domains_scraped: u64,
    },
    Enhanced {
        total_documents: u64,
        osint_intelligence: u64,
        subdomains_found: u64,
        total_media: u64,
    },
}

/// Traditional vs OSINT share of all collected items, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shares {
    pub traditional_pct: f64,
    pub osint_pct: f64,
}

/// `None` when there is nothing to divide by.
pub fn compute_shares(documents: u64, osint: u64) -> Option<Shares> {
    if documents.saturating_add(osint) == 0 {
        return None;
    }
    let total = documents as f64 + osint as f64;
    Some(Shares {
        traditional_pct: documents as f64 / total * 100.0,
        osint_pct: osint as f64 / total * 100.0,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsPanel {
    counters: Option<StatCounters>,
    shares: Option<Shares>,
}

impl StatsPanel {
    pub fn counters(&self) -> Option<&StatCounters> {
        self.counters.as_ref()
    }

    pub fn shares(&self) -> Option<Shares> {
        self.shares
    }

    /// Replace every counter at once. Shares keep their previous value when
    /// the new totals are both zero.
    pub fn apply(&mut self, update: StatsUpdate) {
        match update {
            StatsUpdate::Basic(s) => {
                self.counters = Some(StatCounters::Basic {
                    total_documents: s.total_documents,
                    total_images: s.total_images,
                    total_videos: s.total_videos,
                    domains_scraped: s.domains_scraped.len() as u64,
                });
            }
            StatsUpdate::Enhanced(s) => {
                self.counters = Some(StatCounters::Enhanced {
                    total_documents: s.total_documents,
                    osint_intelligence: s.osint_intelligence,
                    subdomains_found: s.subdomains_discovered,
                    total_media: s
                        .total_images
                        .saturating_add(s.total_videos)
                        .saturating_add(s.total_documents_media),
                });
                if let Some(shares) = compute_shares(s.total_documents, s.osint_intelligence) {
                    self.shares = Some(shares);
                }
            }
        }
    }

    /// Apply a fetch result; failures are logged and leave the panel untouched.
    /// Returns whether anything changed.
    pub fn apply_result(&mut self, result: Result<StatsUpdate>) -> bool {
        match result {
            Ok(update) => {
                self.apply(update);
                true
            }
            Err(e) => {
                warn!(error = %e, "Error updating stats");
                false
            }
        }
    }
}

/// Reads one of the two stats endpoints.
#[derive(Clone)]
pub struct StatsPoller {
    backend: Arc<dyn Backend>,
    source: StatsSource,
}

impl StatsPoller {
    pub fn new(backend: Arc<dyn Backend>, source: StatsSource) -> Self {
        Self { backend, source }
    }

    pub fn source(&self) -> StatsSource {
        self.source
    }

    pub async fn fetch(&self) -> Result<StatsUpdate> {
        let update = match self.source {
            StatsSource::Basic => StatsUpdate::Basic(self.backend.stats().await?),
            StatsSource::Enhanced => StatsUpdate::Enhanced(self.backend.enhanced_stats().await?),
        };
        debug!(source = ?self.source, "stats fetched");
        Ok(update)
    }

    /// Fetch and apply in one go. Never fails; see [`StatsPanel::apply_result`].
    pub async fn refresh(&self, panel: &mut StatsPanel) -> bool {
        panel.apply_result(self.fetch().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_common::error::ArgusError;

    #[test]
    fn test_shares_guard_division_by_zero() {
        assert_eq!(compute_shares(0, 0), None);
        let s = compute_shares(3, 1).unwrap();
        assert_eq!(s.traditional_pct, 75.0);
        assert_eq!(s.osint_pct, 25.0);
    }

    #[test]
    fn test_enhanced_media_total_and_shares() {
        let mut panel = StatsPanel::default();
        panel.apply(StatsUpdate::Enhanced(EnhancedStats {
            total_documents: 10,
            osint_intelligence: 10,
            subdomains_discovered: 4,
            total_images: 5,
            total_videos: 2,
            total_documents_media: 1,
        }));
        assert_eq!(
            panel.counters(),
            Some(&StatCounters::Enhanced {
                total_documents: 10,
                osint_intelligence: 10,
                subdomains_found: 4,
                total_media: 8,
            })
        );
        assert_eq!(panel.shares().unwrap().osint_pct, 50.0);

        // Zero totals keep the previous shares.
        panel.apply(StatsUpdate::Enhanced(EnhancedStats::default()));
        assert_eq!(panel.shares().unwrap().osint_pct, 50.0);
    }

    #[test]
    fn test_huge_counters_saturate_instead_of_overflowing() {
        let mut panel = StatsPanel::default();
        panel.apply(StatsUpdate::Enhanced(EnhancedStats {
            total_documents: u64::MAX,
            osint_intelligence: u64::MAX,
            total_images: u64::MAX,
            total_videos: 1,
            total_documents_media: u64::MAX,
            ..Default::default()
        }));
        assert!(matches!(
            panel.counters(),
            Some(StatCounters::Enhanced { total_media: u64::MAX, .. })
        ));
        let shares = panel.shares().unwrap();
        assert_eq!(shares.traditional_pct, 50.0);
        assert_eq!(shares.osint_pct, 50.0);
    }

    #[test]
    fn test_failed_refresh_preserves_counters() {
        let mut panel = StatsPanel::default();
        panel.apply(StatsUpdate::Basic(BasicStats {
            total_documents: 4,
            domains_scraped: vec!["a.com".into(), "b.com".into()],
            ..Default::default()
        }));
        let before = panel.clone();

        let changed = panel.apply_result(Err(ArgusError::Protocol("down".into())));
        assert!(!changed);
        assert_eq!(panel, before);
        assert!(matches!(
            panel.counters(),
            Some(StatCounters::Basic { domains_scraped: 2, .. })
        ));
    }
}
