//! Search submission and event-channel subscription.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use argus_common::error::ValidationError;
use argus_common::models::{ActivityEvent, ActivityKind, SearchRequest};
use argus_common::transport::{Backend, EventChannel};

/// Characters of the search id shown in the launch confirmation.
const SHORT_ID_LEN: usize = 8;

/// Split a multi-line keyword field: one keyword per line, trimmed, blanks dropped.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

pub fn short_id(search_id: &str) -> String {
    search_id.chars().take(SHORT_ID_LEN).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum LaunchOutcome {
    Launched { search_id: String },
    /// Input rejected before any network call.
    Rejected(ValidationError),
    Failed(String),
}

/// Result of a launch plus the feed entry it produced, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub outcome: LaunchOutcome,
    pub activity: Option<ActivityEvent>,
}

pub struct SearchLauncher {
    backend: Arc<dyn Backend>,
    channel: Arc<dyn EventChannel>,
    current: Option<String>,
}

impl SearchLauncher {
    pub fn new(backend: Arc<dyn Backend>, channel: Arc<dyn EventChannel>) -> Self {
        Self { backend, channel, current: None }
    }

    /// The most recently launched search. A newer launch replaces it; the
    /// channel stays joined to earlier searches.
    pub fn current_search(&self) -> Option<&str> {
        self.current.as_deref()
    }

    #[instrument(skip(self, request), fields(keywords = request.keywords.len(), engines = request.engines.len()))]
    pub async fn launch(&mut self, request: SearchRequest) -> Launch {
        if let Err(e) = request.validate() {
            return Launch { outcome: LaunchOutcome::Rejected(e), activity: None };
        }

        let started = match self.backend.start_search(&request).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Error starting search");
                return Launch {
                    outcome: LaunchOutcome::Failed(e.to_string()),
                    activity: Some(ActivityEvent::new(
                        "❌ Failed to start intelligence operation",
                        ActivityKind::Error,
                    )),
                };
            }
        };

        let search_id = started.search_id;
        self.current = Some(search_id.clone());
        if let Err(e) = self.channel.join(&search_id).await {
            warn!(error = %e, search_id = %search_id, "failed to join search channel");
        }
        info!(search_id = %search_id, "search launched");

        Launch {
            activity: Some(ActivityEvent::new(
                format!("🚀 Launched intelligence operation [{}]", short_id(&search_id)),
                ActivityKind::Info,
            )),
            outcome: LaunchOutcome::Launched { search_id },
        }
    }
}
