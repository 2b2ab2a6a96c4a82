//! Search launch endpoint.

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use argus_common::models::{Engine, SearchRequest};
use argus_dashboard::launcher::{parse_keywords, short_id, LaunchOutcome};

use crate::error::ApiError;
use crate::render;
use crate::state::{SharedState, ViewEvent};

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    /// Raw multi-line textarea contents.
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub engines: Vec<String>,
    #[serde(default)]
    pub include_osint: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchLaunched {
    pub search_id: String,
    pub short_id: String,
    pub html: String,
}

impl SearchForm {
    pub fn into_request(self) -> Result<SearchRequest, ApiError> {
        let engines = self
            .engines
            .iter()
            .map(|e| Engine::parse(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SearchRequest::new(parse_keywords(&self.keywords), engines).with_osint(self.include_osint))
    }
}

/// POST /api/search - Validate and launch a search
pub async fn launch_search(
    State(state): State<SharedState>,
    Json(form): Json<SearchForm>,
) -> Result<impl IntoResponse, ApiError> {
    let request = form.into_request()?;
    let launch = state.launcher.lock().await.launch(request).await;

    if let Some(entry) = launch.activity {
        let mut d = state.dashboard.lock().await;
        d.record(entry);
        state.publish(ViewEvent::Feed { html: render::feed_html(&d.feed().view()) });
    }

    match launch.outcome {
        LaunchOutcome::Launched { search_id } => {
            let short = short_id(&search_id);
            Ok(Json(SearchLaunched {
                html: render::notice_html("success", &format!("Operation {} launched", short)),
                short_id: short,
                search_id,
            }))
        }
        LaunchOutcome::Rejected(e) => Err(e.into()),
        LaunchOutcome::Failed(_) => Err(ApiError::Unavailable("Failed to start intelligence operation".into())),
    }
}
