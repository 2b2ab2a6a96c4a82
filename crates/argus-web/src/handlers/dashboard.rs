//! Operations dashboard: live feed, cards, counters and the search form.

use axum::{extract::State, response::Html, Json};
use serde::Deserialize;

use argus_common::models::FeedCategory;

use crate::render::{self, DashboardParts};
use crate::state::{SharedState, ViewEvent};

pub async fn dashboard(State(state): State<SharedState>) -> Html<String> {
    let d = state.dashboard.lock().await;
    let body = render::dashboard_html(
        state.variant,
        DashboardParts {
            stats: render::stats_html(d.stats()),
            phase: render::phase_html(d.phase(), d.progress()),
            filters: render::feed_filter_html(d.feed().filter()),
            feed: render::feed_html(&d.feed().view()),
            cards: render::cards_html(&d.cards().view()),
        },
    );
    Html(render::page("Operations", body))
}

#[derive(Debug, Deserialize)]
pub struct FeedFilterRequest {
    pub filter: String,
}

/// POST /api/feed/filter - Switch the feed category filter
pub async fn set_feed_filter(
    State(state): State<SharedState>,
    Json(req): Json<FeedFilterRequest>,
) -> Html<String> {
    let filter = FeedCategory::parse(&req.filter);
    let html = {
        let mut d = state.dashboard.lock().await;
        d.feed_mut().set_filter(filter);
        render::feed_html(&d.feed().view())
    };
    state.publish(ViewEvent::Feed { html: html.clone() });
    Html(html)
}
