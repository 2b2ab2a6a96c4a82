//! Media gallery: filtered categories, detail view and JSON export.

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};

use argus_common::models::MediaKind;
use argus_dashboard::media::{MediaCatalog, LOAD_ERROR_MESSAGE};

use crate::error::ApiError;
use crate::render::{self, MediaSection};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct MediaFilterQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub engine: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaDetailQuery {
    pub kind: MediaKind,
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub struct FilteredMedia {
    /// Rendered grid per category.
    pub categories: BTreeMap<&'static str, String>,
    /// Categories whose contents changed with this filter.
    pub changed: Vec<MediaKind>,
}

fn category_grids(catalog: &MediaCatalog) -> BTreeMap<&'static str, String> {
    MediaKind::ALL
        .into_iter()
        .map(|k| (k.as_str(), render::category_html(k, &catalog.category_view(k))))
        .collect()
}

/// GET /media - Gallery page; reloads the snapshot on every visit
pub async fn media_page(State(state): State<SharedState>) -> Html<String> {
    state.reload_media().await;
    let catalog = state.media.lock().await;
    let filter = catalog.filter();

    let sections = MediaKind::ALL
        .into_iter()
        .map(|k| MediaSection {
            kind: k,
            count: catalog.filtered(k).len(),
            grid: render::category_html(k, &catalog.category_view(k)),
        })
        .collect();

    let body = render::media_page_html(
        catalog.stats(),
        &filter.search,
        render::options_html("All Domains", catalog.domains(), &filter.domain),
        render::options_html("All Sources", catalog.engines(), &filter.engine),
        sections,
    );
    Html(render::page("Media Gallery", body))
}

/// GET /api/media/filter - Re-filter every category
pub async fn filter_media(
    State(state): State<SharedState>,
    Query(q): Query<MediaFilterQuery>,
) -> Json<FilteredMedia> {
    let mut catalog = state.media.lock().await;
    let changed = catalog.apply_filters(&q.search, &q.domain, &q.engine);
    Json(FilteredMedia { categories: category_grids(&catalog), changed })
}

/// GET /api/media/detail - One item's detail panel
pub async fn media_detail(
    State(state): State<SharedState>,
    Query(q): Query<MediaDetailQuery>,
) -> Result<Html<String>, ApiError> {
    let catalog = state.media.lock().await;
    catalog
        .detail(q.kind, q.index)
        .map(|d| Html(render::media_detail_html(&d)))
        .ok_or_else(|| ApiError::NotFound(format!("{} {}", q.kind.singular(), q.index)))
}

/// GET /api/media/export - Download the current snapshot as a JSON report
pub async fn export_media(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .media
        .lock()
        .await
        .export_report()
        .ok_or_else(|| ApiError::Unavailable(LOAD_ERROR_MESSAGE.to_string()))?;
    let body = serde_json::to_string_pretty(&report).map_err(argus_common::ArgusError::from)?;
    let disposition = format!("attachment; filename=\"{}\"", report.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
