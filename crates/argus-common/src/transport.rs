//! Seams between dashboard state and the outside world.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    BasicStats, EnhancedStats, GraphSnapshot, MediaSnapshot, MediaStats, SearchRequest,
    SearchStarted,
};

/// REST surface of the scraping backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// POST a new search; the backend replies with the id of its job.
    async fn start_search(&self, request: &SearchRequest) -> Result<SearchStarted>;

    async fn stats(&self) -> Result<BasicStats>;

    async fn enhanced_stats(&self) -> Result<EnhancedStats>;

    async fn media_data(&self) -> Result<MediaSnapshot>;

    async fn media_stats(&self) -> Result<MediaStats>;

    async fn graph_data(&self) -> Result<GraphSnapshot>;
}

/// Outbound half of the push-event channel.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Subscribe to the events of one search. Joining never leaves earlier rooms.
    async fn join(&self, search_id: &str) -> Result<()>;
}
