//! argus-dashboard: State objects for the live intelligence dashboard, the
//! media catalog and the relationship graph, plus the HTTP and Socket.IO
//! transports that feed them.
//!
//! Components never render directly: each exposes a `view()` that the web
//! shell turns into markup. Network fetches are separated from state updates
//! (`fetch` / `apply_*`) so callers can await without holding a lock.

pub mod cards;
pub mod dashboard;
pub mod feed;
pub mod graph;
pub mod http;
pub mod launcher;
pub mod layout;
pub mod media;
pub mod socketio;
pub mod stats;

pub use cards::{CardKind, DiscoveryCardStore};
pub use dashboard::{Dashboard, Effects, Variant};
pub use feed::EventFeed;
pub use graph::RelationshipGraph;
pub use http::HttpBackend;
pub use launcher::{Launch, LaunchOutcome, SearchLauncher};
pub use media::MediaCatalog;
pub use socketio::SocketIoChannel;
pub use stats::{StatsPanel, StatsPoller};
