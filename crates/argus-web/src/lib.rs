//! argus-web: Local web shell for the Argus intelligence dashboard.
//! Provides:
//!   - Operations dashboard with live activity feed and discovery cards
//!   - Media gallery with filters, detail view and JSON export
//!   - Force-directed relationship graph
//!   - SSE stream of rendered fragment updates

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod router;
pub mod sse;
pub mod state;
pub mod tasks;
