//! HTTP handlers for all web routes.

pub mod dashboard;
pub mod graph;
pub mod media;
pub mod search;
