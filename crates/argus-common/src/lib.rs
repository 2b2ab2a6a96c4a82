//! argus-common: Shared types, errors, and transport traits used across all Argus crates.

pub mod error;
mod lenient;
pub mod events;
pub mod models;
pub mod transport;

// Re-export commonly used types
pub use error::{ArgusError, Result, ValidationError};
pub use events::PushEvent;
pub use transport::{Backend, EventChannel};
