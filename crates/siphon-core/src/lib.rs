//! Shared types for the Siphon event forwarder

pub mod events;
pub mod settings;
pub mod types;

// Re-export commonly used types
pub use events::*;
pub use settings::DestinationSettings;
pub use types::Timestamp;

// Re-export external dependencies
pub use chrono;
pub use serde;
pub use serde_json;
