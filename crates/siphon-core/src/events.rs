//! Inbound customer-data-platform event types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::Timestamp;

/// A single inbound event, tagged by its `type` field on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CdpEvent {
    Identify(IdentifyEvent),
    Track(TrackEvent),
}

impl CdpEvent {
    /// Returns the string representation of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Identify(_) => "identify",
            Self::Track(_) => "track",
        }
    }

    /// Primary user identifier, if the event carries one
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Identify(e) => e.user_id.as_deref(),
            Self::Track(e) => e.user_id.as_deref(),
        }
    }
}

/// Identify event: binds traits to a user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyEvent {
    /// Primary user identifier; absent for anonymous users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Timestamp when the event occurred
    pub timestamp: Timestamp,
    /// Free-form user traits
    #[serde(default)]
    pub traits: Map<String, Value>,
}

/// Track event: a named action with free-form properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
    /// Primary user identifier; absent for anonymous users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Timestamp when the event occurred
    pub timestamp: Timestamp,
    /// Name of the tracked action
    pub event: String,
    /// Free-form event properties
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Collection context, may carry traits such as an email
    #[serde(default)]
    pub context: EventContext,
}

/// Context block attached to track events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default)]
    pub traits: Map<String, Value>,
}

/// Looks up a string-valued `email` entry in a trait mapping
pub fn email_trait(traits: &Map<String, Value>) -> Option<&str> {
    traits.get("email").and_then(Value::as_str)
}
