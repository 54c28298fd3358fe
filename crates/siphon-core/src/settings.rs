use serde::{Deserialize, Serialize};

/// Destination settings supplied by the invoking host
/// All fields have defaults so partial configurations deserialize cleanly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DestinationSettings {
    /// Profile API token, sent as the Basic auth username
    pub profile_lookup_token: String,

    /// Profile space the user-id collection lives in
    pub space_id: String,

    /// Braze REST API key, sent as the Bearer token on outbound calls
    pub rest_api_key: String,

    /// Optional override of the default outbound host
    pub custom_api_host: Option<String>,

    /// App identifier attached to tracked events
    pub app_identifier: String,
}

impl Default for DestinationSettings {
    fn default() -> Self {
        Self {
            profile_lookup_token: String::new(),
            space_id: String::new(),
            rest_api_key: String::new(),
            custom_api_host: None,
            app_identifier: String::new(),
        }
    }
}

impl DestinationSettings {
    /// Create settings from JSON value, using defaults for missing fields
    pub fn from_json(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Convert settings to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}
