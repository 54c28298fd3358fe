//! Braze REST API client for the two outbound calls.

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{classify_status, BrazeError, StatusClass};
use crate::payloads::{AliasMergeRequest, AttributesRequest, TrackRequest};

/// Default outbound host, replaced entirely when a custom host is configured
const DEFAULT_API_HOST: &str = "api.appboy.com";

const SERVICE: &str = "Braze";

/// Client for the Braze REST API
pub struct BrazeClient {
    client: Client,
    rest_api_key: String,
    base_url: String,
}

impl BrazeClient {
    /// Create a new Braze client against the default or configured host
    pub fn new(
        rest_api_key: impl Into<String>,
        custom_api_host: Option<&str>,
    ) -> Result<Self, BrazeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rest_api_key: rest_api_key.into(),
            base_url: base_endpoint(custom_api_host),
        })
    }

    /// Create a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(
        rest_api_key: impl Into<String>,
        base_url: String,
    ) -> Result<Self, BrazeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rest_api_key: rest_api_key.into(),
            base_url,
        })
    }

    /// Bind an email alias profile to the profile addressed by external id
    pub async fn merge_aliases(&self, request: &AliasMergeRequest) -> Result<Value, BrazeError> {
        self.post_json("/users/identify", request).await
    }

    /// Send user attributes
    pub async fn track_attributes(&self, request: &AttributesRequest) -> Result<Value, BrazeError> {
        self.post_json("/users/track", request).await
    }

    /// Send custom events
    pub async fn track_events(&self, request: &TrackRequest) -> Result<Value, BrazeError> {
        self.post_json("/users/track", request).await
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<Value, BrazeError> {
        let url = format!("{}{}", self.base_url, path);

        debug!("Braze API request: POST {}", path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.rest_api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        match classify_status(status, false) {
            StatusClass::Retryable => Err(BrazeError::Retryable {
                service: SERVICE,
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            StatusClass::Terminal => Err(BrazeError::Terminal {
                service: SERVICE,
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            StatusClass::Success => {
                let text = response.text().await?;
                if text.is_empty() {
                    // A successful merge against a missing alias returns no
                    // useful content; surface an empty object
                    return Ok(Value::Object(Map::new()));
                }
                Ok(serde_json::from_str(&text)?)
            }
        }
    }
}

/// Resolve the base endpoint: a configured host replaces scheme+host entirely
fn base_endpoint(custom_api_host: Option<&str>) -> String {
    match custom_api_host {
        Some(host) if host.contains("://") => host.trim_end_matches('/').to_string(),
        Some(host) => format!("https://{}", host.trim_end_matches('/')),
        None => format!("https://{}", DEFAULT_API_HOST),
    }
}
