//! Segment Profile API client.
//!
//! Resolves the stable Braze external id and last-known email address for a
//! primary user identifier. Results are derived per invocation and never
//! cached.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{classify_status, BrazeError, StatusClass};

const PROFILE_API_BASE: &str = "https://profiles.segment.com";

/// Profile trait holding the stable Braze user key
const EXTERNAL_ID_TRAIT: &str = "braze_userid";
/// Profile trait holding the last-known email address
const EMAIL_TRAIT: &str = "email";

const SERVICE: &str = "profile API";

/// Client for the profile lookup service
pub struct ProfileApiClient {
    client: Client,
    token: String,
    space_id: String,
    base_url: String,
}

/// Identity resolved for a known user, owned by the current call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub external_id: String,
    pub last_seen_email: String,
}

#[derive(Debug, Deserialize)]
struct TraitsResponse {
    traits: Option<Map<String, Value>>,
}

impl ProfileApiClient {
    /// Create a new profile client for the given space
    pub fn new(token: impl Into<String>, space_id: impl Into<String>) -> Result<Self, BrazeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            space_id: space_id.into(),
            base_url: PROFILE_API_BASE.to_string(),
        })
    }

    /// Create a client with a custom base URL (for testing)
    #[cfg(test)]
    pub fn with_base_url(
        token: impl Into<String>,
        space_id: impl Into<String>,
        base_url: String,
    ) -> Result<Self, BrazeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            space_id: space_id.into(),
            base_url,
        })
    }

    /// Basic credential per the profile API contract: token as username,
    /// empty password
    fn authorization(&self) -> String {
        format!("Basic {}", BASE64.encode(format!("{}:", self.token)))
    }

    /// Look up the external id and last-known email for a user id
    pub async fn resolve(&self, user_id: &str) -> Result<ResolvedIdentity, BrazeError> {
        let url = format!(
            "{}/v1/spaces/{}/collections/users/profiles/user_id:{}/traits",
            self.base_url,
            self.space_id,
            urlencoding::encode(user_id)
        );

        debug!("Profile lookup for user {}", user_id);

        let response = self
            .client
            .get(&url)
            .query(&[("include", format!("{},{}", EXTERNAL_ID_TRAIT, EMAIL_TRAIT))])
            .header("Authorization", self.authorization())
            .send()
            .await?;

        let status = response.status();
        match classify_status(status, true) {
            StatusClass::Retryable => {
                return Err(BrazeError::Retryable {
                    service: SERVICE,
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            StatusClass::Terminal => {
                return Err(BrazeError::Terminal {
                    service: SERVICE,
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            StatusClass::Success => {}
        }

        let body: TraitsResponse = response.json().await?;

        let Some(traits) = body.traits else {
            return Err(BrazeError::Validation(
                "no external id or email available".to_string(),
            ));
        };

        let external_id = traits
            .get(EXTERNAL_ID_TRAIT)
            .and_then(trait_as_string)
            .ok_or_else(|| BrazeError::Validation("no external id available".to_string()))?;

        let last_seen_email = traits
            .get(EMAIL_TRAIT)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| BrazeError::Validation("no email available".to_string()))?;

        Ok(ResolvedIdentity {
            external_id,
            last_seen_email,
        })
    }
}

/// External ids arrive as JSON strings or numbers depending on how the
/// profile was seeded
fn trait_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(mock_server: &MockServer) -> ProfileApiClient {
        ProfileApiClient::with_base_url("prof_token", "spa_1", mock_server.uri()).unwrap()
    }

    fn traits_path(user_id: &str) -> String {
        format!(
            "/v1/spaces/spa_1/collections/users/profiles/user_id:{}/traits",
            user_id
        )
    }

    #[test]
    fn test_authorization_encoding() {
        let client = ProfileApiClient::new("prof_token", "spa_1").unwrap();
        // base64("prof_token:")
        assert_eq!(client.authorization(), "Basic cHJvZl90b2tlbjo=");
    }

    #[test]
    fn test_trait_as_string() {
        assert_eq!(
            trait_as_string(&serde_json::json!("abc")),
            Some("abc".to_string())
        );
        assert_eq!(
            trait_as_string(&serde_json::json!(123)),
            Some("123".to_string())
        );
        assert_eq!(trait_as_string(&serde_json::json!(["abc"])), None);
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(traits_path("u-123")))
            .and(query_param("include", "braze_userid,email"))
            .and(header("Authorization", "Basic cHJvZl90b2tlbjo="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "traits": {
                    "braze_userid": "braze-1",
                    "email": "e@x.com"
                }
            })))
            .mount(&mock_server)
            .await;

        let identity = client(&mock_server).resolve("u-123").await.unwrap();

        assert_eq!(identity.external_id, "braze-1");
        assert_eq!(identity.last_seen_email, "e@x.com");
    }

    #[tokio::test]
    async fn test_resolve_numeric_external_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(traits_path("u-123")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "traits": {"braze_userid": 42, "email": "e@x.com"}
            })))
            .mount(&mock_server)
            .await;

        let identity = client(&mock_server).resolve("u-123").await.unwrap();
        assert_eq!(identity.external_id, "42");
    }

    #[tokio::test]
    async fn test_resolve_not_found_is_retryable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(matches!(
            err,
            BrazeError::Retryable {
                service: "profile API",
                status: 404,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_resolve_rate_limit_is_retryable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(matches!(err, BrazeError::Retryable { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_resolve_server_error_is_retryable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(matches!(
            err,
            BrazeError::Retryable { status: 500, ref message, .. } if message == "upstream broke"
        ));
    }

    #[tokio::test]
    async fn test_resolve_bad_request_is_terminal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(matches!(err, BrazeError::Terminal { status: 400, .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_resolve_body_without_traits() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(
            matches!(err, BrazeError::Validation(ref m) if m == "no external id or email available")
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_external_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "traits": {"email": "e@x.com"}
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(matches!(err, BrazeError::Validation(ref m) if m == "no external id available"));
    }

    #[tokio::test]
    async fn test_resolve_missing_email() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "traits": {"braze_userid": "braze-1"}
            })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).resolve("u-123").await.unwrap_err();
        assert!(matches!(err, BrazeError::Validation(ref m) if m == "no email available"));
    }

    #[tokio::test]
    async fn test_resolve_encodes_user_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(traits_path("user%40example.com")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "traits": {"braze_userid": "braze-1", "email": "e@x.com"}
            })))
            .mount(&mock_server)
            .await;

        let identity = client(&mock_server)
            .resolve("user@example.com")
            .await
            .unwrap();
        assert_eq!(identity.external_id, "braze-1");
    }
}
