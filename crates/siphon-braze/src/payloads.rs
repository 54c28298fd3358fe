//! Outbound Braze request bodies.

use serde::Serialize;
use serde_json::{Map, Value};
use siphon_core::Timestamp;

/// Alias label under which email-keyed profiles are filed
pub const EMAIL_ALIAS_LABEL: &str = "email_address";

/// Provisional user reference used before a stable external id exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAlias {
    pub alias_name: String,
    pub alias_label: String,
}

impl UserAlias {
    /// Email-based alias, the only alias kind this destination emits
    pub fn from_email(address: impl Into<String>) -> Self {
        Self {
            alias_name: address.into(),
            alias_label: EMAIL_ALIAS_LABEL.to_string(),
        }
    }
}

/// One alias-to-profile binding in a merge request
#[derive(Debug, Clone, Serialize)]
pub struct AliasToIdentify {
    pub external_id: String,
    pub user_alias: UserAlias,
}

/// Body of `POST /users/identify`
#[derive(Debug, Clone, Serialize)]
pub struct AliasMergeRequest {
    pub aliases_to_identify: Vec<AliasToIdentify>,
}

/// Build the request binding an email alias profile to an external id
///
/// Merge semantics are owned by Braze: merging against a non-existent alias
/// succeeds with no effect, and merging against a non-existent external id
/// creates the profile and binds the alias to it.
pub fn build_merge_request(external_id: &str, last_seen_email: &str) -> AliasMergeRequest {
    AliasMergeRequest {
        aliases_to_identify: vec![AliasToIdentify {
            external_id: external_id.to_string(),
            user_alias: UserAlias::from_email(last_seen_email),
        }],
    }
}

/// One attribute object in a `POST /users/track` body
///
/// Addressed either by external id (known users) or by alias plus
/// `_update_existing_only: false` (anonymous users, so Braze creates the
/// alias-only profile instead of rejecting it). Sanitized traits are
/// flattened alongside the identity fields.
#[derive(Debug, Clone, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_alias: Option<UserAlias>,
    #[serde(
        rename = "_update_existing_only",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_existing_only: Option<bool>,
    #[serde(flatten)]
    pub traits: Map<String, Value>,
}

/// Attributes body of `POST /users/track`
#[derive(Debug, Clone, Serialize)]
pub struct AttributesRequest {
    pub attributes: Vec<UserAttributes>,
}

/// One custom event in a `POST /users/track` body
#[derive(Debug, Clone, Serialize)]
pub struct EventObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_alias: Option<UserAlias>,
    #[serde(
        rename = "_update_existing_only",
        skip_serializing_if = "Option::is_none"
    )]
    pub update_existing_only: Option<bool>,
    pub name: String,
    pub app_id: String,
    pub time: Timestamp,
    pub properties: Map<String, Value>,
}

/// Events body of `POST /users/track`
#[derive(Debug, Clone, Serialize)]
pub struct TrackRequest {
    pub events: Vec<EventObject>,
}
