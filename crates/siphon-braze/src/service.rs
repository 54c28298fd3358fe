//! Event dispatchers: sanitize, resolve identity, merge alias, send.

use serde_json::Value;
use tracing::{info, warn};

use siphon_core::{email_trait, CdpEvent, DestinationSettings, IdentifyEvent, TrackEvent};

use crate::client::BrazeClient;
use crate::errors::BrazeError;
use crate::payloads::{
    build_merge_request, AttributesRequest, EventObject, TrackRequest, UserAlias, UserAttributes,
};
use crate::profiles::ProfileApiClient;
use crate::sanitize::sanitize_properties;

/// Responses returned by Braze for one forwarded event
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Anonymous path: the single attributes/events response
    Single(Value),
    /// Known-user path: alias merge response, then the attributes/events
    /// response, in send order
    Merged { merge: Value, update: Value },
}

/// Braze destination, built once per invocation from the host's settings
pub struct BrazeDestination {
    profiles: ProfileApiClient,
    braze: BrazeClient,
    app_id: String,
}

impl BrazeDestination {
    /// Create a destination from host-supplied settings
    pub fn new(settings: &DestinationSettings) -> Result<Self, BrazeError> {
        Ok(Self {
            profiles: ProfileApiClient::new(
                settings.profile_lookup_token.clone(),
                settings.space_id.clone(),
            )?,
            braze: BrazeClient::new(
                settings.rest_api_key.clone(),
                settings.custom_api_host.as_deref(),
            )?,
            app_id: settings.app_identifier.clone(),
        })
    }

    /// Create a destination with custom base URLs (for testing)
    #[cfg(test)]
    pub fn with_base_urls(
        settings: &DestinationSettings,
        profile_base_url: String,
        braze_base_url: String,
    ) -> Result<Self, BrazeError> {
        Ok(Self {
            profiles: ProfileApiClient::with_base_url(
                settings.profile_lookup_token.clone(),
                settings.space_id.clone(),
                profile_base_url,
            )?,
            braze: BrazeClient::with_base_url(settings.rest_api_key.clone(), braze_base_url)?,
            app_id: settings.app_identifier.clone(),
        })
    }

    /// Forward one event, dispatching on its kind
    pub async fn process(&self, event: &CdpEvent) -> Result<Delivery, BrazeError> {
        match event {
            CdpEvent::Identify(identify) => self.process_identify(identify).await,
            CdpEvent::Track(track) => self.process_track(track).await,
        }
    }

    /// Forward an identify event as Braze user attributes
    pub async fn process_identify(&self, event: &IdentifyEvent) -> Result<Delivery, BrazeError> {
        let sanitized = sanitize_properties(&event.traits, true);

        match event.user_id.as_deref() {
            Some(user_id) if !user_id.is_empty() => {
                let identity = self.profiles.resolve(user_id).await?;

                // Email reaches Braze only through the alias, never as a
                // plain attribute
                let mut traits = sanitized;
                traits.remove("email");

                let merge = self
                    .braze
                    .merge_aliases(&build_merge_request(
                        &identity.external_id,
                        &identity.last_seen_email,
                    ))
                    .await?;

                let attributes = AttributesRequest {
                    attributes: vec![UserAttributes {
                        external_id: Some(identity.external_id.clone()),
                        user_alias: None,
                        update_existing_only: None,
                        traits,
                    }],
                };
                let update = self.braze.track_attributes(&attributes).await?;

                info!(
                    "Forwarded identify for external id {}",
                    identity.external_id
                );
                Ok(Delivery::Merged { merge, update })
            }
            None => {
                let Some(email) = email_trait(&event.traits) else {
                    warn!("Anonymous identify event without an email trait");
                    return Err(BrazeError::Validation(
                        "no email available for anonymous user".to_string(),
                    ));
                };

                let attributes = AttributesRequest {
                    attributes: vec![UserAttributes {
                        external_id: None,
                        user_alias: Some(UserAlias::from_email(email)),
                        update_existing_only: Some(false),
                        traits: sanitized,
                    }],
                };
                let response = self.braze.track_attributes(&attributes).await?;

                info!("Forwarded anonymous identify for alias {}", email);
                Ok(Delivery::Single(response))
            }
            Some(_) => Err(BrazeError::InvalidPayload(
                "event carries an empty user id".to_string(),
            )),
        }
    }

    /// Forward a track event as a Braze custom event
    pub async fn process_track(&self, event: &TrackEvent) -> Result<Delivery, BrazeError> {
        let sanitized = sanitize_properties(&event.properties, false);

        match event.user_id.as_deref() {
            Some(user_id) if !user_id.is_empty() => {
                let identity = self.profiles.resolve(user_id).await?;

                let mut properties = sanitized;
                properties.remove("email");

                let merge = self
                    .braze
                    .merge_aliases(&build_merge_request(
                        &identity.external_id,
                        &identity.last_seen_email,
                    ))
                    .await?;

                let events = TrackRequest {
                    events: vec![EventObject {
                        external_id: Some(identity.external_id.clone()),
                        user_alias: None,
                        update_existing_only: None,
                        name: event.event.clone(),
                        app_id: self.app_id.clone(),
                        time: event.timestamp,
                        properties,
                    }],
                };
                let update = self.braze.track_events(&events).await?;

                info!(
                    "Forwarded track event {:?} for external id {}",
                    event.event, identity.external_id
                );
                Ok(Delivery::Merged { merge, update })
            }
            None => {
                let Some(email) = email_trait(&event.context.traits) else {
                    warn!("Anonymous track event without an email context trait");
                    return Err(BrazeError::Validation(
                        "no email available for anonymous user".to_string(),
                    ));
                };

                let events = TrackRequest {
                    events: vec![EventObject {
                        external_id: None,
                        user_alias: Some(UserAlias::from_email(email)),
                        update_existing_only: Some(false),
                        name: event.event.clone(),
                        app_id: self.app_id.clone(),
                        time: event.timestamp,
                        properties: sanitized,
                    }],
                };
                let response = self.braze.track_events(&events).await?;

                info!("Forwarded anonymous track event {:?}", event.event);
                Ok(Delivery::Single(response))
            }
            Some(_) => Err(BrazeError::InvalidPayload(
                "event carries an empty user id".to_string(),
            )),
        }
    }
}
