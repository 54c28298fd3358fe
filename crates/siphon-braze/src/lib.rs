//! # siphon-braze
//!
//! Braze destination for the Siphon event forwarder.
//!
//! This crate provides functionality for:
//! - Sanitizing trait/property payloads to Braze's type restrictions
//! - Resolving a stable Braze external id through the Segment Profile API
//! - Merging anonymous email-alias profiles into known profiles
//! - Forwarding `identify` and `track` events as attributes and custom events
//! - Classifying upstream HTTP failures into retryable vs. terminal
//!
//! # Usage
//!
//! The main entry point is `BrazeDestination`, built from host-supplied
//! settings and invoked once per event:
//!
//! ```ignore
//! use siphon_braze::BrazeDestination;
//! use siphon_core::{CdpEvent, DestinationSettings};
//!
//! let destination = BrazeDestination::new(&settings)?;
//! let delivery = destination.process(&event).await?;
//! ```
//!
//! Processing is stateless per invocation: retry policy belongs to the host,
//! guided by `BrazeError::is_retryable`.

pub mod client;
pub mod errors;
pub mod payloads;
pub mod profiles;
pub mod sanitize;
pub mod service;

// Re-export main types
pub use client::BrazeClient;
pub use errors::{classify_status, BrazeError, StatusClass};
pub use payloads::{
    build_merge_request, AliasMergeRequest, AliasToIdentify, AttributesRequest, EventObject,
    TrackRequest, UserAlias, UserAttributes, EMAIL_ALIAS_LABEL,
};
pub use profiles::{ProfileApiClient, ResolvedIdentity};
pub use sanitize::sanitize_properties;
pub use service::{BrazeDestination, Delivery};
