// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Webhook Notification
//!
//! Lenders subscribe to score-change events for a target identity. When a
//! score changes, every matching active subscription receives a signed POST
//! with a bounded timeout, and a per-subscription circuit breaker disables
//! endpoints that keep failing.
//!
//! ## Modules
//!
//! - `signature` - `sha256=<hex>` HMAC signing of delivery bodies
//! - `notifier` - concurrent dispatch, delivery logging, circuit breaker

pub mod notifier;
pub mod signature;

pub use notifier::{DeliveryOutcome, ScoreSummary, WebhookNotifier};

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

/// Event emitted after a score computation is persisted.
pub const SCORE_UPDATED_EVENT: &str = "score.updated";

/// Event emitted when a fresh attestation is issued.
pub const ATTESTATION_ISSUED_EVENT: &str = "attestation.issued";

/// Events a subscription may subscribe to.
pub const KNOWN_EVENTS: &[&str] = &[SCORE_UPDATED_EVENT, ATTESTATION_ISSUED_EVENT];

/// Signature header attached to every delivery.
pub const SIGNATURE_HEADER: &str = "X-Kite-Signature";

/// Consecutive delivery failures before a subscription is disabled.
pub const FAILURE_THRESHOLD: u32 = 5;

/// A lender's webhook subscription for one target identity.
///
/// `failure_count` and `active` are mutated only by the notifier's circuit
/// breaker; re-enabling a disabled subscription is an administrative action
/// (re-register), not something the notifier does on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WebhookSubscription {
    /// Unique subscription identifier (UUID).
    pub id: String,
    /// The lender that owns this subscription.
    pub subscriber_id: String,
    /// The identity whose score changes are delivered.
    pub target_identity: String,
    /// Delivery endpoint. Must be HTTPS.
    pub url: String,
    /// Per-subscription signing secret. Never returned via the API.
    pub secret: String,
    /// Events this subscription receives.
    pub subscribed_events: BTreeSet<String>,
    /// False once the circuit breaker has tripped.
    pub active: bool,
    /// Consecutive delivery failures since the last success.
    pub failure_count: u32,
    /// When the subscription was registered.
    pub created_at: DateTime<Utc>,
}

/// Validation errors for subscription registration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("invalid webhook url: {0}")]
    InvalidUrl(String),

    #[error("webhook url must use https")]
    NotHttps,

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("at least one subscribed event is required")]
    NoEvents,
}

impl WebhookSubscription {
    /// Build a validated subscription. Enforces the HTTPS requirement and
    /// the known-event set.
    pub fn new(
        subscriber_id: impl Into<String>,
        target_identity: impl Into<String>,
        url: impl Into<String>,
        secret: impl Into<String>,
        events: impl IntoIterator<Item = String>,
    ) -> Result<Self, SubscriptionError> {
        let url = url.into();
        let parsed = Url::parse(&url).map_err(|e| SubscriptionError::InvalidUrl(e.to_string()))?;
        if parsed.scheme() != "https" {
            return Err(SubscriptionError::NotHttps);
        }

        let mut subscribed_events = BTreeSet::new();
        for event in events {
            if !KNOWN_EVENTS.contains(&event.as_str()) {
                return Err(SubscriptionError::UnknownEvent(event));
            }
            subscribed_events.insert(event);
        }
        if subscribed_events.is_empty() {
            return Err(SubscriptionError::NoEvents);
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            subscriber_id: subscriber_id.into(),
            target_identity: target_identity.into(),
            url,
            secret: secret.into(),
            subscribed_events,
            active: true,
            failure_count: 0,
            created_at: Utc::now(),
        })
    }

    /// Whether this subscription wants the given event.
    pub fn wants(&self, event: &str) -> bool {
        self.subscribed_events.contains(event)
    }
}
