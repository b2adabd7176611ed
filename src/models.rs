// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the REST API. All types
//! derive `Serialize`, `Deserialize`, and `ToSchema` for automatic JSON
//! handling and OpenAPI documentation.
//!
//! ## Identity Type
//!
//! The [`Identity`] newtype wraps the scored subject's identifier: the
//! primary wallet address for crypto-native users, or an opaque profile id
//! for developer/financial-only users. Identities are used as storage keys,
//! so the character set is restricted.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attestation::{Attestation, VerificationOutcome};
use crate::scoring::{AssembledScore, DeveloperSignal, FinancialSignal, OnChainSignal};

// =============================================================================
// Identity Type
// =============================================================================

/// Identifier of the scored subject.
///
/// Accepts wallet-style addresses (`0x`-prefixed hex) and opaque profile
/// ids. Restricted to 1–128 characters of `[A-Za-z0-9._-]` because the
/// identity doubles as a storage key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(pub String);

impl Identity {
    /// Whether this identity is well-formed.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= 128
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Identity(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity(value.to_string())
    }
}

impl From<Identity> for String {
    fn from(value: Identity) -> Self {
        value.0
    }
}

// =============================================================================
// Score Models
// =============================================================================

/// Request to compute (or re-serve the cached) score for an identity.
///
/// Each signal is optional: an absent source contributes nothing and never
/// penalizes. Upstream fetch failures are represented by omitting the
/// signal, not by zero-filled records.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComputeScoreRequest {
    /// The identity being scored.
    pub identity: Identity,
    /// On-chain activity snapshot, if the user has a connected wallet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_chain: Option<OnChainSignal>,
    /// Financial profile snapshot, if the user linked a bank account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial: Option<FinancialSignal>,
    /// Developer activity snapshot, if the user linked a code-hosting account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<DeveloperSignal>,
    /// Verified wallets beyond the primary.
    #[serde(default)]
    pub secondary_wallet_count: u32,
}

/// A computed score with its attestation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreResponse {
    /// The scored identity.
    pub identity: Identity,
    /// The assembled, tiered score.
    pub score: AssembledScore,
    /// Signed credential for this score.
    pub attestation: Attestation,
}

// =============================================================================
// Attestation Models
// =============================================================================

/// Stored attestation data submitted for re-verification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyAttestationRequest {
    #[serde(flatten)]
    pub attestation: Attestation,
}

/// Verification result. `expired` is independent of `valid`: a signature
/// can check out yet be past its 90-day window.
pub type VerifyAttestationResponse = VerificationOutcome;

// =============================================================================
// Webhook Subscription Models
// =============================================================================

/// Request to register a webhook subscription.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    /// The lender registering the subscription.
    pub subscriber_id: String,
    /// The identity whose score changes should be delivered.
    pub target_identity: Identity,
    /// Delivery endpoint. Must be HTTPS.
    pub url: String,
    /// Secret used to sign deliveries to this subscription.
    pub secret: String,
    /// Events to deliver (e.g. `score.updated`).
    pub subscribed_events: Vec<String>,
}

/// A subscription as returned to API clients (never includes the secret).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    /// Unique subscription identifier.
    pub id: String,
    /// The lender that owns this subscription.
    pub subscriber_id: String,
    /// The identity whose score changes are delivered.
    pub target_identity: String,
    /// Delivery endpoint.
    pub url: String,
    /// Events this subscription receives.
    pub subscribed_events: Vec<String>,
    /// False once the circuit breaker has tripped.
    pub active: bool,
    /// Consecutive delivery failures since the last success.
    pub failure_count: u32,
    /// When the subscription was registered.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<crate::webhooks::WebhookSubscription> for SubscriptionResponse {
    fn from(sub: crate::webhooks::WebhookSubscription) -> Self {
        Self {
            id: sub.id,
            subscriber_id: sub.subscriber_id,
            target_identity: sub.target_identity,
            url: sub.url,
            subscribed_events: sub.subscribed_events.into_iter().collect(),
            active: sub.active,
            failure_count: sub.failure_count,
            created_at: sub.created_at,
        }
    }
}
