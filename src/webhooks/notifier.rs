// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webhook dispatch with per-subscription circuit breaking.
//!
//! One score-change event fans out to N independent concurrent deliveries,
//! each with its own 10-second timeout. A failing sibling never blocks or
//! cancels the others; `dispatch` returns once every delivery has settled.
//! Callers on the request path spawn `dispatch` detached so a slow
//! subscriber cannot delay the response that triggered the score change.
//!
//! Delivery outcomes are appended to the delivery log regardless of
//! success. Real deliveries also drive the circuit breaker: five
//! consecutive failures disable the subscription, any success resets the
//! count. Test deliveries are logged but never touch breaker state, so
//! operators can probe an endpoint without risking disabling it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::storage::{
    DeliveryLogRepository, DeliveryRecord, JsonStore, StorageResult, SubscriptionRepository,
};

use super::signature::sign_payload;
use super::{WebhookSubscription, FAILURE_THRESHOLD, SIGNATURE_HEADER};

/// Per-delivery request timeout.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Score fields included in a delivery payload.
#[derive(Debug, Clone)]
pub struct ScoreSummary {
    pub score: u32,
    pub tier: String,
    pub issued_at: DateTime<Utc>,
}

/// Terminal outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 2xx response.
    Delivered(u16),
    /// Completed request with a non-2xx status.
    HttpError(u16),
    /// The 10-second timeout fired.
    Timeout,
    /// Transport-level failure (DNS, refused connection, TLS).
    Network(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }

    fn http_status(&self) -> Option<u16> {
        match self {
            DeliveryOutcome::Delivered(status) | DeliveryOutcome::HttpError(status) => {
                Some(*status)
            }
            _ => None,
        }
    }

    fn error_message(&self) -> Option<String> {
        match self {
            DeliveryOutcome::Timeout => Some("delivery timed out".to_string()),
            DeliveryOutcome::Network(message) => Some(message.clone()),
            DeliveryOutcome::HttpError(status) => Some(format!("http status {status}")),
            DeliveryOutcome::Delivered(_) => None,
        }
    }
}

/// Dispatches score-change events to subscribed lender webhooks.
///
/// Cheap to clone; clones share the HTTP client, storage handle, and the
/// per-subscription breaker locks.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    storage: Arc<JsonStore>,
    breaker_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl WebhookNotifier {
    /// Create a notifier over the given storage.
    pub fn new(storage: Arc<JsonStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            storage,
            breaker_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Deliver `event` for `target_identity` to every matching active
    /// subscription. Zero matches is a no-op. Returns after all deliveries
    /// settle; failures are logged and counted, never raised.
    pub async fn dispatch(&self, target_identity: &str, event: &str, summary: &ScoreSummary) {
        let subscriptions =
            match SubscriptionRepository::new(&self.storage).list_active_for(target_identity, event)
            {
                Ok(subscriptions) => subscriptions,
                Err(e) => {
                    warn!(
                        target_identity = %target_identity,
                        event = %event,
                        error = %e,
                        "failed to list webhook subscriptions; skipping dispatch"
                    );
                    return;
                }
            };

        if subscriptions.is_empty() {
            debug!(
                target_identity = %target_identity,
                event = %event,
                "no active webhook subscriptions; nothing to deliver"
            );
            return;
        }

        let payload = json!({
            "event": event,
            "wallet_address": target_identity,
            "score": summary.score,
            "tier": summary.tier,
            "issued_at": summary.issued_at.to_rfc3339(),
            "timestamp": Utc::now().to_rfc3339(),
        });

        let mut handles = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let notifier = self.clone();
            let event = event.to_string();
            let payload = payload.clone();
            handles.push(tokio::spawn(async move {
                notifier.deliver_one(&subscription, &event, payload, false).await;
            }));
        }

        // Settle all: a panicked or failed delivery never cancels siblings.
        for handle in handles {
            if handle.await.is_err() {
                warn!("webhook delivery task panicked");
            }
        }
    }

    /// Send a synthetic probe delivery to one subscription.
    ///
    /// The attempt is logged like any other but never affects
    /// `failure_count` or `active`, even on failure.
    pub async fn dispatch_test(&self, subscription_id: &str) -> StorageResult<DeliveryRecord> {
        let subscription = SubscriptionRepository::new(&self.storage).get(subscription_id)?;

        let payload = json!({
            "event": "test",
            "wallet_address": subscription.target_identity,
            "subscription_id": subscription.id,
            "timestamp": Utc::now().to_rfc3339(),
        });

        Ok(self.deliver_one(&subscription, "test", payload, true).await)
    }

    /// Perform one delivery: sign, POST, log, and (for real deliveries)
    /// update the circuit breaker.
    async fn deliver_one(
        &self,
        subscription: &WebhookSubscription,
        event: &str,
        payload: serde_json::Value,
        is_test: bool,
    ) -> DeliveryRecord {
        let body = serde_json::to_vec(&payload).unwrap_or_default();
        let signature = sign_payload(&subscription.secret, &body);

        let outcome = match self
            .http
            .post(&subscription.url)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .timeout(DELIVERY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    DeliveryOutcome::Delivered(status)
                } else {
                    DeliveryOutcome::HttpError(status)
                }
            }
            Err(e) if e.is_timeout() => DeliveryOutcome::Timeout,
            Err(e) => DeliveryOutcome::Network(e.to_string()),
        };

        let record = DeliveryRecord {
            subscription_id: subscription.id.clone(),
            event: event.to_string(),
            payload,
            http_status: outcome.http_status(),
            error: outcome.error_message(),
            test: is_test,
            delivered_at: Utc::now(),
        };

        if let Err(e) = DeliveryLogRepository::new(&self.storage).append(&record) {
            warn!(
                subscription_id = %subscription.id,
                error = %e,
                "failed to append delivery record"
            );
        }

        match &outcome {
            DeliveryOutcome::Delivered(status) => info!(
                subscription_id = %subscription.id,
                event = %event,
                status = status,
                test = is_test,
                "webhook delivered"
            ),
            other => warn!(
                subscription_id = %subscription.id,
                event = %event,
                outcome = ?other,
                test = is_test,
                "webhook delivery failed"
            ),
        }

        if !is_test {
            self.apply_breaker(&subscription.id, outcome.is_success())
                .await;
        }

        record
    }

    fn breaker_lock(&self, subscription_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.breaker_locks.lock() {
            Ok(locks) => locks,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(subscription_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Update circuit-breaker state after a real delivery. The per-
    /// subscription lock serializes concurrent read-modify-write of
    /// `failure_count` for the same subscription.
    async fn apply_breaker(&self, subscription_id: &str, success: bool) {
        let lock = self.breaker_lock(subscription_id);
        let _guard = lock.lock().await;

        let repo = SubscriptionRepository::new(&self.storage);
        let mut subscription = match repo.get(subscription_id) {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(
                    subscription_id = %subscription_id,
                    error = %e,
                    "failed to load subscription for breaker update"
                );
                return;
            }
        };

        if success {
            // Skip the write when already at zero.
            if subscription.failure_count != 0 {
                subscription.failure_count = 0;
                if let Err(e) = repo.update(&subscription) {
                    warn!(
                        subscription_id = %subscription_id,
                        error = %e,
                        "failed to reset failure count"
                    );
                }
            }
            return;
        }

        subscription.failure_count += 1;
        if subscription.failure_count >= FAILURE_THRESHOLD && subscription.active {
            subscription.active = false;
            warn!(
                subscription_id = %subscription_id,
                failure_count = subscription.failure_count,
                "circuit breaker disabling webhook subscription"
            );
        }

        if let Err(e) = repo.update(&subscription) {
            warn!(
                subscription_id = %subscription_id,
                error = %e,
                "failed to update breaker state"
            );
        }
    }
}
