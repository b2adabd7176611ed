// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webhook subscription repository.
//!
//! One file per subscription. Listing scans the subscriptions directory;
//! volumes here are small (subscriptions per identity, not per request) so
//! a scan is fine.

use crate::webhooks::WebhookSubscription;

use super::super::{JsonStore, StorageError, StorageResult};

/// Repository for webhook subscriptions.
pub struct SubscriptionRepository<'a> {
    storage: &'a JsonStore,
}

impl<'a> SubscriptionRepository<'a> {
    /// Create a new SubscriptionRepository.
    pub fn new(storage: &'a JsonStore) -> Self {
        Self { storage }
    }

    /// Check if a subscription exists.
    pub fn exists(&self, subscription_id: &str) -> bool {
        self.storage
            .exists(self.storage.paths().subscription(subscription_id))
    }

    /// Get a subscription by ID.
    pub fn get(&self, subscription_id: &str) -> StorageResult<WebhookSubscription> {
        let path = self.storage.paths().subscription(subscription_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!(
                "Subscription {subscription_id}"
            )));
        }
        self.storage.read_json(path)
    }

    /// Create a new subscription.
    pub fn create(&self, subscription: &WebhookSubscription) -> StorageResult<()> {
        if self.exists(&subscription.id) {
            return Err(StorageError::AlreadyExists(format!(
                "Subscription {}",
                subscription.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().subscription(&subscription.id), subscription)
    }

    /// Update an existing subscription (circuit-breaker state changes).
    pub fn update(&self, subscription: &WebhookSubscription) -> StorageResult<()> {
        if !self.exists(&subscription.id) {
            return Err(StorageError::NotFound(format!(
                "Subscription {}",
                subscription.id
            )));
        }
        self.storage
            .write_json(self.storage.paths().subscription(&subscription.id), subscription)
    }

    /// Delete a subscription.
    pub fn delete(&self, subscription_id: &str) -> StorageResult<()> {
        if !self.exists(subscription_id) {
            return Err(StorageError::NotFound(format!(
                "Subscription {subscription_id}"
            )));
        }
        self.storage
            .delete(self.storage.paths().subscription(subscription_id))
    }

    /// List every subscription.
    pub fn list_all(&self) -> StorageResult<Vec<WebhookSubscription>> {
        let ids = self
            .storage
            .list_files(self.storage.paths().subscriptions_dir(), "json")?;

        let mut subscriptions = Vec::with_capacity(ids.len());
        for id in ids {
            subscriptions.push(self.get(&id)?);
        }
        Ok(subscriptions)
    }

    /// List subscriptions owned by a subscriber.
    pub fn list_by_subscriber(&self, subscriber_id: &str) -> StorageResult<Vec<WebhookSubscription>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .collect())
    }

    /// List active subscriptions for a target identity that subscribe to
    /// the given event. This is the notifier's fan-out query; disabled
    /// subscriptions never appear here.
    pub fn list_active_for(
        &self,
        target_identity: &str,
        event: &str,
    ) -> StorageResult<Vec<WebhookSubscription>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.active && s.target_identity == target_identity && s.wants(event))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use crate::webhooks::SCORE_UPDATED_EVENT;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonStore) {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn sample(target: &str) -> WebhookSubscription {
        WebhookSubscription::new(
            "lender-1",
            target,
            "https://lender.example.com/hooks/kite",
            "s3cret",
            vec![SCORE_UPDATED_EVENT.to_string()],
        )
        .unwrap()
    }

    #[test]
    fn create_get_round_trips() {
        let (_temp, storage) = setup();
        let repo = SubscriptionRepository::new(&storage);

        let sub = sample("0xabc");
        repo.create(&sub).unwrap();

        let read = repo.get(&sub.id).unwrap();
        assert_eq!(read, sub);
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let (_temp, storage) = setup();
        let repo = SubscriptionRepository::new(&storage);

        let sub = sample("0xabc");
        repo.create(&sub).unwrap();
        assert!(matches!(
            repo.create(&sub),
            Err(StorageError::AlreadyExists(_))
        ));
    }

    #[test]
    fn update_missing_is_not_found() {
        let (_temp, storage) = setup();
        let repo = SubscriptionRepository::new(&storage);

        let sub = sample("0xabc");
        assert!(matches!(repo.update(&sub), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn list_active_for_filters_identity_event_and_state() {
        let (_temp, storage) = setup();
        let repo = SubscriptionRepository::new(&storage);

        let matching = sample("0xabc");
        repo.create(&matching).unwrap();

        let other_identity = sample("0xother");
        repo.create(&other_identity).unwrap();

        let mut disabled = sample("0xabc");
        disabled.active = false;
        repo.create(&disabled).unwrap();

        let listed = repo.list_active_for("0xabc", SCORE_UPDATED_EVENT).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, matching.id);

        // Unknown event matches nothing.
        let none = repo.list_active_for("0xabc", "attestation.issued").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn list_by_subscriber_exposes_breaker_state() {
        let (_temp, storage) = setup();
        let repo = SubscriptionRepository::new(&storage);

        let mut sub = sample("0xabc");
        sub.failure_count = 3;
        repo.create(&sub).unwrap();

        let listed = repo.list_by_subscriber("lender-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].failure_count, 3);
        assert!(listed[0].active);
    }

    #[test]
    fn delete_removes_subscription() {
        let (_temp, storage) = setup();
        let repo = SubscriptionRepository::new(&storage);

        let sub = sample("0xabc");
        repo.create(&sub).unwrap();
        repo.delete(&sub.id).unwrap();
        assert!(!repo.exists(&sub.id));
        assert!(matches!(
            repo.delete(&sub.id),
            Err(StorageError::NotFound(_))
        ));
    }
}
