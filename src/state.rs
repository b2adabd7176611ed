// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::config::{SigningConfig, DEFAULT_RATE_LIMIT_PER_MINUTE};
use crate::ratelimit::{RateGuard, RateStore};
use crate::score_cache::ScoreCache;
use crate::storage::JsonStore;
use crate::webhooks::WebhookNotifier;

/// Per-caller rate-limit settings applied by the API layer.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub limit: u32,
    pub window: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RATE_LIMIT_PER_MINUTE,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<JsonStore>,
    pub signing: Arc<SigningConfig>,
    pub cache: Arc<ScoreCache>,
    pub notifier: WebhookNotifier,
    pub rate_guard: Arc<RateGuard>,
    pub rate_settings: RateLimitSettings,
}

impl AppState {
    pub fn new(
        storage: JsonStore,
        signing: SigningConfig,
        rate_store: impl RateStore + 'static,
        rate_settings: RateLimitSettings,
    ) -> Self {
        let storage = Arc::new(storage);
        Self {
            notifier: WebhookNotifier::new(Arc::clone(&storage)),
            storage,
            signing: Arc::new(signing),
            cache: Arc::new(ScoreCache::default()),
            rate_guard: Arc::new(RateGuard::new(rate_store)),
            rate_settings,
        }
    }

    /// State over an initialized store with an in-memory rate store and a
    /// fixed signing secret. Test helper.
    #[cfg(test)]
    pub fn for_tests(storage: JsonStore) -> Self {
        use crate::ratelimit::InMemoryRateStore;

        Self::new(
            storage,
            SigningConfig::with_secret("test-signing-secret"),
            InMemoryRateStore::default(),
            RateLimitSettings::default(),
        )
    }
}
