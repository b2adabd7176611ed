// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window rate guard.
//!
//! Token accounting per opaque caller key (API key id + endpoint, or
//! client IP). The window anchors at the first request: hits inside the
//! window increment the counter without moving the window start, so a
//! steady stream of requests does not extend the window indefinitely.
//!
//! The counter store is injected via [`RateStore`] so the guard is
//! testable without global state. Any store error fails open (request
//! allowed, warning logged): an infrastructure hiccup must not block
//! legitimate traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::StorageResult;

/// Persisted fixed-window counter state for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    /// Requests observed in the current window.
    pub count: u32,
    /// When the current window started (first request in the window).
    pub window_started_at: DateTime<Utc>,
}

/// Outcome of a rate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: DateTime<Utc>,
}

/// Counter storage abstraction injected into the guard.
pub trait RateStore: Send + Sync {
    /// Fetch the current window for a key, `None` if never seen.
    fn fetch(&self, key: &str) -> StorageResult<Option<RateWindow>>;

    /// Persist the window for a key.
    fn store(&self, key: &str, window: &RateWindow) -> StorageResult<()>;
}

/// In-memory store for tests and single-process deployments without a
/// data directory.
#[derive(Default)]
pub struct InMemoryRateStore {
    windows: Mutex<HashMap<String, RateWindow>>,
}

impl RateStore for InMemoryRateStore {
    fn fetch(&self, key: &str) -> StorageResult<Option<RateWindow>> {
        Ok(self
            .windows
            .lock()
            .map(|map| map.get(key).cloned())
            .unwrap_or(None))
    }

    fn store(&self, key: &str, window: &RateWindow) -> StorageResult<()> {
        if let Ok(mut map) = self.windows.lock() {
            map.insert(key.to_string(), window.clone());
        }
        Ok(())
    }
}

/// The rate guard. Per-key read-increment-write is serialized through a
/// keyed mutex registry so two concurrent requests cannot both read the
/// same pre-increment count.
pub struct RateGuard {
    store: Box<dyn RateStore>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RateGuard {
    /// Create a guard over the given counter store.
    pub fn new(store: impl RateStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.locks.lock() {
            Ok(locks) => locks,
            // A poisoned registry only costs per-key serialization.
            Err(poisoned) => poisoned.into_inner(),
        };
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Check and count one request for `key`.
    ///
    /// Fails open on store errors.
    pub async fn allow(&self, key: &str, limit: u32, window: Duration) -> RateDecision {
        let key_lock = self.lock_for(key);
        let _guard = key_lock.lock().await;

        let now = Utc::now();
        let window_chrono = chrono::Duration::from_std(window)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));

        let current = match self.store.fetch(key) {
            Ok(current) => current,
            Err(e) => {
                warn!(key = %key, error = %e, "rate store fetch failed; failing open");
                return RateDecision {
                    allowed: true,
                    remaining: limit.saturating_sub(1),
                    reset_at: now + window_chrono,
                };
            }
        };

        // Window expired or never seen: anchor a new window at this request.
        let fresh = match current {
            Some(ref w) if now < w.window_started_at + window_chrono => None,
            _ => Some(RateWindow {
                count: 1,
                window_started_at: now,
            }),
        };

        if let Some(window_state) = fresh {
            let reset_at = window_state.window_started_at + window_chrono;
            if let Err(e) = self.store.store(key, &window_state) {
                warn!(key = %key, error = %e, "rate store write failed; failing open");
            }
            return RateDecision {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_at,
            };
        }

        let mut window_state = current.unwrap_or(RateWindow {
            count: 0,
            window_started_at: now,
        });
        let reset_at = window_state.window_started_at + window_chrono;

        if window_state.count >= limit {
            return RateDecision {
                allowed: false,
                remaining: 0,
                reset_at,
            };
        }

        // Count the hit without moving the window anchor.
        window_state.count += 1;
        if let Err(e) = self.store.store(key, &window_state) {
            warn!(key = %key, error = %e, "rate store write failed; failing open");
        }

        RateDecision {
            allowed: true,
            remaining: limit.saturating_sub(window_state.count),
            reset_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn allows_up_to_limit_then_denies() {
        let guard = RateGuard::new(InMemoryRateStore::default());

        for i in 0..3 {
            let decision = guard.allow("caller", 3, WINDOW).await;
            assert!(decision.allowed, "request {i} should be allowed");
            assert_eq!(decision.remaining, 2 - i);
        }

        let denied = guard.allow("caller", 3, WINDOW).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let guard = RateGuard::new(InMemoryRateStore::default());

        guard.allow("a", 1, WINDOW).await;
        let denied = guard.allow("a", 1, WINDOW).await;
        assert!(!denied.allowed);

        let other = guard.allow("b", 1, WINDOW).await;
        assert!(other.allowed);
    }

    #[tokio::test]
    async fn window_anchors_at_first_request() {
        let store = InMemoryRateStore::default();
        let guard = RateGuard::new(store);

        let first = guard.allow("caller", 10, WINDOW).await;
        let anchor = first.reset_at;

        // Later hits in the same window keep the original reset time.
        let second = guard.allow("caller", 10, WINDOW).await;
        assert_eq!(second.reset_at, anchor);
    }

    #[tokio::test]
    async fn expired_window_resets_counter() {
        let store = InMemoryRateStore::default();
        // Seed an old, exhausted window.
        store
            .store(
                "caller",
                &RateWindow {
                    count: 10,
                    window_started_at: Utc::now() - chrono::Duration::seconds(120),
                },
            )
            .unwrap();

        let guard = RateGuard::new(store);
        let decision = guard.allow("caller", 10, WINDOW).await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 9);
    }

    struct FailingStore;

    impl RateStore for FailingStore {
        fn fetch(&self, _key: &str) -> StorageResult<Option<RateWindow>> {
            Err(StorageError::NotInitialized)
        }

        fn store(&self, _key: &str, _window: &RateWindow) -> StorageResult<()> {
            Err(StorageError::NotInitialized)
        }
    }

    #[tokio::test]
    async fn store_errors_fail_open() {
        let guard = RateGuard::new(FailingStore);

        // Every request is allowed despite the broken store.
        for _ in 0..5 {
            let decision = guard.allow("caller", 1, WINDOW).await;
            assert!(decision.allowed);
        }
    }
}
