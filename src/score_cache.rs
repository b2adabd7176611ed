// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Short-lived cache for computed scores.
//!
//! Re-computation within the TTL returns the prior result unchanged, so
//! upstream data-source instability (RPC inconsistency between calls)
//! cannot make an identity's score visibly flap between back-to-back
//! requests. The cached attestation is returned as-is for the same reason.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::attestation::Attestation;
use crate::scoring::AssembledScore;

/// How long a computed score is pinned before recomputation is allowed.
pub const SCORE_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default number of identities kept in the cache.
pub const SCORE_CACHE_CAPACITY: usize = 1024;

/// A cached score computation result.
#[derive(Debug, Clone)]
pub struct CachedScore {
    pub score: AssembledScore,
    pub attestation: Attestation,
}

struct CacheEntry {
    value: CachedScore,
    inserted_at: Instant,
}

/// In-process LRU cache of recent score computations, keyed by identity.
pub struct ScoreCache {
    cache: Mutex<LruCache<String, CacheEntry>>,
    ttl: Duration,
}

impl ScoreCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap()),
            )),
            ttl,
        }
    }

    /// Get the cached result for an identity.
    ///
    /// Returns `None` if not cached or expired.
    pub fn get(&self, identity: &str) -> Option<CachedScore> {
        let key = identity.to_lowercase();
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            // Expired — remove it
            cache.pop(&key);
        }
        None
    }

    /// Store a computation result for an identity.
    pub fn put(&self, identity: &str, value: CachedScore) {
        let key = identity.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                key,
                CacheEntry {
                    value,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    /// Drop the cached result for an identity.
    pub fn invalidate(&self, identity: &str) {
        let key = identity.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&key);
        }
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(SCORE_CACHE_CAPACITY, SCORE_CACHE_TTL)
    }
}
