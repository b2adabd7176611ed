// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the storage layout.

use std::path::{Path, PathBuf};

/// Base directory for all persistent storage.
pub const DATA_ROOT: &str = "/data";

/// Storage path utilities for the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Score Paths ==========

    /// Directory containing the latest score per identity.
    pub fn scores_dir(&self) -> PathBuf {
        self.root.join("scores")
    }

    /// Path to the latest score file for an identity.
    pub fn score(&self, identity: &str) -> PathBuf {
        self.scores_dir().join(format!("{identity}.json"))
    }

    // ========== Webhook Subscription Paths ==========

    /// Directory containing all webhook subscriptions.
    pub fn subscriptions_dir(&self) -> PathBuf {
        self.root.join("subscriptions")
    }

    /// Path to a specific subscription file.
    pub fn subscription(&self, subscription_id: &str) -> PathBuf {
        self.subscriptions_dir()
            .join(format!("{subscription_id}.json"))
    }

    // ========== Delivery Log Paths ==========

    /// Directory containing delivery logs.
    pub fn deliveries_dir(&self) -> PathBuf {
        self.root.join("deliveries")
    }

    /// Directory for a specific date's delivery logs.
    pub fn deliveries_date_dir(&self, date: &str) -> PathBuf {
        self.deliveries_dir().join(date)
    }

    /// Path to a daily delivery records file (JSONL format).
    pub fn delivery_records_file(&self, date: &str) -> PathBuf {
        self.deliveries_date_dir(date).join("records.jsonl")
    }

    // ========== Rate Limit Paths ==========

    /// Directory containing rate-limit window counters.
    pub fn ratelimit_dir(&self) -> PathBuf {
        self.root.join("ratelimit")
    }

    /// Path to a rate-limit window file. `key_hash` is the hex-hashed
    /// caller key (raw keys may contain path separators).
    pub fn rate_window(&self, key_hash: &str) -> PathBuf {
        self.ratelimit_dir().join(format!("{key_hash}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_use_data_root() {
        let paths = StoragePaths::default();
        assert_eq!(paths.root(), Path::new("/data"));
    }

    #[test]
    fn custom_root_for_testing() {
        let paths = StoragePaths::new("/tmp/test-data");
        assert_eq!(paths.root(), Path::new("/tmp/test-data"));
        assert_eq!(
            paths.score("0xabc"),
            PathBuf::from("/tmp/test-data/scores/0xabc.json")
        );
    }

    #[test]
    fn score_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.scores_dir(), PathBuf::from("/data/scores"));
        assert_eq!(paths.score("id-1"), PathBuf::from("/data/scores/id-1.json"));
    }

    #[test]
    fn subscription_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(
            paths.subscriptions_dir(),
            PathBuf::from("/data/subscriptions")
        );
        assert_eq!(
            paths.subscription("sub-123"),
            PathBuf::from("/data/subscriptions/sub-123.json")
        );
    }

    #[test]
    fn delivery_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.deliveries_dir(), PathBuf::from("/data/deliveries"));
        assert_eq!(
            paths.delivery_records_file("2026-02-03"),
            PathBuf::from("/data/deliveries/2026-02-03/records.jsonl")
        );
    }

    #[test]
    fn ratelimit_paths_are_correct() {
        let paths = StoragePaths::default();
        assert_eq!(paths.ratelimit_dir(), PathBuf::from("/data/ratelimit"));
        assert_eq!(
            paths.rate_window("deadbeef"),
            PathBuf::from("/data/ratelimit/deadbeef.json")
        );
    }
}
