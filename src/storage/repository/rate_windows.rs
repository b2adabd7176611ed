// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File-backed rate-limit counter store.
//!
//! Caller keys are opaque strings that may contain path separators, so
//! files are named by the SHA-256 of the key rather than the key itself.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::ratelimit::{RateStore, RateWindow};

use super::super::{JsonStore, StorageError, StorageResult};

/// [`RateStore`] implementation over the JSON file store.
pub struct FileRateStore {
    storage: Arc<JsonStore>,
}

impl FileRateStore {
    /// Create a new FileRateStore.
    pub fn new(storage: Arc<JsonStore>) -> Self {
        Self { storage }
    }

    fn key_hash(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }
}

impl RateStore for FileRateStore {
    fn fetch(&self, key: &str) -> StorageResult<Option<RateWindow>> {
        let path = self.storage.paths().rate_window(&Self::key_hash(key));
        if !self.storage.exists(&path) {
            return Ok(None);
        }
        match self.storage.read_json(path) {
            Ok(window) => Ok(Some(window)),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn store(&self, key: &str, window: &RateWindow) -> StorageResult<()> {
        let path = self.storage.paths().rate_window(&Self::key_hash(key));
        self.storage.write_json(path, window)
    }
}
