// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Latest-score repository.
//!
//! One file per identity holding the most recent assembled score and its
//! attestation. Earlier scores are overwritten; historical analysis is out
//! of scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attestation::Attestation;
use crate::scoring::AssembledScore;

use super::super::{JsonStore, StorageError, StorageResult};

/// The persisted latest score for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredScore {
    /// The scored identity (primary wallet address or profile id).
    pub identity: String,
    /// The assembled score.
    pub score: AssembledScore,
    /// The attestation issued for this score.
    pub attestation: Attestation,
    /// When this record was written.
    pub updated_at: DateTime<Utc>,
}

/// Repository for latest-score records.
pub struct ScoreRepository<'a> {
    storage: &'a JsonStore,
}

impl<'a> ScoreRepository<'a> {
    /// Create a new ScoreRepository.
    pub fn new(storage: &'a JsonStore) -> Self {
        Self { storage }
    }

    /// Check if an identity has a persisted score.
    pub fn exists(&self, identity: &str) -> bool {
        self.storage.exists(self.storage.paths().score(identity))
    }

    /// Get the latest score for an identity.
    pub fn get(&self, identity: &str) -> StorageResult<StoredScore> {
        let path = self.storage.paths().score(identity);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Score for {identity}")));
        }
        self.storage.read_json(path)
    }

    /// Write (or overwrite) the latest score for an identity.
    pub fn put(&self, record: &StoredScore) -> StorageResult<()> {
        self.storage
            .write_json(self.storage.paths().score(&record.identity), record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningConfig;
    use crate::scoring::{assemble, SubScore};
    use crate::storage::StoragePaths;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn setup() -> (TempDir, JsonStore) {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, storage)
    }

    fn sample_record(identity: &str) -> StoredScore {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("activity".to_string(), 200);
        let score = assemble(
            Some(SubScore {
                points: 200,
                breakdown,
            }),
            None,
            None,
            0,
        )
        .unwrap();
        let attestation = crate::attestation::sign(
            &score,
            vec!["onchain_activity".to_string()],
            &SigningConfig::with_secret("test"),
        );
        StoredScore {
            identity: identity.to_string(),
            score,
            attestation,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn put_and_get_round_trips() {
        let (_temp, storage) = setup();
        let repo = ScoreRepository::new(&storage);

        let record = sample_record("0xabc");
        repo.put(&record).unwrap();

        assert!(repo.exists("0xabc"));
        let read = repo.get("0xabc").unwrap();
        assert_eq!(read, record);
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_temp, storage) = setup();
        let repo = ScoreRepository::new(&storage);

        assert!(!repo.exists("0xmissing"));
        assert!(matches!(
            repo.get("0xmissing"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn put_overwrites_prior_score() {
        let (_temp, storage) = setup();
        let repo = ScoreRepository::new(&storage);

        let first = sample_record("0xabc");
        repo.put(&first).unwrap();

        let mut second = sample_record("0xabc");
        second.score.total = 999;
        repo.put(&second).unwrap();

        assert_eq!(repo.get("0xabc").unwrap().score.total, 999);
    }
}
