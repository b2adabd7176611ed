// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webhook delivery log.
//!
//! Every delivery attempt, successful or not, is appended to a daily JSONL
//! file. Records are never mutated after insert; they exist for auditing,
//! not for circuit-breaker state (test deliveries are logged here but do
//! not touch `failure_count`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::{JsonStore, StorageError, StorageResult};

/// One webhook delivery attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryRecord {
    /// The subscription this delivery targeted.
    pub subscription_id: String,
    /// Event name delivered.
    pub event: String,
    /// The JSON body that was sent.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// HTTP status received, if the request completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Error description for timeouts and transport failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True for synthetic probe deliveries.
    pub test: bool,
    /// When the attempt finished.
    pub delivered_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Whether the attempt succeeded (2xx response).
    pub fn succeeded(&self) -> bool {
        self.http_status.is_some_and(|s| (200..300).contains(&s)) && self.error.is_none()
    }
}

/// Repository for delivery records.
pub struct DeliveryLogRepository<'a> {
    storage: &'a JsonStore,
}

impl<'a> DeliveryLogRepository<'a> {
    /// Create a new DeliveryLogRepository.
    pub fn new(storage: &'a JsonStore) -> Self {
        Self { storage }
    }

    /// Append a delivery record to today's log file.
    pub fn append(&self, record: &DeliveryRecord) -> StorageResult<()> {
        let date = record.delivered_at.format("%Y-%m-%d").to_string();
        let path = self.storage.paths().delivery_records_file(&date);

        let mut line = serde_json::to_string(record).map_err(|e| {
            StorageError::SerializationError(format!("Failed to serialize delivery record: {e}"))
        })?;
        line.push('\n');

        self.storage.append_raw(&path, line.as_bytes())
    }

    /// Read all delivery records for a specific date.
    pub fn read_records(&self, date: &str) -> StorageResult<Vec<DeliveryRecord>> {
        let path = self.storage.paths().delivery_records_file(date);
        let content = self.storage.read_raw(&path)?;

        let content_str = String::from_utf8(content).map_err(|e| {
            StorageError::SerializationError(format!("Invalid UTF-8 in delivery log: {e}"))
        })?;

        let mut records = Vec::new();
        for line in content_str.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let record: DeliveryRecord = serde_json::from_str(line).map_err(|e| {
                StorageError::SerializationError(format!(
                    "Failed to deserialize delivery record: {e}"
                ))
            })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Read records for one subscription on a date.
    pub fn read_for_subscription(
        &self,
        subscription_id: &str,
        date: &str,
    ) -> StorageResult<Vec<DeliveryRecord>> {
        let records = self.read_records(date)?;
        Ok(records
            .into_iter()
            .filter(|r| r.subscription_id == subscription_id)
            .collect())
    }
}
