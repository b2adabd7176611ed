// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage over a plain data directory: one JSON file per
//! entity, JSONL append logs for delivery records. The deployment mounts
//! whatever durability layer it wants underneath; the core treats this as
//! a key-value store.
//!
//! ## Storage Layout
//!
//! ```text
//! /data/
//!   scores/
//!     {identity}.json          # Latest assembled score + attestation
//!   subscriptions/
//!     {subscription_id}.json   # Webhook subscriptions
//!   deliveries/
//!     {date}/records.jsonl     # Daily delivery logs (append-only)
//!   ratelimit/
//!     {key-hash}.json          # Fixed-window counters
//! ```

pub mod json_fs;
pub mod paths;
pub mod repository;

pub use json_fs::{JsonStore, StorageError, StorageResult};
pub use paths::StoragePaths;
pub use repository::{
    DeliveryLogRepository, DeliveryRecord, FileRateStore, ScoreRepository, StoredScore,
    SubscriptionRepository,
};
