// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the JSON file store.
//!
//! Each repository provides the operations for a specific entity type,
//! using the JsonStore for all file operations.

pub mod deliveries;
pub mod rate_windows;
pub mod scores;
pub mod subscriptions;

pub use deliveries::{DeliveryLogRepository, DeliveryRecord};
pub use rate_windows::FileRateStore;
pub use scores::{ScoreRepository, StoredScore};
pub use subscriptions::SubscriptionRepository;
