// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Raw signal records, one per data source.
//!
//! These are the typed inputs handed to the scorers by the upstream data
//! acquisition services (on-chain indexer, GitHub connector, bank-data
//! provider). They are immutable snapshots; the core never mutates or
//! re-fetches them. A defaulted record (all zeros) represents an account
//! with no observed activity and scores zero, not an error.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wallet activity snapshot from the on-chain indexer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OnChainSignal {
    /// Age of the wallet in days, from first observed transaction.
    pub wallet_age_days: u32,
    /// Lifetime transaction count.
    pub transaction_count: u32,
    /// Number of distinct DeFi protocols interacted with.
    pub protocol_count: u32,
    /// Lifetime DeFi volume in USD.
    pub defi_volume_usd: f64,
    /// Lending-protocol loans fully repaid.
    pub loans_repaid: u32,
    /// Lending-protocol liquidation events.
    pub liquidation_count: u32,
    /// Currently staked balance in USD.
    pub staked_usd: f64,
    /// Current stablecoin balance in USD.
    pub stablecoin_balance_usd: f64,
}

/// Developer activity snapshot from the GitHub connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeveloperSignal {
    /// Age of the developer account in days.
    pub account_age_days: u32,
    /// Public repository count.
    pub public_repos: u32,
    /// Stars across all public repositories.
    pub total_stars: u32,
    /// Follower count.
    pub followers: u32,
    /// Commits in the recent activity window (90 days).
    pub recent_commit_count: u32,
    /// Weeks with at least one contribution in the recent window.
    pub recent_active_weeks: u32,
}

/// Financial profile snapshot from the bank-data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FinancialSignal {
    /// Age of the oldest linked account in days.
    pub account_age_days: u32,
    /// Average balance across linked accounts in USD.
    pub average_balance_usd: f64,
    /// Consecutive months with recurring income deposits.
    pub income_streak_months: u32,
    /// Count of on-time bill/loan payments observed.
    pub on_time_payment_count: u32,
    /// Count of overdraft events observed.
    pub overdraft_count: u32,
}
