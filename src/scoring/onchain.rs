// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain activity scorer.
//!
//! Maps an [`OnChainSignal`] to a sub-score out of 500. The repayment
//! dimension is the only one with a penalty: each liquidation subtracts 25
//! points from the repayment ramp, saturating at zero so liquidations can
//! erase lending credit but never bleed into other dimensions.

use std::collections::BTreeMap;

use super::ramp::{ramp, Knee};
use super::signals::OnChainSignal;
use super::{SubScore, ONCHAIN_MAX};

const WALLET_AGE_KNEES: [Knee; 4] = [(0.0, 0.0), (30.0, 20.0), (365.0, 60.0), (1095.0, 100.0)];
const ACTIVITY_KNEES: [Knee; 4] = [(0.0, 0.0), (10.0, 20.0), (100.0, 50.0), (1000.0, 80.0)];
const PROTOCOL_KNEES: [Knee; 4] = [(0.0, 0.0), (3.0, 30.0), (10.0, 60.0), (25.0, 80.0)];
const VOLUME_KNEES: [Knee; 4] = [(0.0, 0.0), (1_000.0, 20.0), (50_000.0, 55.0), (500_000.0, 80.0)];
const REPAYMENT_KNEES: [Knee; 4] = [(0.0, 0.0), (3.0, 40.0), (10.0, 70.0), (50.0, 100.0)];
const STAKING_KNEES: [Knee; 4] = [(0.0, 0.0), (500.0, 20.0), (10_000.0, 45.0), (100_000.0, 60.0)];
const STABLECOIN_KNEES: [Knee; 4] =
    [(0.0, 0.0), (500.0, 20.0), (10_000.0, 45.0), (100_000.0, 60.0)];

/// Points subtracted from the repayment dimension per liquidation event.
const LIQUIDATION_PENALTY: u32 = 25;

/// Score an on-chain signal. Pure and total: an all-zero signal yields an
/// all-zero breakdown.
pub fn score(signal: &OnChainSignal) -> SubScore {
    let mut breakdown = BTreeMap::new();

    breakdown.insert(
        "wallet_age".to_string(),
        ramp(&WALLET_AGE_KNEES, signal.wallet_age_days as f64),
    );
    breakdown.insert(
        "activity".to_string(),
        ramp(&ACTIVITY_KNEES, signal.transaction_count as f64),
    );
    breakdown.insert(
        "protocol_diversity".to_string(),
        ramp(&PROTOCOL_KNEES, signal.protocol_count as f64),
    );
    breakdown.insert(
        "defi_volume".to_string(),
        ramp(&VOLUME_KNEES, signal.defi_volume_usd),
    );

    let repayment = ramp(&REPAYMENT_KNEES, signal.loans_repaid as f64)
        .saturating_sub(LIQUIDATION_PENALTY.saturating_mul(signal.liquidation_count));
    breakdown.insert("repayment".to_string(), repayment);

    breakdown.insert(
        "staking".to_string(),
        ramp(&STAKING_KNEES, signal.staked_usd),
    );
    breakdown.insert(
        "stablecoin".to_string(),
        ramp(&STABLECOIN_KNEES, signal.stablecoin_balance_usd),
    );

    SubScore::from_breakdown(ONCHAIN_MAX, breakdown)
}
