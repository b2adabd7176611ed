// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Financial profile scorer.
//!
//! Maps a [`FinancialSignal`] (bank-data provider snapshot) to a sub-score
//! out of 300. Overdrafts penalize the payment-history dimension only,
//! saturating at zero.

use std::collections::BTreeMap;

use super::ramp::{ramp, Knee};
use super::signals::FinancialSignal;
use super::{SubScore, FINANCIAL_MAX};

const ACCOUNT_AGE_KNEES: [Knee; 4] = [(0.0, 0.0), (90.0, 15.0), (365.0, 40.0), (1825.0, 60.0)];
const BALANCE_KNEES: [Knee; 4] = [(0.0, 0.0), (500.0, 25.0), (10_000.0, 60.0), (100_000.0, 80.0)];
const INCOME_KNEES: [Knee; 4] = [(0.0, 0.0), (3.0, 30.0), (12.0, 60.0), (24.0, 80.0)];
const PAYMENT_KNEES: [Knee; 4] = [(0.0, 0.0), (6.0, 35.0), (24.0, 65.0), (60.0, 80.0)];

/// Points subtracted from the payment-history dimension per overdraft.
const OVERDRAFT_PENALTY: u32 = 20;

/// Score a financial signal. Pure and total: an all-zero signal yields an
/// all-zero breakdown.
pub fn score(signal: &FinancialSignal) -> SubScore {
    let mut breakdown = BTreeMap::new();

    breakdown.insert(
        "account_age".to_string(),
        ramp(&ACCOUNT_AGE_KNEES, signal.account_age_days as f64),
    );
    breakdown.insert(
        "balance".to_string(),
        ramp(&BALANCE_KNEES, signal.average_balance_usd),
    );
    breakdown.insert(
        "income_consistency".to_string(),
        ramp(&INCOME_KNEES, signal.income_streak_months as f64),
    );

    let payments = ramp(&PAYMENT_KNEES, signal.on_time_payment_count as f64)
        .saturating_sub(OVERDRAFT_PENALTY.saturating_mul(signal.overdraft_count));
    breakdown.insert("payment_history".to_string(), payments);

    SubScore::from_breakdown(FINANCIAL_MAX, breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_signal_scores_zero() {
        assert_eq!(score(&FinancialSignal::default()).points, 0);
    }

    #[test]
    fn knee_aligned_profile() {
        let signal = FinancialSignal {
            account_age_days: 365,
            average_balance_usd: 10_000.0,
            income_streak_months: 12,
            on_time_payment_count: 24,
            overdraft_count: 0,
        };
        let sub = score(&signal);
        assert_eq!(sub.dimension("account_age"), 40);
        assert_eq!(sub.dimension("balance"), 60);
        assert_eq!(sub.dimension("income_consistency"), 60);
        assert_eq!(sub.dimension("payment_history"), 65);
        assert_eq!(sub.points, 225);
    }

    #[test]
    fn overdrafts_penalize_payment_history_only() {
        let clean = FinancialSignal {
            on_time_payment_count: 24,
            average_balance_usd: 10_000.0,
            ..Default::default()
        };
        let messy = FinancialSignal {
            overdraft_count: 2,
            ..clean.clone()
        };

        assert_eq!(score(&clean).dimension("payment_history"), 65);
        assert_eq!(score(&messy).dimension("payment_history"), 25);
        assert_eq!(
            score(&clean).dimension("balance"),
            score(&messy).dimension("balance")
        );
    }

    #[test]
    fn payment_penalty_saturates_at_zero() {
        let signal = FinancialSignal {
            on_time_payment_count: 6,
            overdraft_count: 50,
            ..Default::default()
        };
        assert_eq!(score(&signal).dimension("payment_history"), 0);
    }

    #[test]
    fn income_streak_monotonic() {
        let mut prev = 0;
        for months in 0..=30 {
            let sub = score(&FinancialSignal {
                income_streak_months: months,
                ..Default::default()
            });
            assert!(sub.points >= prev);
            prev = sub.points;
        }
    }

    #[test]
    fn maxed_signal_caps_at_source_max() {
        let signal = FinancialSignal {
            account_age_days: 10_000,
            average_balance_usd: 10_000_000.0,
            income_streak_months: 120,
            on_time_payment_count: 1_000,
            overdraft_count: 0,
        };
        // Dimension caps sum to exactly 300.
        assert_eq!(score(&signal).points, FINANCIAL_MAX);
    }
}
