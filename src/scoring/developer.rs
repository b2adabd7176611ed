// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Developer activity scorer.
//!
//! Maps a [`DeveloperSignal`] to a sub-score out of 300. Documented bands
//! for this axis: 0–84 Building, 85–169 Steady, 170–249 Strong, 250–300
//! Elite.
//!
//! Raw volume alone cannot dominate: commit count feeds only the
//! `code_quality` dimension (capped at 60), so a high commit count without
//! account history, community trust, or consistent activity still lands in
//! the Building band.

use std::collections::BTreeMap;

use super::ramp::{ramp, Knee};
use super::signals::DeveloperSignal;
use super::{SubScore, DEVELOPER_MAX};

const ACCOUNT_AGE_KNEES: [Knee; 4] = [(0.0, 0.0), (30.0, 10.0), (365.0, 40.0), (1825.0, 60.0)];
const REPO_KNEES: [Knee; 4] = [(0.0, 0.0), (5.0, 15.0), (25.0, 40.0), (100.0, 60.0)];
const STAR_KNEES: [Knee; 3] = [(0.0, 0.0), (50.0, 10.0), (500.0, 20.0)];
const FOLLOWER_KNEES: [Knee; 4] = [(0.0, 0.0), (10.0, 20.0), (100.0, 45.0), (1000.0, 60.0)];
const ACTIVE_WEEK_KNEES: [Knee; 4] = [(0.0, 0.0), (4.0, 15.0), (12.0, 40.0), (26.0, 60.0)];
const COMMIT_KNEES: [Knee; 4] = [(0.0, 0.0), (10.0, 15.0), (50.0, 35.0), (200.0, 60.0)];

/// Portfolio breadth combines repo count and star breadth, jointly capped.
const PORTFOLIO_CAP: u32 = 60;

/// Score a developer signal. Pure and total: an all-zero signal yields an
/// all-zero breakdown.
pub fn score(signal: &DeveloperSignal) -> SubScore {
    let mut breakdown = BTreeMap::new();

    breakdown.insert(
        "account_age".to_string(),
        ramp(&ACCOUNT_AGE_KNEES, signal.account_age_days as f64),
    );

    let portfolio = ramp(&REPO_KNEES, signal.public_repos as f64)
        + ramp(&STAR_KNEES, signal.total_stars as f64);
    breakdown.insert("portfolio".to_string(), portfolio.min(PORTFOLIO_CAP));

    breakdown.insert(
        "community".to_string(),
        ramp(&FOLLOWER_KNEES, signal.followers as f64),
    );

    breakdown.insert(
        "consistency".to_string(),
        ramp(&ACTIVE_WEEK_KNEES, signal.recent_active_weeks as f64),
    );

    breakdown.insert(
        "code_quality".to_string(),
        ramp(&COMMIT_KNEES, signal.recent_commit_count as f64),
    );

    SubScore::from_breakdown(DEVELOPER_MAX, breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_signal_scores_zero() {
        let sub = score(&DeveloperSignal::default());
        assert_eq!(sub.points, 0);
        assert!(sub.breakdown.values().all(|&v| v == 0));
    }

    #[test]
    fn strong_band_profile() {
        // One-year-old account, moderate portfolio, steady recent activity.
        let signal = DeveloperSignal {
            account_age_days: 365,
            public_repos: 25,
            total_stars: 15,
            followers: 12,
            recent_commit_count: 55,
            recent_active_weeks: 12,
        };
        let sub = score(&signal);

        assert_eq!(sub.dimension("account_age"), 40);
        assert!(sub.dimension("code_quality") >= 35);
        assert!(
            (170..=250).contains(&sub.points),
            "expected Strong band, got {}",
            sub.points
        );
    }

    #[test]
    fn deterministic_for_identical_input() {
        let signal = DeveloperSignal {
            account_age_days: 730,
            public_repos: 12,
            total_stars: 88,
            followers: 40,
            recent_commit_count: 120,
            recent_active_weeks: 20,
        };
        assert_eq!(score(&signal), score(&signal));
    }

    #[test]
    fn followers_monotonic() {
        let base = DeveloperSignal {
            account_age_days: 365,
            followers: 10,
            ..Default::default()
        };
        let more = DeveloperSignal {
            followers: 500,
            ..base.clone()
        };
        assert!(score(&more).dimension("community") >= score(&base).dimension("community"));
        assert!(score(&more).points >= score(&base).points);
    }

    #[test]
    fn commit_volume_cannot_dominate() {
        // Massive commit volume with nothing else caps at the code_quality
        // dimension cap, far below the source maximum.
        let signal = DeveloperSignal {
            recent_commit_count: 1_000_000,
            ..Default::default()
        };
        let sub = score(&signal);
        assert_eq!(sub.dimension("code_quality"), 60);
        assert_eq!(sub.points, 60);
    }

    #[test]
    fn maxed_signal_caps_at_source_max() {
        let signal = DeveloperSignal {
            account_age_days: 10_000,
            public_repos: 500,
            total_stars: 10_000,
            followers: 50_000,
            recent_commit_count: 5_000,
            recent_active_weeks: 52,
        };
        let sub = score(&signal);
        assert_eq!(sub.points, DEVELOPER_MAX);
        assert!(sub.breakdown.values().all(|&v| v <= 60));
    }

    #[test]
    fn portfolio_joint_cap_holds() {
        let signal = DeveloperSignal {
            public_repos: 100,
            total_stars: 500,
            ..Default::default()
        };
        // 60 from repos + 20 from stars would exceed the joint cap.
        assert_eq!(score(&signal).dimension("portfolio"), PORTFOLIO_CAP);
    }
}
