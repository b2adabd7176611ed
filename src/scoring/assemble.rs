// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Score assembly: combines available sub-scores into a 0–1000 total with a
//! discrete tier.
//!
//! Normalization is proportional over the sources that are actually
//! present: `total = floor(sum(points) / sum(max) * 1000)`, so an identity
//! with only a developer profile is scored against the developer maximum
//! alone. Absent sources never penalize. A bounded bonus rewards verified
//! secondary wallets beyond the primary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{SubScore, DEVELOPER_MAX, FINANCIAL_MAX, ONCHAIN_MAX};

/// Points awarded per verified secondary wallet beyond the primary.
pub const SECONDARY_WALLET_BONUS: u32 = 10;

/// Cap on the total secondary-wallet bonus.
pub const SECONDARY_WALLET_BONUS_CAP: u32 = 50;

/// Highest assembled total.
pub const TOTAL_MAX: u32 = 1000;

/// Discrete score tier, a step function of the final combined total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Building,
    Steady,
    Strong,
    Elite,
}

impl ScoreTier {
    /// Tier thresholds: Building < 400 <= Steady < 600 <= Strong < 800 <= Elite.
    pub fn for_total(total: u32) -> Self {
        match total {
            0..=399 => ScoreTier::Building,
            400..=599 => ScoreTier::Steady,
            600..=799 => ScoreTier::Strong,
            _ => ScoreTier::Elite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::Building => "building",
            ScoreTier::Steady => "steady",
            ScoreTier::Strong => "strong",
            ScoreTier::Elite => "elite",
        }
    }
}

impl std::fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source sub-scores that went into an assembled total. `None` means
/// the source was not connected (or its fetch failed upstream).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_chain: Option<SubScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial: Option<SubScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<SubScore>,
}

/// The assembled, tiered score for one identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AssembledScore {
    /// Combined total on the 0–1000 scale, bonus included.
    pub total: u32,
    /// Tier derived from `total`.
    pub tier: ScoreTier,
    /// The sub-scores that were present at assembly time.
    pub components: ScoreComponents,
    /// Secondary-wallet bonus included in `total`.
    pub bonus: u32,
    /// When this score was computed.
    pub computed_at: DateTime<Utc>,
}

/// Assembly errors. Having no connected sources is the only failure mode;
/// it must reach the caller rather than be silently scored as zero.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("no data sources connected for this identity")]
    NoSourcesConnected,
}

/// Combine available sub-scores into an [`AssembledScore`].
///
/// `secondary_wallet_count` is the number of verified wallets beyond the
/// primary; each adds [`SECONDARY_WALLET_BONUS`] points up to the cap.
pub fn assemble(
    on_chain: Option<SubScore>,
    financial: Option<SubScore>,
    developer: Option<SubScore>,
    secondary_wallet_count: u32,
) -> Result<AssembledScore, ScoreError> {
    let mut points: u32 = 0;
    let mut max: u32 = 0;

    if let Some(ref sub) = on_chain {
        points += sub.points;
        max += ONCHAIN_MAX;
    }
    if let Some(ref sub) = financial {
        points += sub.points;
        max += FINANCIAL_MAX;
    }
    if let Some(ref sub) = developer {
        points += sub.points;
        max += DEVELOPER_MAX;
    }

    if max == 0 {
        return Err(ScoreError::NoSourcesConnected);
    }

    let normalized = (points as f64 / max as f64 * TOTAL_MAX as f64).floor() as u32;
    let bonus = SECONDARY_WALLET_BONUS
        .saturating_mul(secondary_wallet_count)
        .min(SECONDARY_WALLET_BONUS_CAP);
    let total = (normalized + bonus).min(TOTAL_MAX);

    Ok(AssembledScore {
        total,
        tier: ScoreTier::for_total(total),
        components: ScoreComponents {
            on_chain,
            financial,
            developer,
        },
        bonus,
        computed_at: Utc::now(),
    })
}
