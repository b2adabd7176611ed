// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation signing and verification.
//!
//! An attestation is a time-bounded credential asserting a score and tier
//! without re-exposing the raw source data. The proof is an HMAC-SHA256
//! digest over a canonical byte encoding of exactly
//! `{total, tier, attributes, issued_at}`. Field order and the timestamp
//! format are fixed because verification re-derives the same bytes and
//! compares digests.
//!
//! Verification is a pure function of the stored fields and the server
//! secret: it never touches mutable state, and it reports expiry separately
//! from signature validity (a signature can be valid yet expired).

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use utoipa::ToSchema;

use crate::config::SigningConfig;
use crate::scoring::AssembledScore;

type HmacSha256 = Hmac<Sha256>;

/// Attestation schema version.
pub const ATTESTATION_VERSION: &str = "1";

/// Attestations expire exactly this many days after issuance.
pub const ATTESTATION_TTL_DAYS: i64 = 90;

/// A signed, time-bounded score credential. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Attestation {
    /// The attested total score.
    pub score: u32,
    /// The attested tier label.
    pub tier: String,
    /// Sorted, source-derived attribute tags (e.g. `bank_account`).
    pub verified_attributes: Vec<String>,
    /// `0x`-prefixed hex HMAC-SHA256 digest over the canonical bytes.
    pub proof: String,
    /// Issuance timestamp.
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp, exactly `issued_at` + 90 days.
    pub expires_at: DateTime<Utc>,
    /// Schema version.
    pub version: String,
}

/// Outcome of verifying stored attestation data. `expired` is computed
/// independently of `valid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationOutcome {
    pub valid: bool,
    pub expired: bool,
}

/// Canonical signing payload. Field order is the wire contract; do not
/// reorder.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    total: u32,
    tier: &'a str,
    attributes: &'a [String],
    issued_at: String,
}

fn canonical_bytes(
    total: u32,
    tier: &str,
    attributes: &[String],
    issued_at: DateTime<Utc>,
) -> Vec<u8> {
    let payload = CanonicalPayload {
        total,
        tier,
        attributes,
        issued_at: issued_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    };
    // Serialization of a plain struct with string/int fields cannot fail.
    serde_json::to_vec(&payload).unwrap_or_default()
}

fn compute_proof(
    total: u32,
    tier: &str,
    attributes: &[String],
    issued_at: DateTime<Utc>,
    config: &SigningConfig,
) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(config.secret_bytes())
        .expect("HMAC can take key of any size");
    mac.update(&canonical_bytes(total, tier, attributes, issued_at));
    mac.finalize().into_bytes().to_vec()
}

/// Sign an assembled score into an attestation.
///
/// `verified_attributes` are sorted before signing so the canonical bytes
/// do not depend on caller ordering.
pub fn sign(
    score: &AssembledScore,
    mut verified_attributes: Vec<String>,
    config: &SigningConfig,
) -> Attestation {
    verified_attributes.sort();

    let issued_at = Utc::now();
    let digest = compute_proof(
        score.total,
        score.tier.as_str(),
        &verified_attributes,
        issued_at,
        config,
    );

    Attestation {
        score: score.total,
        tier: score.tier.to_string(),
        verified_attributes,
        proof: format!("0x{}", hex::encode(digest)),
        issued_at,
        expires_at: issued_at + Duration::days(ATTESTATION_TTL_DAYS),
        version: ATTESTATION_VERSION.to_string(),
    }
}

/// Verify stored attestation data against the server secret.
///
/// Tolerates malformed input (bad hex, wrong digest length, unsorted
/// attributes) by reporting `valid: false`; it never panics or errors.
pub fn verify(attestation: &Attestation, config: &SigningConfig) -> VerificationOutcome {
    verify_at(attestation, config, Utc::now())
}

/// Verification with an explicit "now", for expiry tests.
pub fn verify_at(
    attestation: &Attestation,
    config: &SigningConfig,
    now: DateTime<Utc>,
) -> VerificationOutcome {
    let expired = now > attestation.issued_at + Duration::days(ATTESTATION_TTL_DAYS);

    let mut attributes = attestation.verified_attributes.clone();
    attributes.sort();

    let expected = compute_proof(
        attestation.score,
        &attestation.tier,
        &attributes,
        attestation.issued_at,
        config,
    );

    let valid = attestation
        .proof
        .strip_prefix("0x")
        .and_then(|h| hex::decode(h).ok())
        .map(|presented| constant_time_eq(&expected, &presented))
        .unwrap_or(false);

    VerificationOutcome { valid, expired }
}

/// Constant-time comparison of two digests.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{assemble, SubScore};
    use std::collections::BTreeMap;

    fn test_config() -> SigningConfig {
        SigningConfig::with_secret("unit-test-secret")
    }

    fn test_score(points: u32) -> AssembledScore {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("points".to_string(), points);
        assemble(
            Some(SubScore {
                points,
                breakdown,
            }),
            None,
            None,
            0,
        )
        .unwrap()
    }

    fn test_attributes() -> Vec<String> {
        vec!["onchain_activity".to_string(), "bank_account".to_string()]
    }

    #[test]
    fn round_trip_verifies_fresh() {
        let config = test_config();
        let attestation = sign(&test_score(250), test_attributes(), &config);

        let outcome = verify(&attestation, &config);
        assert!(outcome.valid);
        assert!(!outcome.expired);
    }

    #[test]
    fn attributes_are_sorted_at_signing() {
        let attestation = sign(&test_score(250), test_attributes(), &test_config());
        assert_eq!(
            attestation.verified_attributes,
            vec!["bank_account".to_string(), "onchain_activity".to_string()]
        );
    }

    #[test]
    fn mutated_score_invalidates_proof() {
        let config = test_config();
        let mut attestation = sign(&test_score(250), test_attributes(), &config);
        attestation.score += 1;
        assert!(!verify(&attestation, &config).valid);
    }

    #[test]
    fn mutated_tier_invalidates_proof() {
        let config = test_config();
        let mut attestation = sign(&test_score(250), test_attributes(), &config);
        attestation.tier = "elite".to_string();
        assert!(!verify(&attestation, &config).valid);
    }

    #[test]
    fn mutated_attributes_invalidate_proof() {
        let config = test_config();
        let mut attestation = sign(&test_score(250), test_attributes(), &config);
        attestation
            .verified_attributes
            .push("developer_activity".to_string());
        assert!(!verify(&attestation, &config).valid);
    }

    #[test]
    fn different_secret_invalidates_proof() {
        let attestation = sign(&test_score(250), test_attributes(), &test_config());
        let other = SigningConfig::with_secret("some-other-secret");
        assert!(!verify(&attestation, &other).valid);
    }

    #[test]
    fn malformed_proof_is_invalid_not_a_panic() {
        let config = test_config();
        let mut attestation = sign(&test_score(250), test_attributes(), &config);

        attestation.proof = "not-hex-at-all".to_string();
        assert!(!verify(&attestation, &config).valid);

        attestation.proof = "0xzzzz".to_string();
        assert!(!verify(&attestation, &config).valid);

        attestation.proof = "0xdead".to_string(); // wrong length
        assert!(!verify(&attestation, &config).valid);

        attestation.proof = String::new();
        assert!(!verify(&attestation, &config).valid);
    }

    #[test]
    fn expiry_is_reported_independently_of_validity() {
        let config = test_config();
        let attestation = sign(&test_score(250), test_attributes(), &config);

        // 91 days later: still a valid signature, but expired.
        let later = attestation.issued_at + Duration::days(91);
        let outcome = verify_at(&attestation, &config, later);
        assert!(outcome.valid);
        assert!(outcome.expired);

        // Just inside the window.
        let inside = attestation.issued_at + Duration::days(89);
        let outcome = verify_at(&attestation, &config, inside);
        assert!(outcome.valid);
        assert!(!outcome.expired);
    }

    #[test]
    fn expires_at_is_exactly_ninety_days_out() {
        let attestation = sign(&test_score(250), vec![], &test_config());
        assert_eq!(
            attestation.expires_at - attestation.issued_at,
            Duration::days(ATTESTATION_TTL_DAYS)
        );
    }

    #[test]
    fn proof_is_prefixed_hex() {
        let attestation = sign(&test_score(250), vec![], &test_config());
        assert!(attestation.proof.starts_with("0x"));
        // 32-byte SHA-256 digest as hex.
        assert_eq!(attestation.proof.len(), 2 + 64);
    }

    #[test]
    fn canonical_bytes_are_stable() {
        let issued = DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let attrs = vec!["a".to_string(), "b".to_string()];
        let bytes = canonical_bytes(512, "steady", &attrs, issued);
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"total":512,"tier":"steady","attributes":["a","b"],"issued_at":"2026-01-02T03:04:05Z"}"#
        );
    }
}
