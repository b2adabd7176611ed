// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webhook payload signing.
//!
//! Every delivery body is signed HMAC-SHA256 with the subscription's own
//! secret and presented as `sha256=<hex>` in the `X-Kite-Signature` header.
//! The per-subscription secret means a captured signature from one
//! subscriber can never validate another subscriber's payloads. The header
//! name and `sha256=` prefix are part of the wire contract existing
//! subscribers verify against.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Sign a raw delivery body, producing the signature header value.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verify a `sha256=<hex>` header value against a body and secret.
///
/// Constant-time comparison; malformed headers verify as false.
pub fn verify_payload(secret: &str, body: &[u8], header_value: &str) -> bool {
    let Some(presented_hex) = header_value.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(presented) = hex::decode(presented_hex) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    let expected = mac.finalize().into_bytes();

    constant_time_eq(&expected, &presented)
}

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
