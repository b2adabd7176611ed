// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Attestation verification handler.

use axum::{extract::State, Json};

use crate::{
    attestation::{self, VerificationOutcome},
    models::VerifyAttestationRequest,
    state::AppState,
};

/// Re-verify stored attestation data.
///
/// Pure check against the server secret: reports signature validity and
/// expiry independently. Malformed data verifies as invalid rather than
/// erroring.
#[utoipa::path(
    post,
    path = "/v1/attestations/verify",
    request_body = VerifyAttestationRequest,
    tag = "Attestations",
    responses((status = 200, body = VerificationOutcome))
)]
pub async fn verify_attestation(
    State(state): State<AppState>,
    Json(request): Json<VerifyAttestationRequest>,
) -> Json<VerificationOutcome> {
    Json(attestation::verify(&request.attestation, &state.signing))
}
