// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Score computation and retrieval handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::warn;

use crate::{
    attestation,
    error::ApiError,
    models::{ComputeScoreRequest, Identity, ScoreResponse},
    score_cache::CachedScore,
    scoring::{self, assemble},
    state::AppState,
    storage::{ScoreRepository, StoredScore},
    webhooks::{ScoreSummary, SCORE_UPDATED_EVENT},
};

/// Attribute tags derived from the sources present at signing time.
fn verified_attributes(request: &ComputeScoreRequest) -> Vec<String> {
    let mut attributes = Vec::new();
    if request.on_chain.is_some() {
        attributes.push("onchain_activity".to_string());
    }
    if request.financial.is_some() {
        attributes.push("bank_account".to_string());
    }
    if request.developer.is_some() {
        attributes.push("developer_activity".to_string());
    }
    if request.secondary_wallet_count > 0 {
        attributes.push("multi_wallet".to_string());
    }
    attributes
}

/// Compute the score for an identity from its raw signals.
///
/// Returns the cached prior result when called again within the cache TTL,
/// so upstream source flakiness cannot flap the visible score. The caller
/// always gets either a complete `{score, attestation}` pair or a clear
/// rejection, never a partial result.
#[utoipa::path(
    post,
    path = "/v1/scores",
    request_body = ComputeScoreRequest,
    tag = "Scores",
    responses(
        (status = 200, description = "Computed score with attestation", body = ScoreResponse),
        (status = 400, description = "Malformed identity"),
        (status = 422, description = "No data sources connected")
    )
)]
pub async fn compute_score(
    State(state): State<AppState>,
    Json(request): Json<ComputeScoreRequest>,
) -> Result<Json<ScoreResponse>, ApiError> {
    if !request.identity.is_valid() {
        return Err(ApiError::bad_request("malformed identity"));
    }
    let identity = request.identity.0.clone();

    if let Some(cached) = state.cache.get(&identity) {
        return Ok(Json(ScoreResponse {
            identity: request.identity,
            score: cached.score,
            attestation: cached.attestation,
        }));
    }

    let on_chain = request.on_chain.as_ref().map(scoring::onchain::score);
    let financial = request.financial.as_ref().map(scoring::financial::score);
    let developer = request.developer.as_ref().map(scoring::developer::score);

    let assembled = assemble(
        on_chain,
        financial,
        developer,
        request.secondary_wallet_count,
    )?;

    let attestation = attestation::sign(&assembled, verified_attributes(&request), &state.signing);

    let record = StoredScore {
        identity: identity.clone(),
        score: assembled.clone(),
        attestation: attestation.clone(),
        updated_at: Utc::now(),
    };
    // The score is already computed; a persistence failure downgrades to a
    // warning rather than failing the request.
    if let Err(e) = ScoreRepository::new(&state.storage).put(&record) {
        warn!(identity = %identity, error = %e, "failed to persist score");
    }

    state.cache.put(
        &identity,
        CachedScore {
            score: assembled.clone(),
            attestation: attestation.clone(),
        },
    );

    // Fire-and-forget: a slow subscriber must not delay this response.
    let notifier = state.notifier.clone();
    let summary = ScoreSummary {
        score: assembled.total,
        tier: assembled.tier.to_string(),
        issued_at: attestation.issued_at,
    };
    let target = identity.clone();
    tokio::spawn(async move {
        notifier
            .dispatch(&target, SCORE_UPDATED_EVENT, &summary)
            .await;
    });

    Ok(Json(ScoreResponse {
        identity: request.identity,
        score: assembled,
        attestation,
    }))
}

/// Fetch the latest persisted score for an identity.
#[utoipa::path(
    get,
    path = "/v1/scores/{identity}",
    params(
        ("identity" = String, Path, description = "The scored identity")
    ),
    tag = "Scores",
    responses(
        (status = 200, body = StoredScore),
        (status = 404, description = "No score persisted for this identity")
    )
)]
pub async fn get_score(
    Path(identity): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StoredScore>, ApiError> {
    if !Identity(identity.clone()).is_valid() {
        return Err(ApiError::bad_request("malformed identity"));
    }
    let record = ScoreRepository::new(&state.storage).get(&identity)?;
    Ok(Json(record))
}
