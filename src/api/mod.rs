// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    attestation::{Attestation, VerificationOutcome},
    models::{
        ComputeScoreRequest, CreateSubscriptionRequest, Identity, ScoreResponse,
        SubscriptionResponse, VerifyAttestationRequest,
    },
    scoring::{
        AssembledScore, DeveloperSignal, FinancialSignal, OnChainSignal, ScoreComponents,
        ScoreTier, SubScore,
    },
    state::AppState,
    storage::{DeliveryRecord, StoredScore},
};

pub mod attestations;
pub mod health;
pub mod ratelimit_layer;
pub mod scores;
pub mod subscriptions;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/scores", post(scores::compute_score))
        .route("/scores/{identity}", get(scores::get_score))
        .route(
            "/attestations/verify",
            post(attestations::verify_attestation),
        )
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/{subscription_id}",
            axum::routing::delete(subscriptions::delete_subscription),
        )
        .route(
            "/subscriptions/{subscription_id}/test",
            post(subscriptions::test_subscription),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            ratelimit_layer::rate_limit_middleware,
        ))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        scores::compute_score,
        scores::get_score,
        attestations::verify_attestation,
        subscriptions::create_subscription,
        subscriptions::list_subscriptions,
        subscriptions::delete_subscription,
        subscriptions::test_subscription,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Identity,
            ComputeScoreRequest,
            ScoreResponse,
            OnChainSignal,
            DeveloperSignal,
            FinancialSignal,
            SubScore,
            AssembledScore,
            ScoreComponents,
            ScoreTier,
            Attestation,
            VerificationOutcome,
            VerifyAttestationRequest,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            DeliveryRecord,
            StoredScore
        )
    ),
    tags(
        (name = "Scores", description = "Score computation and retrieval"),
        (name = "Attestations", description = "Attestation verification"),
        (name = "Subscriptions", description = "Lender webhook subscriptions"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
