// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Webhook subscription management handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::ApiError,
    models::{CreateSubscriptionRequest, SubscriptionResponse},
    state::AppState,
    storage::{DeliveryRecord, SubscriptionRepository},
    webhooks::WebhookSubscription,
};

#[derive(Deserialize, IntoParams)]
pub struct SubscriberQuery {
    pub subscriber_id: String,
}

/// Register a webhook subscription. The endpoint must be HTTPS and the
/// event names must come from the known event set.
#[utoipa::path(
    post,
    path = "/v1/subscriptions",
    request_body = CreateSubscriptionRequest,
    tag = "Subscriptions",
    responses(
        (status = 201, body = SubscriptionResponse),
        (status = 400, description = "Invalid URL or event set")
    )
)]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    if !request.target_identity.is_valid() {
        return Err(ApiError::bad_request("malformed target identity"));
    }

    let subscription = WebhookSubscription::new(
        request.subscriber_id,
        request.target_identity.0,
        request.url,
        request.secret,
        request.subscribed_events,
    )?;

    SubscriptionRepository::new(&state.storage).create(&subscription)?;

    Ok((StatusCode::CREATED, Json(subscription.into())))
}

/// List a subscriber's subscriptions. `failure_count` and `active` are the
/// only visibility a subscriber gets into circuit-breaker state.
#[utoipa::path(
    get,
    path = "/v1/subscriptions",
    params(SubscriberQuery),
    tag = "Subscriptions",
    responses((status = 200, body = [SubscriptionResponse]))
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<SubscriberQuery>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriptions =
        SubscriptionRepository::new(&state.storage).list_by_subscriber(&params.subscriber_id)?;
    Ok(Json(
        subscriptions.into_iter().map(Into::into).collect(),
    ))
}

/// Remove a subscription.
#[utoipa::path(
    delete,
    path = "/v1/subscriptions/{subscription_id}",
    params(
        ("subscription_id" = String, Path, description = "Identifier of the subscription to delete")
    ),
    tag = "Subscriptions",
    responses((status = 204))
)]
pub async fn delete_subscription(
    Path(subscription_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    SubscriptionRepository::new(&state.storage).delete(&subscription_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Send a synthetic probe delivery to a subscription.
///
/// The probe is logged like any real delivery but never counts toward the
/// circuit breaker, so operators can test an endpoint without risking
/// disabling it.
#[utoipa::path(
    post,
    path = "/v1/subscriptions/{subscription_id}/test",
    params(
        ("subscription_id" = String, Path, description = "Identifier of the subscription to probe")
    ),
    tag = "Subscriptions",
    responses(
        (status = 200, body = DeliveryRecord),
        (status = 404, description = "Unknown subscription")
    )
)]
pub async fn test_subscription(
    Path(subscription_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeliveryRecord>, ApiError> {
    let record = state.notifier.dispatch_test(&subscription_id).await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonStore, StoragePaths};
    use crate::webhooks::SCORE_UPDATED_EVENT;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AppState) {
        let temp = TempDir::new().unwrap();
        let mut storage = JsonStore::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        (temp, AppState::for_tests(storage))
    }

    fn create_request(url: &str) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            subscriber_id: "lender-1".to_string(),
            target_identity: "0xabc".into(),
            url: url.to_string(),
            secret: "s3cret".to_string(),
            subscribed_events: vec![SCORE_UPDATED_EVENT.to_string()],
        }
    }

    #[tokio::test]
    async fn create_and_list_round_trips() {
        let (_temp, state) = setup();

        let (status, Json(created)) = create_subscription(
            State(state.clone()),
            Json(create_request("https://lender.example.com/hooks")),
        )
        .await
        .expect("subscription creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert!(created.active);
        assert_eq!(created.failure_count, 0);

        let Json(listed) = list_subscriptions(
            State(state),
            Query(SubscriberQuery {
                subscriber_id: "lender-1".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn http_url_is_rejected() {
        let (_temp, state) = setup();

        let err = create_subscription(
            State(state),
            Json(create_request("http://insecure.example.com/hooks")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_removes_subscription() {
        let (_temp, state) = setup();

        let (_, Json(created)) = create_subscription(
            State(state.clone()),
            Json(create_request("https://lender.example.com/hooks")),
        )
        .await
        .unwrap();

        let status = delete_subscription(Path(created.id.clone()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = delete_subscription(Path(created.id), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delivery_of_unknown_subscription_404s() {
        let (_temp, state) = setup();
        let err = test_subscription(Path("missing".to_string()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
