// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-caller rate-limit middleware.
//!
//! The caller key is the `X-Api-Key` header when present, otherwise the
//! client IP (`x-forwarded-for`, then `x-real-ip`, then the socket
//! address). The request path is folded into the key so each endpoint has
//! its own window. Responses carry the usual `X-RateLimit-*` headers.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::warn;

use crate::ratelimit::RateDecision;
use crate::state::AppState;

/// Extract the client IP, handling reverse proxies.
fn client_ip(headers: &HeaderMap, addr: Option<&SocketAddr>) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.trim().to_string();
        }
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Build the rate-guard key for a request: caller id + endpoint.
fn caller_key(headers: &HeaderMap, addr: Option<&SocketAddr>, path: &str) -> String {
    let caller = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(|key| format!("key:{key}"))
        .unwrap_or_else(|| format!("ip:{}", client_ip(headers, addr)));
    format!("{caller}:{path}")
}

fn apply_rate_headers(response: &mut Response, limit: u32, decision: &RateDecision) {
    let reset_in = (decision.reset_at - Utc::now()).num_seconds().max(0) as u64;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(reset_in));
}

/// Rate limiting middleware for the versioned API routes.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let path = request.uri().path().to_string();
    let key = caller_key(request.headers(), addr.as_ref(), &path);

    let settings = state.rate_settings;
    let decision = state
        .rate_guard
        .allow(&key, settings.limit, settings.window)
        .await;

    if !decision.allowed {
        warn!(key = %key, path = %path, "rate limit exceeded");

        let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
        apply_rate_headers(&mut response, settings.limit, &decision);
        let reset_in = (decision.reset_at - Utc::now()).num_seconds().max(0) as u64;
        response
            .headers_mut()
            .insert("Retry-After", HeaderValue::from(reset_in));
        return Err(response);
    }

    let mut response = next.run(request).await;
    apply_rate_headers(&mut response, settings.limit, &decision);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_header_wins_over_socket() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1, 172.16.0.1".parse().unwrap());
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(&addr)), "10.0.0.1");
    }

    #[test]
    fn real_ip_header_is_second_choice() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        let addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(&addr)), "10.0.0.2");
    }

    #[test]
    fn socket_address_is_fallback() {
        let headers = HeaderMap::new();
        let addr: SocketAddr = "192.168.1.5:9999".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(&addr)), "192.168.1.5");
        assert_eq!(client_ip(&headers, None), "unknown");
    }

    #[test]
    fn api_key_callers_are_keyed_by_key_and_endpoint() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "lender-key-1".parse().unwrap());

        let key = caller_key(&headers, None, "/v1/scores");
        assert_eq!(key, "key:lender-key-1:/v1/scores");

        // Same key, different endpoint: separate window.
        let other = caller_key(&headers, None, "/v1/subscriptions");
        assert_ne!(key, other);
    }

    #[test]
    fn anonymous_callers_are_keyed_by_ip() {
        let headers = HeaderMap::new();
        let addr: SocketAddr = "192.168.1.5:9999".parse().unwrap();
        let key = caller_key(&headers, Some(&addr), "/v1/scores");
        assert_eq!(key, "ip:192.168.1.5:/v1/scores");
    }
}
