// ABOUTME: Token lifecycle integration tests through the shim interface
// ABOUTME: Shared refresh outcomes under concurrency, denial handling, authorization state, and disconnect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use serde_json::json;

use shimmer::errors::ShimError;
use shimmer::models::{FetchOutcome, ShimDataRequest};
use shimmer::providers::shim::ProviderShim;
use shimmer::providers::token::{InMemoryTokenStore, TokenState, TokenStore};

use common::{
    expired_credential, googlefit_key, googlefit_shim, init_test_logging, json_response,
    query_param, runkeeper_key, runkeeper_shim, StubHttpClient, TEST_TOKEN_URL,
};

fn empty_dataset() -> serde_json::Value {
    json!({"point": []})
}

fn request_for(user: &str) -> ShimDataRequest {
    ShimDataRequest::new("googlefit", user, "HEART_RATE")
        .with_start(DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap())
        .with_end(DateTime::parse_from_rfc3339("2024-01-02T00:00:00Z").unwrap())
}

fn refreshing_stub() -> StubHttpClient {
    StubHttpClient::new(|request| {
        if request.url == TEST_TOKEN_URL {
            let user_token = request.form_field("refresh_token").unwrap_or_default();
            json_response(
                200,
                &json!({
                    "access_token": format!("fresh-for-{user_token}"),
                    "token_type": "Bearer",
                    "expires_in": 3600
                }),
            )
        } else {
            json_response(200, &empty_dataset())
        }
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetches_share_one_refresh() {
    init_test_logging();
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::with_credential(
        googlefit_key("alice"),
        expired_credential(Some("alice-refresh")),
    ));
    let http = Arc::new(refreshing_stub().with_delay(Duration::from_millis(50)));
    let shim = Arc::new(googlefit_shim(store, http.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shim = Arc::clone(&shim);
            tokio::spawn(async move { shim.fetch(&request_for("alice")).await })
        })
        .collect();
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.data().is_some());
    }

    assert_eq!(http.token_calls(), 1);
    assert_eq!(http.data_calls(), 8);
    for request in http.requests().iter().filter(|r| r.url != TEST_TOKEN_URL) {
        assert_eq!(
            request.header("Authorization"),
            Some("Bearer fresh-for-alice-refresh")
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_refreshes_for_different_users_are_independent() {
    let store = Arc::new(InMemoryTokenStore::new());
    store
        .save(&googlefit_key("alice"), &expired_credential(Some("a")))
        .await
        .unwrap();
    store
        .save(&googlefit_key("bob"), &expired_credential(Some("b")))
        .await
        .unwrap();
    let http = Arc::new(refreshing_stub().with_delay(Duration::from_millis(20)));
    let shim = Arc::new(googlefit_shim(store.clone(), http.clone()));

    let alice = {
        let shim = Arc::clone(&shim);
        tokio::spawn(async move { shim.tokens().ensure_valid_token("alice").await })
    };
    let bob = {
        let shim = Arc::clone(&shim);
        tokio::spawn(async move { shim.tokens().ensure_valid_token("bob").await })
    };

    assert_eq!(alice.await.unwrap().unwrap().access_token, "fresh-for-a");
    assert_eq!(bob.await.unwrap().unwrap().access_token, "fresh-for-b");
    assert_eq!(http.token_calls(), 2);
}

#[tokio::test]
async fn test_denied_refresh_requires_new_authorization() {
    init_test_logging();
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::with_credential(
        googlefit_key("alice"),
        expired_credential(Some("revoked")),
    ));
    let http = Arc::new(StubHttpClient::new(|request| {
        if request.url == TEST_TOKEN_URL {
            match request.form_field("grant_type") {
                Some("authorization_code") => json_response(
                    200,
                    &json!({"access_token": "new-access", "refresh_token": "new-refresh", "expires_in": 3600}),
                ),
                _ => json_response(400, &json!({"error": "invalid_grant"})),
            }
        } else {
            json_response(200, &empty_dataset())
        }
    }));
    let shim = googlefit_shim(Arc::clone(&store), http.clone());

    let outcome = shim.fetch(&request_for("alice")).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::AuthorizationRequired(_)));
    assert_eq!(shim.token_state("alice"), TokenState::Denied);
    assert_eq!(http.token_calls(), 1);

    // Denial is terminal: no further refresh attempts
    let outcome = shim.fetch(&request_for("alice")).await.unwrap();
    let FetchOutcome::AuthorizationRequired(redirect) = outcome else {
        panic!("expected an authorization redirect");
    };
    assert_eq!(http.token_calls(), 1);

    // A completed authorization recovers
    let state = query_param(&redirect.authorization_url, "state").unwrap();
    shim.complete_authorization("alice", "auth-code", &state)
        .await
        .unwrap();
    assert_eq!(shim.token_state("alice"), TokenState::Valid);

    let exchange = &http.requests()[1];
    assert_eq!(exchange.form_field("code"), Some("auth-code"));
    assert_eq!(
        exchange.form_field("redirect_uri"),
        Some("http://localhost:8083/callback")
    );

    let outcome = shim.fetch(&request_for("alice")).await.unwrap();
    assert!(outcome.data().is_some());
    assert_eq!(
        store
            .load(&googlefit_key("alice"))
            .await
            .unwrap()
            .unwrap()
            .refresh_token
            .as_deref(),
        Some("new-refresh")
    );
}

#[tokio::test]
async fn test_server_error_during_refresh_is_not_a_denial() {
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::with_credential(
        googlefit_key("alice"),
        expired_credential(Some("refresh")),
    ));
    let http = Arc::new(StubHttpClient::new(|_| {
        json_response(503, &json!({"error": "unavailable"}))
    }));
    let shim = googlefit_shim(store, http.clone());

    let err = shim.fetch(&request_for("alice")).await.unwrap_err();
    assert!(matches!(err, ShimError::TokenRefreshFailed { .. }));
    assert_eq!(shim.token_state("alice"), TokenState::Expired);
    assert_eq!(http.data_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetches_share_one_failed_refresh() {
    init_test_logging();
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::with_credential(
        googlefit_key("alice"),
        expired_credential(Some("alice-refresh")),
    ));
    let http = Arc::new(
        StubHttpClient::new(|_| json_response(503, &json!({"error": "unavailable"})))
            .with_delay(Duration::from_millis(50)),
    );
    let shim = Arc::new(googlefit_shim(store, http.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shim = Arc::clone(&shim);
            tokio::spawn(async move { shim.fetch(&request_for("alice")).await })
        })
        .collect();
    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ShimError::TokenRefreshFailed { .. }));
    }

    assert_eq!(http.token_calls(), 1);
    assert_eq!(http.data_calls(), 0);
    assert_eq!(shim.token_state("alice"), TokenState::Expired);

    // The next caller starts a new refresh rather than replaying the failure
    let err = shim.fetch(&request_for("alice")).await.unwrap_err();
    assert!(matches!(err, ShimError::TokenRefreshFailed { .. }));
    assert_eq!(http.token_calls(), 2);
}

#[tokio::test]
async fn test_repeated_prompts_keep_the_first_state_valid() {
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let http = Arc::new(StubHttpClient::new(|request| {
        if request.url == TEST_TOKEN_URL {
            json_response(
                200,
                &json!({"access_token": "new-access", "refresh_token": "new-refresh", "expires_in": 3600}),
            )
        } else {
            json_response(200, &empty_dataset())
        }
    }));
    let shim = googlefit_shim(Arc::clone(&store), http.clone());

    let FetchOutcome::AuthorizationRequired(first) =
        shim.fetch(&request_for("alice")).await.unwrap()
    else {
        panic!("expected an authorization redirect");
    };
    let FetchOutcome::AuthorizationRequired(second) =
        shim.fetch(&request_for("alice")).await.unwrap()
    else {
        panic!("expected an authorization redirect");
    };
    let state = query_param(&first.authorization_url, "state").unwrap();
    assert_eq!(
        query_param(&second.authorization_url, "state"),
        Some(state.clone())
    );

    shim.complete_authorization("alice", "auth-code", &state)
        .await
        .unwrap();
    assert_eq!(shim.token_state("alice"), TokenState::Valid);
    assert_eq!(http.token_calls(), 1);

    let outcome = shim.fetch(&request_for("alice")).await.unwrap();
    assert!(outcome.data().is_some());
}

#[tokio::test]
async fn test_callback_with_unknown_state_is_rejected() {
    let http = Arc::new(StubHttpClient::unreachable());
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let shim = runkeeper_shim(store, http.clone());

    shim.begin_authorization("alice").unwrap();
    let err = shim
        .complete_authorization("alice", "code", "forged-state")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ShimError::AuthorizationStateMismatch {
            provider: "runkeeper".to_owned()
        }
    );
    assert_eq!(http.calls(), 0);
}

#[tokio::test]
async fn test_runkeeper_code_exchange_uses_basic_auth() {
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::new());
    let http = Arc::new(StubHttpClient::new(|_| {
        json_response(200, &json!({"access_token": "rk-access", "token_type": "Bearer"}))
    }));
    let shim = runkeeper_shim(Arc::clone(&store), http.clone());

    let redirect = shim.begin_authorization("alice").unwrap();
    let state = query_param(&redirect.authorization_url, "state").unwrap();
    shim.complete_authorization("alice", "rk-code", &state)
        .await
        .unwrap();

    let exchange = &http.requests()[0];
    assert!(exchange
        .header("Authorization")
        .unwrap()
        .starts_with("Basic "));
    assert_eq!(exchange.form_field("client_secret"), None);

    // RunKeeper tokens carry no expiry and stay valid
    let stored = store.load(&runkeeper_key("alice")).await.unwrap().unwrap();
    assert_eq!(stored.expires_at, None);
    assert!(!stored.is_expired());
}

#[tokio::test]
async fn test_disconnect_forgets_credential() {
    let store: Arc<dyn TokenStore> = Arc::new(InMemoryTokenStore::with_credential(
        googlefit_key("alice"),
        common::valid_credential(),
    ));
    let http = Arc::new(StubHttpClient::new(|_| json_response(200, &empty_dataset())));
    let shim = googlefit_shim(Arc::clone(&store), http);

    shim.fetch(&request_for("alice")).await.unwrap();
    assert_eq!(shim.token_state("alice"), TokenState::Valid);

    shim.disconnect("alice").await.unwrap();
    assert_eq!(shim.token_state("alice"), TokenState::NoToken);
    assert!(store.load(&googlefit_key("alice")).await.unwrap().is_none());

    let outcome = shim.fetch(&request_for("alice")).await.unwrap();
    assert!(matches!(outcome, FetchOutcome::AuthorizationRequired(_)));
}
