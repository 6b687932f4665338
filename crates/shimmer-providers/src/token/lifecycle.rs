// ABOUTME: OAuth2 token state machine for one shim across all of its users
// ABOUTME: Serialized refresh per user, refresh-token preservation, denial handling, and code exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Token Lifecycle
//!
//! Each `(shim, user)` pair moves through
//! `NoToken -> AwaitingUserAuthorization -> Valid -> Expired -> Refreshing -> Valid | Denied`.
//!
//! Refreshes for one user are serialized by a per-user async mutex. The refresh itself
//! runs on a spawned task that owns the guard, so a caller dropping its future does not
//! abort a refresh half way between the token endpoint and the store. Callers arriving
//! while a refresh is in flight subscribe to its outcome instead of starting another,
//! so a failed refresh is reported to every waiter without a second token request.
//!
//! An authorization state stays pending until a callback consumes it or the user is
//! revoked; repeated consent URLs for the same user carry the same state.

use chrono::{Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shimmer_core::constants::time::DEFAULT_TOKEN_EXPIRY_SECONDS;
use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::{AccessCredential, AuthorizationRedirect, CredentialKey};

use super::enhancer::{RequestEnhancer, TokenGrant};
use super::settings::{OAuth2ClientSettings, OAuthEndpoints};
use super::store::TokenStore;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};

/// OAuth2 error codes that mean the grant itself was rejected
const DENIAL_ERROR_CODES: &[&str] = &["invalid_grant", "unauthorized_client", "access_denied"];

/// Observable state of one `(shim, user)` credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenState {
    /// Nothing stored and no authorization in progress
    NoToken,
    /// Consent URL issued; waiting for the callback
    AwaitingUserAuthorization,
    /// Credential present and unexpired
    Valid,
    /// Credential present but past its expiry
    Expired,
    /// Refresh grant in flight
    Refreshing,
    /// Provider rejected the refresh grant; only a new authorization recovers
    Denied,
}

/// Outcome slot of an in-flight refresh; `None` until the refresh finishes
type RefreshOutcome = watch::Receiver<Option<ShimResult<AccessCredential>>>;

/// Token endpoint response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

/// OAuth2 error body (`{"error": "...", "error_description": "..."}`)
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}

/// Token lifecycle for every user of one shim
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct TokenLifecycle {
    provider: &'static str,
    client: Arc<OAuth2ClientSettings>,
    endpoints: Arc<OAuthEndpoints>,
    store: Arc<dyn TokenStore>,
    http: Arc<dyn HttpClient>,
    enhancer: Arc<dyn RequestEnhancer>,
    states: Arc<DashMap<String, TokenState>>,
    pending_states: Arc<DashMap<String, String>>,
    refresh_guards: Arc<DashMap<String, Arc<Mutex<()>>>>,
    in_flight: Arc<DashMap<String, RefreshOutcome>>,
}

impl TokenLifecycle {
    /// Create a lifecycle for `provider`
    #[must_use]
    pub fn new(
        provider: &'static str,
        client: OAuth2ClientSettings,
        endpoints: OAuthEndpoints,
        store: Arc<dyn TokenStore>,
        http: Arc<dyn HttpClient>,
        enhancer: Arc<dyn RequestEnhancer>,
    ) -> Self {
        Self {
            provider,
            client: Arc::new(client),
            endpoints: Arc::new(endpoints),
            store,
            http,
            enhancer,
            states: Arc::new(DashMap::new()),
            pending_states: Arc::new(DashMap::new()),
            refresh_guards: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Shim key this lifecycle serves
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Provider endpoints
    #[must_use]
    pub fn endpoints(&self) -> &OAuthEndpoints {
        &self.endpoints
    }

    /// Current state for `user_key`
    #[must_use]
    pub fn state(&self, user_key: &str) -> TokenState {
        self.states
            .get(user_key)
            .map_or(TokenState::NoToken, |entry| *entry.value())
    }

    /// Return a usable access credential, refreshing it if expired
    ///
    /// # Errors
    ///
    /// - `ReauthorizationRequired` when nothing is stored, the credential cannot be
    ///   refreshed, or the provider denied the refresh
    /// - `TokenRefreshFailed` on transport or protocol failure during refresh
    /// - `TokenStore` if the store fails
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub async fn ensure_valid_token(&self, user_key: &str) -> ShimResult<AccessCredential> {
        if self.state(user_key) == TokenState::Denied {
            debug!("credential previously denied; authorization required");
            return Err(self.reauthorization_required(user_key));
        }

        let Some(credential) = self.store.load(&self.key(user_key)).await? else {
            self.set_state(user_key, TokenState::AwaitingUserAuthorization);
            return Err(self.reauthorization_required(user_key));
        };

        if !credential.is_expired() {
            self.set_state(user_key, TokenState::Valid);
            return Ok(credential);
        }

        self.set_state(user_key, TokenState::Expired);
        if !credential.can_refresh() {
            info!("expired credential has no refresh token; authorization required");
            return Err(self.reauthorization_required(user_key));
        }

        self.spawn_refresh(user_key).await
    }

    /// Start an authorization and return the consent redirect
    ///
    /// Reuses the user's outstanding state when one is pending.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the authorization endpoint is invalid
    pub fn begin_authorization(&self, user_key: &str) -> ShimResult<AuthorizationRedirect> {
        let authorization_url = self.issue_authorization_url(user_key)?;
        if self.state(user_key) != TokenState::Denied {
            self.set_state(user_key, TokenState::AwaitingUserAuthorization);
        }
        Ok(AuthorizationRedirect {
            shim: self.provider.to_owned(),
            user_key: user_key.to_owned(),
            authorization_url,
        })
    }

    /// Exchange the authorization `code` returned to the redirect URI
    ///
    /// # Errors
    ///
    /// - `AuthorizationStateMismatch` if `state` was not issued for `user_key`
    /// - `TokenExchangeFailed` if the provider rejects the code or cannot be reached
    /// - `TokenStore` if the credential cannot be persisted
    #[instrument(skip(self, code, state), fields(provider = %self.provider))]
    pub async fn complete_authorization(
        &self,
        user_key: &str,
        code: &str,
        state: &str,
    ) -> ShimResult<AccessCredential> {
        if self
            .pending_states
            .remove_if(user_key, |_, pending| pending == state)
            .is_none()
        {
            warn!("authorization callback state does not match a pending request");
            return Err(ShimError::AuthorizationStateMismatch {
                provider: self.provider.to_owned(),
            });
        }

        let guard = self.guard_for(user_key);
        let result = {
            let _locked = guard.lock().await;
            self.exchange_code(user_key, code).await
        };
        drop(guard);
        self.release_guard(user_key);
        result
    }

    /// Exchange with the per-user guard held
    async fn exchange_code(&self, user_key: &str, code: &str) -> ShimResult<AccessCredential> {
        let request = self.token_request(
            TokenGrant::AuthorizationCode,
            vec![("code".to_owned(), code.to_owned())],
        );
        let exchange_failed = |reason: String| ShimError::TokenExchangeFailed {
            provider: self.provider.to_owned(),
            reason,
        };

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| exchange_failed(e.to_string()))?;
        if !response.is_success() {
            return Err(exchange_failed(format!(
                "token endpoint returned {}: {}",
                response.status, response.body
            )));
        }
        let credential = parse_credential(&response).map_err(exchange_failed)?;

        self.store.save(&self.key(user_key), &credential).await?;
        self.set_state(user_key, TokenState::Valid);
        info!("authorization completed");
        Ok(credential)
    }

    /// Forget the stored credential and any pending authorization for `user_key`
    ///
    /// # Errors
    ///
    /// Returns `TokenStore` if the credential cannot be removed
    pub async fn revoke_local(&self, user_key: &str) -> ShimResult<()> {
        self.store.remove(&self.key(user_key)).await?;
        self.pending_states.remove(user_key);
        self.states.remove(user_key);
        self.release_guard(user_key);
        info!(provider = %self.provider, "local credential removed");
        Ok(())
    }

    /// Build the `ReauthorizationRequired` error carrying the consent URL
    fn reauthorization_required(&self, user_key: &str) -> ShimError {
        match self.issue_authorization_url(user_key) {
            Ok(authorization_url) => ShimError::ReauthorizationRequired {
                provider: self.provider.to_owned(),
                authorization_url,
            },
            Err(e) => e,
        }
    }

    fn issue_authorization_url(&self, user_key: &str) -> ShimResult<String> {
        let state = self
            .pending_states
            .entry(user_key.to_owned())
            .or_insert_with(|| Uuid::new_v4().simple().to_string())
            .value()
            .clone();
        self.endpoints.authorization_url_for(&self.client, &state)
    }

    /// Join the user's in-flight refresh, or start one and wait for it
    async fn spawn_refresh(&self, user_key: &str) -> ShimResult<AccessCredential> {
        let (mut outcome, sender) = match self.in_flight.entry(user_key.to_owned()) {
            Entry::Occupied(entry) => (entry.get().clone(), None),
            Entry::Vacant(entry) => {
                let (sender, receiver) = watch::channel(None);
                entry.insert(receiver.clone());
                (receiver, Some(sender))
            }
        };

        if let Some(sender) = sender {
            let guard = self.guard_for(user_key);
            let lifecycle = self.clone();
            let user = user_key.to_owned();
            let slot = outcome.clone();

            tokio::spawn(async move {
                let locked = guard.lock_owned().await;
                let result = lifecycle.refresh_locked(&user).await;
                drop(locked);
                lifecycle
                    .in_flight
                    .remove_if(&user, |_, pending| pending.same_channel(&slot));
                lifecycle.release_guard(&user);
                sender.send_replace(Some(result));
            });
        } else {
            debug!(provider = %self.provider, "joining in-flight refresh");
        }

        let shared = outcome
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|result| (*result).clone());
        shared.unwrap_or_else(|| {
            self.in_flight
                .remove_if(user_key, |_, pending| pending.same_channel(&outcome));
            Err(self.refresh_failed("refresh task ended without a result".to_owned()))
        })
    }

    /// Refresh with the per-user guard held
    async fn refresh_locked(&self, user_key: &str) -> ShimResult<AccessCredential> {
        if self.state(user_key) == TokenState::Denied {
            return Err(self.reauthorization_required(user_key));
        }

        let key = self.key(user_key);
        let Some(current) = self.store.load(&key).await? else {
            self.set_state(user_key, TokenState::AwaitingUserAuthorization);
            return Err(self.reauthorization_required(user_key));
        };

        if !current.is_expired() {
            debug!(provider = %self.provider, "credential refreshed by a concurrent caller");
            self.set_state(user_key, TokenState::Valid);
            return Ok(current);
        }

        let Some(refresh_token) = current.refresh_token.as_deref().filter(|t| !t.is_empty())
        else {
            return Err(self.reauthorization_required(user_key));
        };

        self.set_state(user_key, TokenState::Refreshing);
        info!(provider = %self.provider, "refreshing expired access token");

        let request = self.token_request(
            TokenGrant::RefreshToken,
            vec![("refresh_token".to_owned(), refresh_token.to_owned())],
        );

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                self.set_state(user_key, TokenState::Expired);
                warn!(provider = %self.provider, error = %e, "token refresh transport failure");
                return Err(self.refresh_failed(e.to_string()));
            }
        };

        if is_authorization_denial(&response) {
            self.set_state(user_key, TokenState::Denied);
            warn!(provider = %self.provider, status = response.status, "refresh grant denied");
            return Err(self.reauthorization_required(user_key));
        }

        if !response.is_success() {
            self.set_state(user_key, TokenState::Expired);
            return Err(self.refresh_failed(format!(
                "token endpoint returned {}: {}",
                response.status, response.body
            )));
        }

        let refreshed = match parse_credential(&response) {
            Ok(credential) => credential.preserving_refresh_token(Some(refresh_token)),
            Err(reason) => {
                self.set_state(user_key, TokenState::Expired);
                return Err(self.refresh_failed(reason));
            }
        };

        if let Err(e) = self.store.save(&key, &refreshed).await {
            self.set_state(user_key, TokenState::Expired);
            return Err(e);
        }

        self.set_state(user_key, TokenState::Valid);
        Ok(refreshed)
    }

    fn token_request(&self, grant: TokenGrant, fields: Vec<(String, String)>) -> HttpRequest {
        let mut form = vec![("grant_type".to_owned(), grant.grant_type().to_owned())];
        form.extend(fields);
        let mut request = HttpRequest::post_form(self.endpoints.token_url.as_str(), form)
            .with_header("Accept", "application/json");
        self.enhancer.enhance(&mut request, grant, &self.client);
        request
    }

    fn refresh_failed(&self, reason: String) -> ShimError {
        ShimError::TokenRefreshFailed {
            provider: self.provider.to_owned(),
            reason,
        }
    }

    fn guard_for(&self, user_key: &str) -> Arc<Mutex<()>> {
        self.refresh_guards
            .entry(user_key.to_owned())
            .or_default()
            .value()
            .clone()
    }

    /// Drop the user's guard once nothing holds or awaits it
    fn release_guard(&self, user_key: &str) {
        self.refresh_guards
            .remove_if(user_key, |_, guard| Arc::strong_count(guard) == 1);
    }

    fn key(&self, user_key: &str) -> CredentialKey {
        CredentialKey::new(self.provider, user_key)
    }

    fn set_state(&self, user_key: &str, state: TokenState) {
        self.states.insert(user_key.to_owned(), state);
    }
}

/// 401 or an OAuth2 grant rejection in a 400 body
fn is_authorization_denial(response: &HttpResponse) -> bool {
    match response.status {
        401 => true,
        400 => serde_json::from_str::<TokenErrorResponse>(&response.body)
            .is_ok_and(|body| DENIAL_ERROR_CODES.contains(&body.error.as_str())),
        _ => false,
    }
}

fn parse_credential(response: &HttpResponse) -> Result<AccessCredential, String> {
    let parsed: TokenResponse = serde_json::from_str(&response.body)
        .map_err(|e| format!("unreadable token response: {e}"))?;

    let expires_at = parsed.expires_in.map(|seconds| {
        let seconds = if seconds > 0 {
            seconds
        } else {
            DEFAULT_TOKEN_EXPIRY_SECONDS
        };
        Utc::now() + Duration::seconds(seconds)
    });

    Ok(AccessCredential {
        access_token: parsed.access_token,
        token_type: parsed.token_type,
        refresh_token: parsed.refresh_token,
        expires_at,
        scope: parsed.scope,
    })
}
