// ABOUTME: Common capability interface for provider shims and the generic OAuth2 orchestrator
// ABOUTME: Validates keys, resolves windows, obtains tokens, queries the provider, and normalizes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use shimmer_core::errors::{ShimError, ShimResult};
use shimmer_core::models::{
    AuthorizationRedirect, FetchOutcome, ShimDataRequest, ShimDataResponse, TimeWindow,
};

use crate::catalog::{DataTypeCatalog, ShimDataType};
use crate::http_client::HttpClient;
use crate::mapper::DataPointMapper;
use crate::request::RequestBuilder;
use crate::token::{TokenLifecycle, TokenState};

/// Capability interface every shim exposes to the registry and its callers
#[async_trait]
pub trait ProviderShim: Send + Sync {
    /// Registry key (e.g. "googlefit")
    fn shim_key(&self) -> &'static str;

    /// Human-readable provider name
    fn label(&self) -> &'static str;

    /// Provider consent endpoint
    fn authorization_url(&self) -> &str;

    /// Provider token endpoint
    fn token_url(&self) -> &str;

    /// Supported data type keys, in catalog order
    fn data_types(&self) -> Vec<&'static str>;

    /// Fetch one data type for one user
    ///
    /// # Errors
    ///
    /// - `InvalidDataTypeKey` / `InvalidTimeWindow` before any token or network call
    /// - `TokenRefreshFailed` / `TokenStore` from the token lifecycle
    /// - `UpstreamRequestFailed` / `Transport` / `MalformedPayload` from the data call
    async fn fetch(&self, request: &ShimDataRequest) -> ShimResult<FetchOutcome>;

    /// Start an authorization for `user_key`
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the consent URL cannot be built
    fn begin_authorization(&self, user_key: &str) -> ShimResult<AuthorizationRedirect>;

    /// Finish an authorization with the code and state returned to the redirect URI
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationStateMismatch`, `TokenExchangeFailed`, or `TokenStore`
    async fn complete_authorization(&self, user_key: &str, code: &str, state: &str)
        -> ShimResult<()>;

    /// Drop the stored credential for `user_key`
    ///
    /// # Errors
    ///
    /// Returns `TokenStore` if the credential cannot be removed
    async fn disconnect(&self, user_key: &str) -> ShimResult<()>;

    /// Current token state for `user_key`
    fn token_state(&self, user_key: &str) -> TokenState;
}

/// Provider-specific half of a shim: catalog, query building, and mapper selection
pub trait ShimAdapter: RequestBuilder + 'static {
    /// Closed data type enum of this provider
    type DataType: ShimDataType;

    /// Registry key
    const KEY: &'static str;

    /// Human-readable provider name
    const LABEL: &'static str;

    /// Mapper for `data_type`; total over the catalog
    fn mapper_for(&self, data_type: Self::DataType) -> Box<dyn DataPointMapper>;

    /// Cursor for the next page, if the provider reported one
    fn next_cursor(&self, _payload: &Value) -> Option<String> {
        None
    }
}

/// Shim built from an adapter, a token lifecycle, and an HTTP client
pub struct OAuth2Shim<A: ShimAdapter> {
    adapter: A,
    catalog: DataTypeCatalog<A::DataType>,
    tokens: TokenLifecycle,
    http: Arc<dyn HttpClient>,
}

impl<A: ShimAdapter> OAuth2Shim<A> {
    /// Assemble a shim
    #[must_use]
    pub fn new(adapter: A, tokens: TokenLifecycle, http: Arc<dyn HttpClient>) -> Self {
        Self {
            adapter,
            catalog: DataTypeCatalog::new(A::KEY),
            tokens,
            http,
        }
    }

    /// Provider adapter
    #[must_use]
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Token lifecycle
    #[must_use]
    pub const fn tokens(&self) -> &TokenLifecycle {
        &self.tokens
    }

    fn upstream_failed(status: u16, body: String) -> ShimError {
        ShimError::UpstreamRequestFailed {
            provider: A::KEY.to_owned(),
            status,
            body,
        }
    }
}

#[async_trait]
impl<A: ShimAdapter> ProviderShim for OAuth2Shim<A> {
    fn shim_key(&self) -> &'static str {
        A::KEY
    }

    fn label(&self) -> &'static str {
        A::LABEL
    }

    fn authorization_url(&self) -> &str {
        &self.tokens.endpoints().authorization_url
    }

    fn token_url(&self) -> &str {
        &self.tokens.endpoints().token_url
    }

    fn data_types(&self) -> Vec<&'static str> {
        self.catalog.keys()
    }

    #[instrument(
        skip(self, request),
        fields(
            provider = A::KEY,
            data_type = ?request.data_type_key,
            user = %request.user_key,
            normalize = request.normalize,
        )
    )]
    async fn fetch(&self, request: &ShimDataRequest) -> ShimResult<FetchOutcome> {
        let data_type = self.catalog.resolve(request.data_type_key.as_deref())?;
        let window = TimeWindow::for_request(request)?;
        let query = self.adapter.build_query(
            data_type.stream_id(),
            &window,
            request.pagination_cursor.as_deref(),
        )?;

        let credential = match self.tokens.ensure_valid_token(&request.user_key).await {
            Ok(credential) => credential,
            Err(ShimError::ReauthorizationRequired {
                authorization_url, ..
            }) => {
                debug!("user must authorize before data can be fetched");
                return Ok(FetchOutcome::AuthorizationRequired(AuthorizationRedirect {
                    shim: A::KEY.to_owned(),
                    user_key: request.user_key.clone(),
                    authorization_url,
                }));
            }
            Err(e) => return Err(e),
        };

        debug!(url = %query.url, "querying provider");
        let response = self
            .http
            .execute(query.into_request(credential.authorization_header()))
            .await
            .map_err(|e| ShimError::Transport {
                provider: A::KEY.to_owned(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            error!(status = response.status, "provider data request failed");
            return Err(Self::upstream_failed(response.status, response.body));
        }

        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|e| ShimError::malformed(A::KEY, format!("response is not JSON: {e}")))?;
        let next_cursor = self.adapter.next_cursor(&payload);

        let body = if request.normalize {
            let mapped = self.adapter.mapper_for(data_type).map(&payload)?;
            debug!(
                points = mapped.len(),
                skipped = mapped.skipped,
                "normalized provider payload"
            );
            ShimDataResponse::normalized(A::KEY, mapped)
        } else {
            ShimDataResponse::raw(A::KEY, payload)
        };

        Ok(FetchOutcome::Data(body.with_next_cursor(next_cursor)))
    }

    fn begin_authorization(&self, user_key: &str) -> ShimResult<AuthorizationRedirect> {
        self.tokens.begin_authorization(user_key)
    }

    async fn complete_authorization(
        &self,
        user_key: &str,
        code: &str,
        state: &str,
    ) -> ShimResult<()> {
        self.tokens
            .complete_authorization(user_key, code, state)
            .await
            .map(|_| ())
    }

    async fn disconnect(&self, user_key: &str) -> ShimResult<()> {
        self.tokens.revoke_local(user_key).await
    }

    fn token_state(&self, user_key: &str) -> TokenState {
        self.tokens.state(user_key)
    }
}
