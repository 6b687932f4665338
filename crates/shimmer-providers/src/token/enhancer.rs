// ABOUTME: Provider-specific hooks applied to every token endpoint request
// ABOUTME: Client authentication via form fields or HTTP Basic, plus redirect_uri on code exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::settings::OAuth2ClientSettings;
use crate::http_client::HttpRequest;

/// Grant carried by a token request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenGrant {
    /// Exchanging an authorization code after user consent
    AuthorizationCode,
    /// Exchanging a refresh token for a new access token
    RefreshToken,
}

impl TokenGrant {
    /// Value of the `grant_type` form field
    #[must_use]
    pub const fn grant_type(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Capability hook invoked before every token request
pub trait RequestEnhancer: Send + Sync {
    /// Add provider-required fields or headers to `request`
    fn enhance(&self, request: &mut HttpRequest, grant: TokenGrant, client: &OAuth2ClientSettings);
}

/// Client credentials in the form body (Google style)
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCredentialsEnhancer;

impl RequestEnhancer for FormCredentialsEnhancer {
    fn enhance(&self, request: &mut HttpRequest, grant: TokenGrant, client: &OAuth2ClientSettings) {
        request.set_form_field("client_id", client.client_id.as_str());
        request.set_form_field("client_secret", client.client_secret.as_str());
        if grant == TokenGrant::AuthorizationCode {
            request.set_form_field("redirect_uri", client.redirect_uri.as_str());
        }
    }
}

/// Client credentials in an HTTP Basic `Authorization` header
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicAuthEnhancer;

impl RequestEnhancer for BasicAuthEnhancer {
    fn enhance(&self, request: &mut HttpRequest, grant: TokenGrant, client: &OAuth2ClientSettings) {
        let encoded = STANDARD.encode(format!("{}:{}", client.client_id, client.client_secret));
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        request
            .headers
            .push(("Authorization".to_owned(), format!("Basic {encoded}")));
        if grant == TokenGrant::AuthorizationCode {
            request.set_form_field("redirect_uri", client.redirect_uri.as_str());
        }
    }
}
