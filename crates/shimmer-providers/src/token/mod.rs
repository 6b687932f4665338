// ABOUTME: OAuth2 token management for shims
// ABOUTME: Settings, token store contract, request enhancers, and the per-user lifecycle
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Provider-specific token request hooks
pub mod enhancer;
/// Token state machine with serialized refresh
pub mod lifecycle;
/// Client registration and provider endpoints
pub mod settings;
/// Credential persistence contract
pub mod store;

pub use enhancer::{BasicAuthEnhancer, FormCredentialsEnhancer, RequestEnhancer, TokenGrant};
pub use lifecycle::{TokenLifecycle, TokenState};
pub use settings::{OAuth2ClientSettings, OAuthEndpoints};
pub use store::{InMemoryTokenStore, TokenStore};
