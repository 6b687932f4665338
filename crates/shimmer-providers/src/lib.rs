// ABOUTME: Provider adapter shims for Google Fit and RunKeeper
// ABOUTME: Shim contract, OAuth2 token lifecycle, request builders, mappers, and the shim registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Provider adapter ("shim") implementations and their shared machinery.
//!
//! A shim turns "data type D for window [start, end)" into the provider's native
//! query, keeps the user's OAuth2 credential usable, and maps the provider payload
//! to normalized data points. New providers plug in by implementing
//! [`shim::ShimAdapter`] and registering an [`shim::OAuth2Shim`] with the
//! [`registry::ShimRegistry`].

pub use shimmer_core::constants;
pub use shimmer_core::errors;
pub use shimmer_core::models;

/// Closed data type catalogs
pub mod catalog;
/// Injected HTTP transport
pub mod http_client;
/// Payload normalization contract
pub mod mapper;
/// Shim key to shim resolution
pub mod registry;
/// Provider query building and paging policy
pub mod request;
/// Shim capability interface and generic OAuth2 orchestrator
pub mod shim;
/// OAuth2 token lifecycle, stores, and enhancers
pub mod token;

/// Google Fit shim
#[cfg(feature = "shim-googlefit")]
pub mod googlefit;
/// RunKeeper shim
#[cfg(feature = "shim-runkeeper")]
pub mod runkeeper;

pub use catalog::{DataTypeCatalog, ShimDataType};
pub use http_client::{
    initialize_shared_client, shared_client, HttpClient, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient, TransportError,
};
pub use mapper::{DataPointMapper, RecordError, RecordMapper};
pub use registry::{global_registry, init_global_registry, ShimInfo, ShimRegistry};
pub use request::{DataQuery, PagingPolicy, RequestBuilder};
pub use shim::{OAuth2Shim, ProviderShim, ShimAdapter};
pub use token::{
    BasicAuthEnhancer, FormCredentialsEnhancer, InMemoryTokenStore, OAuth2ClientSettings,
    OAuthEndpoints, RequestEnhancer, TokenGrant, TokenLifecycle, TokenState, TokenStore,
};
