// ABOUTME: Environment-driven configuration tests for shim credentials, timeouts, and logging
// ABOUTME: Mutates process environment variables, so every test runs serially
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use serial_test::serial;

use shimmer::config::{ShimmerConfig, DEFAULT_BASE_URL};
use shimmer::errors::ShimError;
use shimmer::logging::{LogFormat, LoggingConfig};
use shimmer::providers::googlefit;

const SHIMMER_VARS: &[&str] = &[
    "SHIMMER_BASE_URL",
    "SHIMMER_ENABLED_SHIMS",
    "SHIMMER_HTTP_TIMEOUT_SECS",
    "SHIMMER_HTTP_CONNECT_TIMEOUT_SECS",
    "SHIMMER_GOOGLEFIT_CLIENT_ID",
    "SHIMMER_GOOGLEFIT_CLIENT_SECRET",
    "SHIMMER_GOOGLEFIT_REDIRECT_URI",
    "SHIMMER_GOOGLEFIT_SCOPES",
    "SHIMMER_GOOGLEFIT_TOKEN_URL",
    "SHIMMER_RUNKEEPER_CLIENT_ID",
    "SHIMMER_RUNKEEPER_CLIENT_SECRET",
    "SHIMMER_RUNKEEPER_PAGE_SIZE",
    "SHIMMER_RUNKEEPER_API_BASE_URL",
    "ENVIRONMENT",
    "LOG_FORMAT",
];

/// Removes every variable these tests touch, on creation and on drop
struct CleanEnv;

impl CleanEnv {
    fn new() -> Self {
        clear();
        Self
    }
}

impl Drop for CleanEnv {
    fn drop(&mut self) {
        clear();
    }
}

fn clear() {
    for name in SHIMMER_VARS {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_empty_environment_enables_nothing() {
    let _env = CleanEnv::new();

    let config = ShimmerConfig::from_env().unwrap();
    assert!(config.enabled_shims().is_empty());
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.http.connect_timeout_secs, 10);
    assert_eq!(
        config.googlefit.redirect_uri,
        format!("{DEFAULT_BASE_URL}/authorize/googlefit/callback")
    );
}

#[test]
#[serial]
fn test_credentials_enable_a_shim() {
    let _env = CleanEnv::new();
    env::set_var("SHIMMER_GOOGLEFIT_CLIENT_ID", "gf-client");
    env::set_var("SHIMMER_GOOGLEFIT_CLIENT_SECRET", "gf-secret");
    env::set_var("SHIMMER_GOOGLEFIT_SCOPES", "scope.a, scope.b scope.c");
    env::set_var("SHIMMER_BASE_URL", "https://shim.example.org/");

    let config = ShimmerConfig::from_env().unwrap();
    assert_eq!(config.enabled_shims(), vec!["googlefit"]);
    assert_eq!(config.googlefit.scopes, vec!["scope.a", "scope.b", "scope.c"]);
    assert_eq!(
        config.googlefit.redirect_uri,
        "https://shim.example.org/authorize/googlefit/callback"
    );

    let settings = config.googlefit.client_settings().unwrap();
    assert_eq!(settings.client_id, "gf-client");
    assert!(config.validate_and_log());
}

#[test]
#[serial]
fn test_secret_is_not_serialized() {
    let _env = CleanEnv::new();
    env::set_var("SHIMMER_RUNKEEPER_CLIENT_ID", "rk-client");
    env::set_var("SHIMMER_RUNKEEPER_CLIENT_SECRET", "rk-very-secret");

    let config = ShimmerConfig::from_env().unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("rk-client"));
    assert!(!json.contains("rk-very-secret"));
    assert_eq!(config.runkeeper.secret_fingerprint().unwrap().len(), 8);
}

#[test]
#[serial]
fn test_endpoint_and_paging_overrides() {
    let _env = CleanEnv::new();
    env::set_var("SHIMMER_GOOGLEFIT_TOKEN_URL", "http://127.0.0.1:9000/token");
    env::set_var("SHIMMER_RUNKEEPER_PAGE_SIZE", "50");
    env::set_var("SHIMMER_RUNKEEPER_API_BASE_URL", "http://127.0.0.1:9001");

    let config = ShimmerConfig::from_env().unwrap();
    let endpoints = config.googlefit.endpoints(googlefit::endpoints());
    assert_eq!(endpoints.token_url, "http://127.0.0.1:9000/token");
    assert_eq!(config.runkeeper.page_size, Some(50));
    assert_eq!(
        config.runkeeper.api_base_url.as_deref(),
        Some("http://127.0.0.1:9001")
    );
}

#[test]
#[serial]
fn test_invalid_values_are_configuration_errors() {
    let _env = CleanEnv::new();
    env::set_var("SHIMMER_RUNKEEPER_PAGE_SIZE", "lots");
    let err = ShimmerConfig::from_env().unwrap_err();
    assert!(matches!(err, ShimError::Configuration { .. }));

    env::remove_var("SHIMMER_RUNKEEPER_PAGE_SIZE");
    env::set_var("SHIMMER_HTTP_TIMEOUT_SECS", "-5");
    assert!(ShimmerConfig::from_env().is_err());

    env::remove_var("SHIMMER_HTTP_TIMEOUT_SECS");
    env::set_var("SHIMMER_ENABLED_SHIMS", "googlefit,moves");
    assert!(ShimmerConfig::from_env().is_err());
}

#[test]
#[serial]
fn test_enabled_shim_without_credentials_cannot_build_settings() {
    let _env = CleanEnv::new();
    env::set_var("SHIMMER_ENABLED_SHIMS", "runkeeper");

    let config = ShimmerConfig::from_env().unwrap();
    assert_eq!(config.enabled_shims(), vec!["runkeeper"]);
    assert!(!config.validate_and_log());
    assert!(config.runkeeper.client_settings().is_err());
}

#[test]
#[serial]
fn test_logging_config_from_environment() {
    let _env = CleanEnv::new();
    env::set_var("ENVIRONMENT", "production");
    env::set_var("LOG_FORMAT", "json");

    let config = LoggingConfig::from_env();
    assert_eq!(config.format, LogFormat::Json);
    assert!(config.include_location);
    assert!(config.include_spans);
    assert_eq!(config.environment, "production");
}
