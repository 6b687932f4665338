// ABOUTME: Shim identifiers and default OAuth scopes per provider
// ABOUTME: Keys are the caller-facing names used to resolve shims in the registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Google Fit shim key
pub const GOOGLE_FIT: &str = "googlefit";

/// RunKeeper shim key
pub const RUNKEEPER: &str = "runkeeper";

/// All shim keys known to this build
pub const ALL_SHIMS: &[&str] = &[GOOGLE_FIT, RUNKEEPER];

/// Default Google Fit scopes (space separated in the authorization URL)
pub const GOOGLE_FIT_DEFAULT_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/fitness.activity.read",
    "https://www.googleapis.com/auth/fitness.body.read",
    "https://www.googleapis.com/auth/fitness.location.read",
];

/// Default RunKeeper scopes
pub const RUNKEEPER_DEFAULT_SCOPES: &[&str] =
    &["application/vnd.com.runkeeper.FitnessActivityFeed+json"];
