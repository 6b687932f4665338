// ABOUTME: Time conversion and token expiry constants
// ABOUTME: Shared by window resolution and credential validity checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Days subtracted from / added to today when a window bound is omitted
pub const DEFAULT_WINDOW_PADDING_DAYS: i64 = 1;

/// A credential expiring within this many seconds is treated as expired
pub const TOKEN_EXPIRY_SKEW_SECONDS: i64 = 60;

/// Lifetime assumed when a token response has an unusable `expires_in`
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 3600;
