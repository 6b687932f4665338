// ABOUTME: Core types and constants for the Shimmer provider-adapter subsystem
// ABOUTME: Foundation crate with error handling, data models, and provider constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Shimmer Core
//!
//! Foundation crate shared by every shim. It changes infrequently so the
//! provider crate and the binary can compile incrementally on top of it.
//!
//! ## Modules
//!
//! - **errors**: `ShimError` taxonomy and the `ErrorCode` to HTTP status mapping
//! - **models**: request, time window, credential, data point, and response types
//! - **constants**: shim keys, default scopes, and time conversion constants

/// Unified error handling with standard error codes
pub mod errors;

/// Shim identifiers, scopes, and time constants
pub mod constants;

/// Request, credential, and normalized measurement models
pub mod models;
