// ABOUTME: Command modules for shimmer-cli
// ABOUTME: Shim listing, authorization flow, and data fetching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod authorize;
pub mod fetch;
pub mod shims;
