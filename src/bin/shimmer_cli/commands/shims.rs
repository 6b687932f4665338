// ABOUTME: Shim listing command for shimmer-cli
// ABOUTME: Prints registered shim keys, labels, and supported data type keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use shimmer::providers::registry::ShimRegistry;

use crate::helpers::display::display_shims;

/// List every registered shim
pub fn list(registry: &ShimRegistry) {
    display_shims(&registry.describe());
}
