// ABOUTME: Helper modules for shimmer-cli
// ABOUTME: Argument parsing and output formatting utilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod args;
pub mod display;
