// ABOUTME: Data fetch command for shimmer-cli
// ABOUTME: Builds a shim data request from arguments and prints the outcome as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use tracing::info;

use shimmer::models::{FetchOutcome, ShimDataRequest};
use shimmer::providers::registry::ShimRegistry;

use crate::helpers::display::print_json;

/// Arguments of the `fetch` command
pub struct FetchArgs {
    pub shim: String,
    pub user: String,
    pub data_type: String,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
    pub raw: bool,
    pub cursor: Option<String>,
}

impl FetchArgs {
    fn into_request(self) -> ShimDataRequest {
        let mut request =
            ShimDataRequest::new(self.shim, self.user, self.data_type).with_normalize(!self.raw);
        if let Some(start) = self.start {
            request = request.with_start(start);
        }
        if let Some(end) = self.end {
            request = request.with_end(end);
        }
        if let Some(cursor) = self.cursor {
            request = request.with_cursor(cursor);
        }
        request
    }
}

/// Fetch and print one page of data
pub async fn fetch(registry: &ShimRegistry, args: FetchArgs) -> Result<()> {
    let request = args.into_request();
    let outcome = registry.fetch(&request).await?;

    match &outcome {
        FetchOutcome::Data(response) => {
            if let Some(points) = response.data_points() {
                info!(points = points.len(), "normalized response");
            }
            if let Some(cursor) = &response.next_cursor {
                eprintln!("More data available; rerun with --cursor '{cursor}'");
            }
        }
        FetchOutcome::AuthorizationRequired(redirect) => {
            eprintln!(
                "User {} must authorize first: shimmer-cli authorize {} --user {}",
                redirect.user_key, redirect.shim, redirect.user_key
            );
        }
    }

    print_json(&outcome)
}
