// ABOUTME: Output formatting helpers for shimmer-cli
// ABOUTME: JSON output on stdout and human-readable shim and credential summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use serde::Serialize;

use shimmer::models::AccessCredential;
use shimmer::providers::registry::ShimInfo;

use super::args::format_instant;

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display the registered shims
pub fn display_shims(shims: &[ShimInfo]) {
    if shims.is_empty() {
        println!("No shims registered. Set SHIMMER_<SHIM>_CLIENT_ID and SHIMMER_<SHIM>_CLIENT_SECRET.");
        return;
    }

    println!("{:<12} {:<12} DATA TYPES", "SHIM", "LABEL");
    println!("{}", "=".repeat(80));
    for shim in shims {
        println!("{:<12} {:<12} {}", shim.key, shim.label, shim.data_types.join(", "));
    }
}

/// Display the stored credential for a user without revealing tokens
pub fn display_credential(shim: &str, user: &str, credential: Option<&AccessCredential>) {
    println!("Shim: {shim}");
    println!("User: {user}");

    let Some(credential) = credential else {
        println!("State: no credential stored (run `shimmer-cli authorize {shim} --user {user}`)");
        return;
    };

    let state = if credential.is_expired() {
        if credential.can_refresh() {
            "expired (will refresh on next fetch)"
        } else {
            "expired (authorization required)"
        }
    } else {
        "valid"
    };
    println!("State: {state}");
    println!("Token type: {}", credential.token_type);
    match credential.expires_at {
        Some(expires_at) => println!("Expires: {}", format_instant(&expires_at)),
        None => println!("Expires: Never"),
    }
    println!(
        "Refresh token: {}",
        if credential.can_refresh() { "present" } else { "absent" }
    );
    if let Some(scope) = &credential.scope {
        println!("Scope: {scope}");
    }
}
