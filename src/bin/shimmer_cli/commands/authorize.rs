// ABOUTME: Authorization commands for shimmer-cli
// ABOUTME: Interactive consent flow, stored credential status, and local disconnect
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::{bail, Result};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::info;

use shimmer::models::CredentialKey;
use shimmer::providers::registry::ShimRegistry;
use shimmer::providers::token::TokenStore;

use crate::helpers::args::parse_callback_url;
use crate::helpers::display::display_credential;

/// Run the consent flow for `user`
///
/// The pending state lives in this process, so the callback URL is read from
/// stdin instead of a separate command invocation.
pub async fn authorize(registry: &ShimRegistry, shim_key: &str, user: &str) -> Result<()> {
    let shim = registry.resolve(shim_key)?;
    let redirect = shim.begin_authorization(user)?;

    println!("\nOpen this URL in a browser and approve access to {}:", shim.label());
    println!("{}", "=".repeat(80));
    println!("{}", redirect.authorization_url);
    println!("{}", "=".repeat(80));
    println!("\nAfter approving, paste the full URL you were redirected to and press Enter:");

    let mut line = String::new();
    let read = BufReader::new(stdin()).read_line(&mut line).await?;
    if read == 0 {
        bail!("no callback URL provided");
    }
    let params = parse_callback_url(&line)?;

    shim.complete_authorization(user, &params.code, &params.state)
        .await?;
    info!(shim = shim_key, "authorization stored");
    println!("\nSuccess: {} is authorized for user {user}", shim.label());
    Ok(())
}

/// Show the stored credential for `user`
pub async fn status(
    registry: &ShimRegistry,
    store: &dyn TokenStore,
    shim_key: &str,
    user: &str,
) -> Result<()> {
    let shim = registry.resolve(shim_key)?;
    let credential = store
        .load(&CredentialKey::new(shim.shim_key(), user))
        .await?;
    display_credential(shim.shim_key(), user, credential.as_ref());
    Ok(())
}

/// Forget the stored credential for `user`
pub async fn disconnect(registry: &ShimRegistry, shim_key: &str, user: &str) -> Result<()> {
    let shim = registry.resolve(shim_key)?;
    shim.disconnect(user).await?;
    println!("Removed stored {} credential for user {user}", shim.label());
    Ok(())
}
