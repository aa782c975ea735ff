//! `disco serve` — run the relay.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tokio::net::TcpListener;

use disco_core::config::{get_config_path, load_config, CREDENTIAL_ENV};
use disco_relay::RelayState;

use crate::helpers;

pub async fn run(host: Option<String>, port: Option<u16>, static_dir: Option<String>) -> Result<()> {
    let mut config = load_config(None);
    if let Some(host) = host {
        config.relay.host = host;
    }
    if let Some(port) = port {
        config.relay.port = port;
    }
    if let Some(dir) = static_dir {
        config.relay.static_dir = Some(dir);
    }
    if let Some(dir) = &config.relay.static_dir {
        let expanded = helpers::expand_tilde(dir);
        if !expanded.is_dir() {
            bail!("static directory not found: {}", expanded.display());
        }
        config.relay.static_dir = Some(expanded.to_string_lossy().into_owned());
    }

    if !config.provider.is_configured() {
        bail!(
            "no provider credential configured: set {CREDENTIAL_ENV} or provider.apiKey in {}",
            get_config_path().display()
        );
    }

    let state = RelayState::from_config(&config).context("failed to build upstream client")?;

    let addr = format!("{}:{}", config.relay.host, config.relay.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    println!();
    println!("{}", "🪩 Decision Disco relay".magenta().bold());
    println!(
        "  {:<12} http://{}{}",
        "Endpoint:".bold(),
        listener.local_addr()?,
        config.relay.path
    );
    println!("  {:<12} {}", "Model:".bold(), config.relay.default_model);
    if !config.relay.fallback_models.is_empty() {
        println!(
            "  {:<12} {}",
            "Fallbacks:".bold(),
            config.relay.fallback_models.join(", ")
        );
    }
    println!();

    disco_relay::serve(listener, Arc::new(state)).await
}
