//! `disco status` — show configuration and credential status.
//!
//! The credential is reported as present or missing, never printed.

use anyhow::Result;
use colored::Colorize;

use disco_core::config::{get_config_path, load_config, CREDENTIAL_ENV};
use disco_providers::dedup_models;

pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🪩 Decision Disco Status".magenta().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".dimmed().to_string()
        }
    );

    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{} set {} to enable the relay", "✗".red(), CREDENTIAL_ENV)
    };
    println!("  {:<18} {}", "Credential:".bold(), key_status);
    println!("  {:<18} {}", "Upstream:".bold(), config.provider.completions_url());

    // Relay
    let relay = &config.relay;
    println!();
    println!("  {}", "Relay:".bold());
    println!(
        "    {:<16} http://{}:{}{}",
        "Listen:", relay.host, relay.port, relay.path
    );
    println!("    {:<16} {}", "Default model:", relay.default_model);
    println!(
        "    {:<16} {} | temp: {}",
        "Defaults:",
        format!("max_tokens: {}", relay.max_tokens).dimmed(),
        relay.temperature
    );
    if relay.fallback_models.is_empty() {
        println!("    {:<16} {}", "Fallbacks:", "· none (single attempt)".dimmed());
    } else {
        println!("    {:<16} {}", "Fallbacks:", relay.fallback_models.join(", "));
    }
    println!("    {:<16} {}s", "Timeout:", relay.timeout_secs);
    println!(
        "    {:<16} {}",
        "CORS:",
        if relay.cors { "on" } else { "off" }
    );
    if let Some(dir) = &relay.static_dir {
        println!("    {:<16} {}", "Static dir:", dir);
    }

    // Advisor
    let advisor = &config.advisor;
    println!();
    println!("  {}", "Advisor:".bold());
    println!("    {:<16} {}", "Relay URL:", advisor.relay_url);
    let models = dedup_models(&advisor.models);
    if models.is_empty() {
        println!("    {:<16} {}", "Models:", "· none configured".red());
    }
    for (i, model) in models.iter().enumerate() {
        let label = if i == 0 { "Models:" } else { "" };
        println!("    {:<16} {}. {}", label, i + 1, model);
    }
    println!(
        "    {:<16} {} attempt(s) per model, {}ms base backoff",
        "Retry:", advisor.retry.max_attempts, advisor.retry.base_delay_ms
    );
    println!("    {:<16} {}s per attempt", "Timeout:", advisor.timeout_secs);

    println!();

    Ok(())
}
