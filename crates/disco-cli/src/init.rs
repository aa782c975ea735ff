//! `disco init` — write a default config file.

use anyhow::{Context, Result};
use colored::Colorize;

use disco_core::config::{get_config_path, save_config, Config, CREDENTIAL_ENV};

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🪩 Decision Disco — Setup".magenta().bold());
    println!();

    let config_path = get_config_path();
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        // Defaults only: never copy a key from the environment into the file.
        save_config(&Config::default(), Some(&config_path))
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "  Next: export {} and run {}",
        CREDENTIAL_ENV.bold(),
        "disco serve".cyan()
    );
    println!();

    Ok(())
}
