//! Decision Disco CLI — entry point.
//!
//! # Commands
//!
//! - `disco serve [--host HOST] [--port PORT]` — run the relay
//! - `disco ask [-c CATEGORY] [-q QUESTION] [-a ANSWER]...` — take the quiz
//! - `disco status` — show configuration and credential status
//! - `disco init` — write a default config file

mod ask;
mod helpers;
mod init;
mod serve;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🪩 Decision Disco — a four-question quiz with an AI verdict
#[derive(Parser)]
#[command(name = "disco", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay (holds the provider key, forwards chat requests)
    Serve {
        /// Bind address (overrides relay.host)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides relay.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory of static files to serve alongside the relay
        #[arg(long)]
        static_dir: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Take the quiz and get a verdict
    Ask {
        /// Category: relationship, career, financial, life, daily
        #[arg(short, long)]
        category: Option<String>,

        /// The dilemma, in your own words
        #[arg(short, long)]
        question: Option<String>,

        /// Answer to the next question (repeat for each, in order)
        #[arg(short, long = "answer")]
        answers: Vec<String>,

        /// Relay endpoint (overrides advisor.relayUrl)
        #[arg(long)]
        relay: Option<String>,

        /// Print the verdict as HTML instead of coloured text
        #[arg(long, default_value_t = false)]
        html: bool,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and credential status
    Status,

    /// Write a default config file
    Init,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            static_dir,
            logs,
        } => {
            init_logging(logs);
            serve::run(host, port, static_dir).await
        }
        Commands::Ask {
            category,
            question,
            answers,
            relay,
            html,
            logs,
        } => {
            init_logging(logs);
            let args = ask::AskArgs {
                category,
                question,
                answers,
                relay,
                html,
            };
            ask::run(args).await
        }
        Commands::Status => status::run(),
        Commands::Init => init::run(),
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("disco=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
