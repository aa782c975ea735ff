//! Shared CLI helpers — path expansion, verdict printing, banner.

use std::path::PathBuf;

use colored::Colorize;

use disco_core::Verdict;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print the banner shown before the quiz.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🪩 Decision Disco".magenta().bold(), version.dimmed());
    println!("{}", "Answer honestly. Ctrl-C to quit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder while the advisor runs.
pub fn print_thinking() {
    eprint!("{}", "⠿ Consulting the oracle...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Print a verdict as coloured terminal text.
pub fn print_verdict(verdict: &Verdict, model: &str) {
    println!();
    println!("  {}", verdict.score.magenta().bold());
    println!();
    println!("  {}", verdict.advice);
    println!();

    println!("  {}", "Pros".green().bold());
    print_list(&verdict.pros, "+".green().to_string());
    println!();
    println!("  {}", "Cons/Risks".red().bold());
    print_list(&verdict.cons, "-".red().to_string());
    println!();
    println!("  {}", format!("via {model}").dimmed());
    println!();
}

fn print_list(items: &[String], bullet: String) {
    if items.is_empty() {
        println!("    {}", "(none)".dimmed());
    }
    for item in items {
        println!("    {bullet} {item}");
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
