//! `disco ask` — the terminal quiz.
//!
//! Anything not given on the command line is asked for interactively with
//! `rustyline`. Once every question has an answer the advisor is run against
//! the configured relay.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use disco_advisor::{render_failure, render_verdict, Advisor, AdvisorSettings};
use disco_core::config::load_config;
use disco_core::{Category, CoreError, DilemmaContext};
use disco_providers::HttpTransport;

use crate::helpers;

pub struct AskArgs {
    pub category: Option<String>,
    pub question: Option<String>,
    pub answers: Vec<String>,
    pub relay: Option<String>,
    pub html: bool,
}

pub async fn run(args: AskArgs) -> Result<()> {
    let config = load_config(None);
    let relay_url = args
        .relay
        .clone()
        .unwrap_or_else(|| config.advisor.relay_url.clone());

    let ctx = collect(&args)?;

    let transport = HttpTransport::new(
        relay_url,
        None,
        &HashMap::new(),
        config.advisor.timeout(),
    )
    .context("failed to build HTTP client")?;
    let advisor = Advisor::new(Arc::new(transport), AdvisorSettings::from(&config.advisor));

    if !args.html {
        helpers::print_thinking();
    }
    let result = advisor.advise(&ctx).await;
    if !args.html {
        helpers::clear_thinking();
    }

    match result {
        Ok(advice) => {
            if args.html {
                let rendered = render_verdict(&advice.verdict);
                println!("{}", rendered.summary_html);
                println!("{}", rendered.pros_cons_html);
            } else {
                helpers::print_verdict(&advice.verdict, &advice.model);
            }
            Ok(())
        }
        Err(err) => {
            debug!(detail = %err.detail(), "advisor failed");
            if args.html {
                println!("{}", render_failure(&err));
            } else {
                eprintln!("\n{} {}\n", "✗".red().bold(), err.user_message());
            }
            Err(err.into())
        }
    }
}

/// Build a completed session from arguments plus interactive prompts.
fn collect(args: &AskArgs) -> Result<DilemmaContext> {
    // Only opened once something actually needs asking.
    let mut editor: Option<DefaultEditor> = None;

    let category = match &args.category {
        Some(raw) => parse_category_choice(raw)?,
        None => ask_category(editor_mut(&mut editor)?)?,
    };

    let question = match &args.question {
        Some(q) => q.clone(),
        None => ask_until_valid(editor_mut(&mut editor)?, "What's your dilemma? ")?,
    };
    let mut ctx = DilemmaContext::new(category, question)?;

    for answer in &args.answers {
        ctx.record_answer(answer.as_str())?;
    }

    while let Some(question) = ctx.next_question() {
        let editor = editor_mut(&mut editor)?;
        println!(
            "{} {}",
            format!("[{}/{}]", ctx.questions_asked() + 1, ctx.question_count()).dimmed(),
            question.bold()
        );
        let answer = ask_until_valid(editor, "> ")?;
        ctx.record_answer(answer)?;
    }

    Ok(ctx)
}

fn editor_mut(editor: &mut Option<DefaultEditor>) -> Result<&mut DefaultEditor> {
    if editor.is_none() {
        helpers::print_banner();
        *editor = Some(DefaultEditor::new()?);
    }
    editor.as_mut().context("line editor unavailable")
}

fn ask_category(editor: &mut DefaultEditor) -> Result<Category> {
    println!("{}", "Pick a category:".bold());
    for (i, category) in Category::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, category);
    }
    loop {
        let line = read_line(editor, "Category: ")?;
        match parse_category_choice(&line) {
            Ok(category) => return Ok(category),
            Err(e) => eprintln!("{}", e.to_string().yellow()),
        }
    }
}

/// Keep prompting until the user types something non-blank.
fn ask_until_valid(editor: &mut DefaultEditor, prompt: &str) -> Result<String> {
    loop {
        let line = read_line(editor, prompt)?;
        if !line.trim().is_empty() {
            return Ok(line);
        }
        eprintln!("{}", "Please type something!".yellow());
    }
}

fn read_line(editor: &mut DefaultEditor, prompt: &str) -> Result<String> {
    match editor.readline(prompt) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => bail!("quiz cancelled"),
        Err(e) => Err(e.into()),
    }
}

/// Accept a menu number (`1`-`5`) or a category name.
fn parse_category_choice(input: &str) -> Result<Category, CoreError> {
    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| Category::ALL.get(i).copied())
            .ok_or_else(|| CoreError::UnknownCategory(trimmed.to_string()));
    }
    trimmed.parse()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args(answers: &[&str]) -> AskArgs {
        AskArgs {
            category: Some("career".to_string()),
            question: Some("Should I quit?".to_string()),
            answers: answers.iter().map(|a| a.to_string()).collect(),
            relay: None,
            html: false,
        }
    }

    #[test]
    fn test_parse_category_by_number_and_name() {
        assert_eq!(parse_category_choice("1").unwrap(), Category::ALL[0]);
        assert_eq!(parse_category_choice(" 5 ").unwrap(), Category::ALL[4]);
        assert_eq!(parse_category_choice("Daily").unwrap(), Category::Daily);
        assert!(parse_category_choice("0").is_err());
        assert!(parse_category_choice("6").is_err());
        assert!(parse_category_choice("hobbies").is_err());
    }

    #[test]
    fn test_collect_without_prompts() {
        let ctx = collect(&args(&["Bored", "Six months", "Yes", "Regret"])).unwrap();
        assert!(ctx.is_complete());
        assert_eq!(ctx.category(), Category::Career);
        assert_eq!(ctx.answers()[1], "Six months");
    }

    #[test]
    fn test_collect_rejects_too_many_answers() {
        let err = collect(&args(&["a", "b", "c", "d", "e"])).unwrap_err();
        assert!(err.to_string().contains("already been answered"));
    }

    #[test]
    fn test_collect_rejects_blank_answer() {
        let err = collect(&args(&["a", "  ", "c", "d"])).unwrap_err();
        assert!(err.to_string().contains("please type something"));
    }
}
