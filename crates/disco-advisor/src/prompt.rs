//! Prompt construction.
//!
//! The prompt is a pure function of the [`DilemmaContext`]: the same session
//! always yields the same text, whichever model it is sent to.

use std::fmt::Write;

use disco_core::{ChatMessage, ChatRequest, DilemmaContext};

use crate::advisor::AdvisorSettings;

/// Render the coaching prompt for a completed quiz session.
pub fn build_prompt(ctx: &DilemmaContext) -> String {
    let mut prompt = String::new();

    prompt.push_str("Role: Brutally honest but kind life coach.\n");
    let _ = writeln!(
        prompt,
        "User Dilemma: \"{}\" (Category: {})",
        ctx.free_text(),
        ctx.category()
    );

    prompt.push_str("User Answers:\n");
    let questions = ctx.category().questions();
    for (i, answer) in ctx.answers().iter().enumerate() {
        match questions.get(i) {
            Some(q) => {
                let _ = writeln!(prompt, "{}. {} {}", i + 1, q, answer);
            }
            None => {
                let _ = writeln!(prompt, "{}. {}", i + 1, answer);
            }
        }
    }

    prompt.push_str(
        "\nTask: Analyze and output valid JSON only. \
         Reply with exactly one JSON object: no prose, no markdown, no code fences.\n",
    );
    prompt.push_str(
        "Required JSON Structure:\n\
         {\n  \
         \"score\": \"Strong Yes — 9/10\",\n  \
         \"advice\": \"2-3 insightful sentences.\",\n  \
         \"pros\": [\"point 1\", \"point 2\"],\n  \
         \"cons\": [\"risk 1\", \"risk 2\"]\n\
         }",
    );

    prompt
}

/// Build the request for one attempt against `model`.
pub fn build_request(ctx: &DilemmaContext, model: &str, settings: &AdvisorSettings) -> ChatRequest {
    ChatRequest::new(
        model,
        vec![ChatMessage::user(build_prompt(ctx))],
        settings.max_tokens,
        settings.temperature,
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use disco_core::Category;

    fn completed() -> DilemmaContext {
        let mut ctx = DilemmaContext::new(Category::Career, "Should I quit my job?").unwrap();
        for answer in ["Bored", "Savings for 6 months", "Yes", "Regret"] {
            ctx.record_answer(answer).unwrap();
        }
        ctx
    }

    #[test]
    fn test_prompt_contains_dilemma_and_answers() {
        let prompt = build_prompt(&completed());

        assert!(prompt.contains("User Dilemma: \"Should I quit my job?\" (Category: career)"));
        assert!(prompt.contains("1. "));
        assert!(prompt.contains("Savings for 6 months"));
        assert!(prompt.contains("4. "));
        assert!(prompt.contains("\"pros\""));
        assert!(prompt.contains("exactly one JSON object"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt(&completed()), build_prompt(&completed()));
    }

    #[test]
    fn test_answers_stay_in_order() {
        let prompt = build_prompt(&completed());
        let bored = prompt.find("Bored").unwrap();
        let regret = prompt.find("Regret").unwrap();
        assert!(bored < regret);
    }

    #[test]
    fn test_build_request() {
        let settings = AdvisorSettings::default();
        let request = build_request(&completed(), "m1", &settings);

        assert_eq!(request.model, "m1");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.max_tokens, 600);
        assert!(!request.stream);
    }
}
