//! Core types — the quiz session, the provider request, and the verdict.
//!
//! `ChatRequest` and `ChatMessage` mirror the OpenAI chat completions wire
//! format so they can be posted to the relay (and from there to the provider)
//! without any reshaping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ─────────────────────────────────────────────
// Categories + question bank
// ─────────────────────────────────────────────

/// The fixed set of dilemma categories offered by the quiz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Relationship,
    Career,
    Financial,
    Life,
    Daily,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Category; 5] = [
        Category::Relationship,
        Category::Career,
        Category::Financial,
        Category::Life,
        Category::Daily,
    ];

    /// Lowercase identifier, as embedded in the prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Relationship => "relationship",
            Category::Career => "career",
            Category::Financial => "financial",
            Category::Life => "life",
            Category::Daily => "daily",
        }
    }

    /// The ordered follow-up questions asked for this category.
    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Category::Relationship => &[
                "How long have you been feeling this way about them?",
                "On a scale 1–10, how respected and safe do you feel with this person?",
                "When you imagine your life with them in 5 years — excited or anxious?",
                "If your best friend was in this exact situation, what would you tell them?",
            ],
            Category::Career => &[
                "How many hours a day do you dread this job?",
                "On a scale 1–10, how much do you trust your manager/team?",
                "Are you learning or just repeating the same year?",
                "If money wasn't a factor, would you still stay?",
            ],
            Category::Financial => &[
                "Can you afford this tomorrow without stress?",
                "Will you still love it in 6 months?",
                "Are you buying it to feel better about something else?",
                "What's the real monthly cost?",
            ],
            Category::Life => &[
                "If failure was impossible, would you still want this?",
                "Are you running TOWARD something great or AWAY from something bad?",
                "Will 80-year-old you regret NOT doing this?",
                "Who will this hurt — have you talked to them?",
            ],
            Category::Daily => &[
                "How tired are you right now (1–10)?",
                "Will future-you thank you tonight?",
                "Does this align with who you want to become?",
                "What's the worst realistic outcome if you say no?",
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

// ─────────────────────────────────────────────
// DilemmaContext (one quiz session)
// ─────────────────────────────────────────────

/// Everything the user has told us during one quiz session.
///
/// Owned by the session driving the quiz and passed by reference to the
/// advisor. Answers can only be appended, one per question, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct DilemmaContext {
    category: Category,
    free_text: String,
    answers: Vec<String>,
}

impl DilemmaContext {
    /// Start a session. The dilemma text is trimmed and must not be empty.
    pub fn new(category: Category, free_text: impl Into<String>) -> Result<Self, CoreError> {
        let free_text = free_text.into().trim().to_string();
        if free_text.is_empty() {
            return Err(CoreError::InvalidInput(
                "please describe your dilemma".to_string(),
            ));
        }
        Ok(Self {
            category,
            free_text,
            answers: Vec::new(),
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Number of questions answered so far.
    pub fn questions_asked(&self) -> usize {
        self.answers.len()
    }

    /// Total number of questions for this session's category.
    pub fn question_count(&self) -> usize {
        self.category.questions().len()
    }

    /// The next unanswered question, or `None` once the quiz is complete.
    pub fn next_question(&self) -> Option<&'static str> {
        self.category.questions().get(self.answers.len()).copied()
    }

    /// Record the answer to the current question.
    pub fn record_answer(&mut self, answer: impl Into<String>) -> Result<(), CoreError> {
        if self.is_complete() {
            return Err(CoreError::QuizComplete(self.question_count()));
        }
        let answer = answer.into().trim().to_string();
        if answer.is_empty() {
            return Err(CoreError::InvalidInput("please type something".to_string()));
        }
        self.answers.push(answer);
        Ok(())
    }

    /// Whether every question has an answer (a verdict may be requested).
    pub fn is_complete(&self) -> bool {
        self.answers.len() == self.question_count()
    }
}

// ─────────────────────────────────────────────
// Chat request (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A single chat message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for one chat-completion attempt.
///
/// Built fresh per attempt; a retry against another model builds a new one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Build a non-streaming request. Temperature is clamped into `[0, 1]`.
    pub fn new(
        model: impl Into<String>,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f64,
    ) -> Self {
        let temperature = if temperature.is_finite() {
            temperature.clamp(0.0, 1.0)
        } else {
            0.7
        };
        Self {
            model: model.into(),
            messages,
            max_tokens,
            temperature,
            stream: false,
        }
    }
}

// ─────────────────────────────────────────────
// Verdict
// ─────────────────────────────────────────────

/// The structured advice recovered from the provider's reply.
///
/// Every field is required; a reply missing any of them is not a verdict.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub score: String,
    pub advice: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
