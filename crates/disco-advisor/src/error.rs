//! Orchestrator failures.
//!
//! Only one of these ever reaches the user, and only through
//! [`AdviceError::user_message`]. The per-attempt diagnostics stay in
//! [`AdviceError::detail`] for logs.

use thiserror::Error;

/// Why one candidate model was given up on.
#[derive(Clone, Debug, PartialEq)]
pub struct AttemptFailure {
    pub model: String,
    /// Attempts made against this model before moving on.
    pub attempts: u32,
    /// `transient`, `fatal`, or `parse`.
    pub kind: &'static str,
    pub reason: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdviceError {
    #[error("quiz incomplete: {answered} of {expected} questions answered")]
    Incomplete { answered: usize, expected: usize },

    #[error("no candidate models configured")]
    NoCandidates,

    #[error("model {model} failed permanently: {reason}")]
    Fatal { model: String, reason: String },

    #[error("all {} candidate models failed", .attempts.len())]
    Exhausted { attempts: Vec<AttemptFailure> },
}

impl AdviceError {
    /// Short, non-technical text suitable for the result screen.
    pub fn user_message(&self) -> &'static str {
        match self {
            AdviceError::Incomplete { .. } => "Please answer every question first.",
            AdviceError::NoCandidates | AdviceError::Fatal { .. } => {
                "The advice service is not available right now. Please try again later."
            }
            AdviceError::Exhausted { .. } => {
                "The AI spirits are overwhelmed right now. Please wait a moment and try again shortly."
            }
        }
    }

    /// Full diagnostic chain, one line per failed model.
    pub fn detail(&self) -> String {
        match self {
            AdviceError::Exhausted { attempts } => {
                let mut out = self.to_string();
                for f in attempts {
                    out.push_str(&format!(
                        "\n  {} ({} attempt{}, {}): {}",
                        f.model,
                        f.attempts,
                        if f.attempts == 1 { "" } else { "s" },
                        f.kind,
                        f.reason
                    ));
                }
                out
            }
            other => other.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(model: &str, attempts: u32, kind: &'static str, reason: &str) -> AttemptFailure {
        AttemptFailure {
            model: model.to_string(),
            attempts,
            kind,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_exhausted_detail_lists_every_model() {
        let err = AdviceError::Exhausted {
            attempts: vec![
                failure("m1", 2, "transient", "HTTP 429: rate limited"),
                failure("m2", 1, "parse", "no JSON object found in reply"),
            ],
        };

        assert_eq!(err.to_string(), "all 2 candidate models failed");
        let detail = err.detail();
        assert!(detail.contains("m1 (2 attempts, transient): HTTP 429: rate limited"));
        assert!(detail.contains("m2 (1 attempt, parse): no JSON object found in reply"));
    }

    #[test]
    fn test_user_message_is_not_technical() {
        let err = AdviceError::Exhausted {
            attempts: vec![failure("m1", 1, "transient", "HTTP 503: upstream")],
        };
        let msg = err.user_message();
        assert!(msg.contains("try again shortly"));
        assert!(!msg.contains("503"));
        assert!(!msg.contains("m1"));
    }

    #[test]
    fn test_fatal_message() {
        let err = AdviceError::Fatal {
            model: "m".to_string(),
            reason: "HTTP 401: bad key".to_string(),
        };
        assert_eq!(err.detail(), "model m failed permanently: HTTP 401: bad key");
        assert!(!err.user_message().contains("401"));
    }
}
