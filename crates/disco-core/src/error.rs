use thiserror::Error;

/// Errors raised while building or mutating core values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("all {0} questions have already been answered")]
    QuizComplete(usize),
}
