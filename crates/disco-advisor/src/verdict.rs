//! Turning assistant text into a validated [`Verdict`].

use serde_json::error::Category;
use thiserror::Error;

use disco_core::Verdict;

use crate::extract::{extract_first_json_object, extract_outer_braces};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerdictError {
    #[error("no JSON object found in reply")]
    NoJson,

    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("JSON does not match the verdict shape: {0}")]
    Invalid(String),
}

/// Recover a verdict from free-form assistant text.
///
/// Tries the first balanced object; if that fails and the outer-braces cut is
/// a different candidate, tries that too. The first candidate's error wins.
pub fn parse_verdict(text: &str) -> Result<Verdict, VerdictError> {
    let primary = extract_first_json_object(text);
    let secondary = extract_outer_braces(text);

    let Some(first) = primary.or(secondary) else {
        return Err(VerdictError::NoJson);
    };

    match decode(first) {
        Ok(verdict) => Ok(verdict),
        Err(err) => match secondary.filter(|s| *s != first) {
            Some(second) => decode(second).map_err(|_| err),
            None => Err(err),
        },
    }
}

fn decode(candidate: &str) -> Result<Verdict, VerdictError> {
    serde_json::from_str(candidate).map_err(|e| match e.classify() {
        Category::Data => VerdictError::Invalid(e.to_string()),
        _ => VerdictError::Malformed(e.to_string()),
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
