//! Decision Disco advisor — turns a finished quiz into a [`Verdict`].
//!
//! This crate contains:
//! - **prompt**: the deterministic prompt template and per-attempt `ChatRequest`
//! - **extract**: recovery of the first balanced JSON object from free text
//! - **verdict**: parsing + validation of that object into a `Verdict`
//! - **advisor**: the sequential model-fallback loop with same-model retries
//! - **render**: display-safe HTML for verdicts and failures
//!
//! [`Verdict`]: disco_core::Verdict

pub mod advisor;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod render;
pub mod verdict;

pub use advisor::{Advice, Advisor, AdvisorSettings};
pub use error::{AdviceError, AttemptFailure};
pub use extract::{extract_first_json_object, extract_outer_braces};
pub use verdict::{parse_verdict, VerdictError};
pub use render::{escape_html, render_failure, render_loading, render_verdict, RenderedVerdict};
