//! Decision Disco core — data model, credential handling, configuration.
//!
//! Everything here is transient and in-memory: a quiz session lives in a
//! [`types::DilemmaContext`], provider calls are built as
//! [`types::ChatRequest`] values, and results come back as
//! [`types::Verdict`]s. Nothing is persisted except the optional config file.

pub mod config;
pub mod credential;
pub mod error;
pub mod types;
pub mod utils;

pub use credential::Credential;
pub use error::CoreError;
pub use types::{Category, ChatMessage, ChatRequest, DilemmaContext, Verdict};
