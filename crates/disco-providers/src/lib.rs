//! Provider plumbing shared by the advisor and the relay.
//!
//! # Architecture
//!
//! - [`transport::ChatTransport`] — trait for "post a chat request, get status + body back"
//! - [`transport::HttpTransport`] — reqwest implementation (with or without a bearer key)
//! - [`outcome`] — the single classifier from raw replies to [`outcome::Outcome`]
//! - [`retry`] — [`retry::RetryPolicy`] and candidate-list helpers

pub mod outcome;
pub mod retry;
pub mod transport;

pub use outcome::{classify_reply, classify_transport_error, is_transient_status, Outcome};
pub use retry::{dedup_models, RetryPolicy};
pub use transport::{ChatTransport, HttpTransport, RawReply, TransportError};
