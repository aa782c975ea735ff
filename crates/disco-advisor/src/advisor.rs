//! Advisor — the client-side orchestration loop.
//!
//! For a completed quiz session the advisor walks the ranked candidate model
//! list in order. Each model gets up to `retry.max_attempts` tries:
//!
//! 1. Build the prompt and request for this model
//! 2. Post it through the [`ChatTransport`] under a per-attempt timeout
//! 3. Classify the reply ([`classify_reply`])
//! 4. Recover and validate the verdict ([`parse_verdict`])
//!
//! Transient failures are retried with backoff, then the next model is
//! tried. Fatal failures stop the whole run unless `abort_on_fatal` is off.
//! Only one result ever comes out: a verdict or a single [`AdviceError`].

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use disco_core::config::AdvisorConfig;
use disco_core::{DilemmaContext, Verdict};
use disco_providers::{
    classify_reply, classify_transport_error, dedup_models, ChatTransport, Outcome, RetryPolicy,
};

use crate::error::{AdviceError, AttemptFailure};
use crate::prompt::build_request;
use crate::verdict::parse_verdict;

/// Resolved advisor settings.
#[derive(Clone, Debug)]
pub struct AdvisorSettings {
    /// Ranked, de-duplicated candidate models.
    pub models: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub retry: RetryPolicy,
    pub attempt_timeout: Duration,
    /// Extra same-model attempts allowed after an unparseable reply.
    pub parse_retries: u32,
    pub abort_on_fatal: bool,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self::from(&AdvisorConfig::default())
    }
}

impl From<&AdvisorConfig> for AdvisorSettings {
    fn from(config: &AdvisorConfig) -> Self {
        Self {
            models: dedup_models(&config.models),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            retry: RetryPolicy::from(&config.retry),
            attempt_timeout: config.timeout(),
            parse_retries: config.parse_retries,
            abort_on_fatal: config.abort_on_fatal,
        }
    }
}

/// A successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct Advice {
    pub verdict: Verdict,
    /// The model that produced the verdict.
    pub model: String,
    /// Attempts made across all models, including the successful one.
    pub attempts: u32,
}

pub struct Advisor {
    transport: Arc<dyn ChatTransport>,
    settings: AdvisorSettings,
}

impl Advisor {
    pub fn new(transport: Arc<dyn ChatTransport>, settings: AdvisorSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn settings(&self) -> &AdvisorSettings {
        &self.settings
    }

    /// Get a verdict for a completed session.
    pub async fn advise(&self, ctx: &DilemmaContext) -> Result<Advice, AdviceError> {
        if !ctx.is_complete() {
            return Err(AdviceError::Incomplete {
                answered: ctx.questions_asked(),
                expected: ctx.question_count(),
            });
        }
        if self.settings.models.is_empty() {
            return Err(AdviceError::NoCandidates);
        }

        let parse_retries = self.settings.parse_retries;
        let mut failures = Vec::new();
        let mut total_attempts = 0;

        for model in &self.settings.models {
            let model = model.as_str();
            info!(model, endpoint = self.transport.endpoint(), "trying model");

            // Parse retries are budgeted per model, separately from transient ones.
            let parse_failures = Cell::new(0u32);
            let (outcome, attempts) = self
                .settings
                .retry
                .run(
                    model,
                    move |attempt| self.attempt(ctx, model, attempt),
                    |outcome, _| match outcome {
                        Outcome::Transient(_) => true,
                        Outcome::Parse(_) => {
                            parse_failures.set(parse_failures.get() + 1);
                            parse_failures.get() <= parse_retries
                        }
                        _ => false,
                    },
                )
                .await;
            total_attempts += attempts;

            match outcome {
                Outcome::Success(verdict) => {
                    info!(model, attempts = total_attempts, "verdict received");
                    return Ok(Advice {
                        verdict,
                        model: model.to_string(),
                        attempts: total_attempts,
                    });
                }
                Outcome::Fatal(reason) if self.settings.abort_on_fatal => {
                    warn!(model, %reason, "fatal provider error, giving up");
                    return Err(AdviceError::Fatal {
                        model: model.to_string(),
                        reason,
                    });
                }
                other => {
                    let kind = other.kind();
                    let reason = other.reason().unwrap_or_default().to_string();
                    warn!(model, attempts, kind, %reason, "model failed, trying next");
                    failures.push(AttemptFailure {
                        model: model.to_string(),
                        attempts,
                        kind,
                        reason,
                    });
                }
            }
        }

        warn!(models = failures.len(), "all candidate models failed");
        Err(AdviceError::Exhausted { attempts: failures })
    }

    /// One request against one model.
    async fn attempt(&self, ctx: &DilemmaContext, model: &str, attempt: u32) -> Outcome<Verdict> {
        let request = build_request(ctx, model, &self.settings);
        let body = match serde_json::to_value(&request) {
            Ok(b) => b,
            Err(e) => return Outcome::Fatal(format!("failed to encode request: {e}")),
        };

        debug!(model, attempt, "sending chat request");

        let send = self.transport.send(&body);
        let reply = match tokio::time::timeout(self.settings.attempt_timeout, send).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return classify_transport_error(&e),
            Err(_) => {
                return Outcome::Transient(format!(
                    "no reply within {}s",
                    self.settings.attempt_timeout.as_secs_f64()
                ))
            }
        };

        classify_reply(&reply).and_then(|text| match parse_verdict(&text) {
            Ok(verdict) => Outcome::Success(verdict),
            Err(e) => {
                debug!(model, attempt, error = %e, "reply did not contain a verdict");
                Outcome::Parse(e.to_string())
            }
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use disco_core::Category;
    use disco_providers::{RawReply, TransportError};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Scripted = Result<RawReply, TransportError>;

    /// Replays scripted replies in order and records every request body.
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Scripted>>,
        bodies: Mutex<Vec<Value>>,
        hang: bool,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                bodies: Mutex::new(Vec::new()),
                hang: false,
            })
        }

        fn hanging() -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(VecDeque::new()),
                bodies: Mutex::new(Vec::new()),
                hang: true,
            })
        }

        /// Models requested, in order.
        fn seen(&self) -> Vec<String> {
            self.bodies
                .lock()
                .unwrap()
                .iter()
                .map(|b| b["model"].as_str().unwrap_or_default().to_string())
                .collect()
        }

        fn bodies(&self) -> Vec<Value> {
            self.bodies.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, body: &Value) -> Result<RawReply, TransportError> {
            self.bodies.lock().unwrap().push(body.clone());
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            let next = self.replies.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(RawReply::new(503, "script exhausted")))
        }

        fn endpoint(&self) -> &str {
            "scripted"
        }
    }

    fn completion(content: &str) -> Scripted {
        let body = json!({"choices": [{"message": {"role": "assistant", "content": content}}]});
        Ok(RawReply::new(200, body.to_string()))
    }

    fn rate_limited() -> Scripted {
        Ok(RawReply::new(429, r#"{"error":{"message":"rate limited"}}"#))
    }

    const VERDICT: &str =
        r#"Here: {"score":"Yes — 8/10","advice":"Do it.","pros":["growth"],"cons":["risk"]}"#;

    fn completed() -> DilemmaContext {
        let mut ctx = DilemmaContext::new(Category::Career, "Should I quit?").unwrap();
        for a in ["a", "b", "c", "d"] {
            ctx.record_answer(a).unwrap();
        }
        ctx
    }

    fn settings(models: &[&str], attempts: u32) -> AdvisorSettings {
        AdvisorSettings {
            models: models.iter().map(|m| m.to_string()).collect(),
            retry: RetryPolicy::new(attempts, Duration::from_millis(100), 2.0),
            ..AdvisorSettings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_in_rank_order() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(),
            Ok(RawReply::new(502, r#"{"error":"proxy_failed","detail":"reset"}"#)),
            completion(VERDICT),
        ]);
        let advisor = Advisor::new(transport.clone(), settings(&["A", "B", "C"], 1));

        let advice = advisor.advise(&completed()).await.unwrap();

        assert_eq!(advice.model, "C");
        assert_eq!(advice.attempts, 3);
        assert_eq!(advice.verdict.score, "Yes — 8/10");
        assert_eq!(advice.verdict.cons, vec!["risk"]);
        assert_eq!(transport.seen(), vec!["A", "B", "C"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_model_retry_before_fallback() {
        let transport = ScriptedTransport::new(vec![rate_limited(), completion(VERDICT)]);
        let advisor = Advisor::new(transport.clone(), settings(&["A", "B"], 2));

        let advice = advisor.advise(&completed()).await.unwrap();

        assert_eq!(advice.model, "A");
        assert_eq!(advice.attempts, 2);
        assert_eq!(transport.seen(), vec!["A", "A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_yields_one_aggregated_error() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(),
            rate_limited(),
            Err(TransportError::Connect("refused".to_string())),
            completion(""),
        ]);
        let advisor = Advisor::new(transport.clone(), settings(&["A", "B"], 2));

        let err = advisor.advise(&completed()).await.unwrap_err();

        let AdviceError::Exhausted { attempts } = &err else {
            panic!("expected Exhausted, got {err:?}");
        };
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].model, "A");
        assert_eq!(attempts[0].attempts, 2);
        assert_eq!(attempts[0].kind, "transient");
        assert_eq!(attempts[1].model, "B");
        assert_eq!(attempts[1].reason, "empty completion");
        assert_eq!(transport.seen(), vec!["A", "A", "B", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_aborts_remaining_models() {
        let transport = ScriptedTransport::new(vec![Ok(RawReply::new(
            500,
            r#"{"error":"server_missing_config"}"#,
        ))]);
        let advisor = Advisor::new(transport.clone(), settings(&["A", "B"], 3));

        let err = advisor.advise(&completed()).await.unwrap_err();

        assert!(matches!(err, AdviceError::Fatal { ref model, .. } if model == "A"));
        assert_eq!(transport.seen(), vec!["A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_falls_through_when_not_aborting() {
        let transport = ScriptedTransport::new(vec![
            Ok(RawReply::new(404, r#"{"error":{"message":"no such model"}}"#)),
            completion(VERDICT),
        ]);
        let mut s = settings(&["A", "B"], 3);
        s.abort_on_fatal = false;
        let advisor = Advisor::new(transport.clone(), s);

        let advice = advisor.advise(&completed()).await.unwrap();
        assert_eq!(advice.model, "B");
        assert_eq!(transport.seen(), vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_moves_on_without_retry() {
        let transport = ScriptedTransport::new(vec![
            completion("I'd say go for it!"),
            completion(VERDICT),
        ]);
        let advisor = Advisor::new(transport.clone(), settings(&["A", "B"], 3));

        let advice = advisor.advise(&completed()).await.unwrap();
        assert_eq!(advice.model, "B");
        assert_eq!(transport.seen(), vec!["A", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_retries_allow_same_model_retry() {
        let transport = ScriptedTransport::new(vec![
            completion(r#"{"score":"Yes","advice":"x","pros":[]}"#),
            completion(VERDICT),
        ]);
        let mut s = settings(&["A", "B"], 3);
        s.parse_retries = 1;
        let advisor = Advisor::new(transport.clone(), s);

        let advice = advisor.advise(&completed()).await.unwrap();
        assert_eq!(advice.model, "A");
        assert_eq!(transport.seen(), vec!["A", "A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_does_not_spend_parse_retries() {
        let transport = ScriptedTransport::new(vec![
            rate_limited(),
            completion("I cannot answer in JSON today."),
            completion(VERDICT),
        ]);
        let mut s = settings(&["A", "B"], 3);
        s.parse_retries = 1;
        let advisor = Advisor::new(transport.clone(), s);

        let advice = advisor.advise(&completed()).await.unwrap();
        assert_eq!(advice.model, "A");
        assert_eq!(advice.attempts, 3);
        assert_eq!(transport.seen(), vec!["A", "A", "A"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_retries_are_counted_per_model() {
        let transport = ScriptedTransport::new(vec![
            completion("no json"),
            completion("still no json"),
            completion("nope"),
            completion(VERDICT),
        ]);
        let mut s = settings(&["A", "B"], 3);
        s.parse_retries = 1;
        let advisor = Advisor::new(transport.clone(), s);

        let advice = advisor.advise(&completed()).await.unwrap();
        assert_eq!(advice.model, "B");
        assert_eq!(transport.seen(), vec!["A", "A", "B", "B"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_transient() {
        let transport = ScriptedTransport::hanging();
        let mut s = settings(&["A"], 1);
        s.attempt_timeout = Duration::from_secs(2);
        let advisor = Advisor::new(transport.clone(), s);

        let err = advisor.advise(&completed()).await.unwrap_err();
        let AdviceError::Exhausted { attempts } = err else {
            panic!("expected Exhausted");
        };
        assert_eq!(attempts[0].kind, "transient");
        assert!(attempts[0].reason.starts_with("no reply within"));
    }

    #[tokio::test]
    async fn test_incomplete_session_is_rejected() {
        let transport = ScriptedTransport::new(vec![]);
        let advisor = Advisor::new(transport.clone(), settings(&["A"], 1));
        let ctx = DilemmaContext::new(Category::Life, "Move abroad?").unwrap();

        let err = advisor.advise(&ctx).await.unwrap_err();
        assert_eq!(err, AdviceError::Incomplete { answered: 0, expected: 4 });
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let advisor = Advisor::new(ScriptedTransport::new(vec![]), settings(&[], 1));
        assert_eq!(advisor.advise(&completed()).await.unwrap_err(), AdviceError::NoCandidates);
    }

    #[tokio::test]
    async fn test_request_body_shape() {
        let transport = ScriptedTransport::new(vec![completion(VERDICT)]);
        let advisor = Advisor::new(transport.clone(), settings(&["A"], 1));
        advisor.advise(&completed()).await.unwrap();

        let bodies = transport.bodies();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["model"], "A");
        assert_eq!(bodies[0]["max_tokens"], 600);
        assert_eq!(bodies[0]["stream"], false);
        assert_eq!(bodies[0]["messages"][0]["role"], "user");
        let prompt = bodies[0]["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("Should I quit?"));
    }

    #[test]
    fn test_settings_dedup_models() {
        let config = AdvisorConfig {
            models: vec!["a".into(), "b".into(), "a".into()],
            ..AdvisorConfig::default()
        };
        assert_eq!(AdvisorSettings::from(&config).models, vec!["a", "b"]);
    }
}
