use std::time::Duration;

use serde_json::Value;

use crate::models::PromptBundle;
use crate::services::inference::InferenceProvider;

/// Attempts per model before moving on to the next one.
pub const MAX_RETRIES: u32 = 3;
/// Fixed pause between retries of the same model, not exponential.
pub const RETRY_DELAY: Duration = Duration::from_millis(1000);

pub const DEFAULT_MODEL_SEQUENCE: [&str; 3] =
    ["gemini-2.0-flash", "gemini-1.5-flash", "gemini-1.5-pro"];

/// A failed attempt, reduced to the two cases the state machine cares
/// about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Provider overloaded; the same model may answer on a later attempt.
    Transient(String),
    /// Anything else, including an unparseable payload. The model is
    /// abandoned immediately and the retry budget is left untouched.
    Fatal(String),
}

impl AttemptFailure {
    fn reason(&self) -> &str {
        match self {
            AttemptFailure::Transient(reason) | AttemptFailure::Fatal(reason) => reason,
        }
    }
}

/// What the runner does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Sleep for `delay`, then call the same model again.
    Retry { delay: Duration },
    /// Give up on the current model and move down the sequence.
    NextModel,
}

/// Pure transition function for a failed attempt. `attempt_number` is
/// 1-based; retry budgets are per model, so the counter resets whenever
/// the runner advances in the sequence.
pub fn next_step(attempt_number: u32, failure: &AttemptFailure) -> NextStep {
    match failure {
        AttemptFailure::Transient(_) if attempt_number < MAX_RETRIES => {
            NextStep::Retry { delay: RETRY_DELAY }
        }
        _ => NextStep::NextModel,
    }
}

/// Sleep capability injected into the runner so tests can run the retry
/// loop without real delays.
#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Terminal outcome of one invocation sequence.
#[derive(Debug)]
pub enum InvocationResult {
    /// The first payload that parsed as a JSON object.
    Success(Value),
    /// Every model/retry combination failed.
    Exhausted,
}

/// Runs the prompt against an ordered model sequence: bounded retry on
/// overload, immediate escalation on any other failure, first structured
/// payload wins. Models are tried strictly in order, never concurrently.
pub struct ModelRunner {
    models: Vec<String>,
}

impl ModelRunner {
    pub fn new(models: Vec<String>) -> Self {
        Self { models }
    }

    pub async fn run(
        &self,
        provider: &dyn InferenceProvider,
        sleeper: &dyn Sleeper,
        bundle: &PromptBundle,
    ) -> InvocationResult {
        for model in &self.models {
            let mut attempt = 1u32;
            loop {
                log::info!("🤖 Trying model {} (attempt {}/{})", model, attempt, MAX_RETRIES);

                let failure = match provider.generate(model, bundle).await {
                    Ok(text) => match parse_payload(&text) {
                        Some(payload) => {
                            log::info!("✅ Model {} returned a structured payload", model);
                            return InvocationResult::Success(payload);
                        }
                        None => AttemptFailure::Fatal(format!(
                            "payload is not a JSON object: {}",
                            text.chars().take(200).collect::<String>()
                        )),
                    },
                    Err(e) if e.is_transient() => AttemptFailure::Transient(e.to_string()),
                    Err(e) => AttemptFailure::Fatal(e.to_string()),
                };

                match next_step(attempt, &failure) {
                    NextStep::Retry { delay } => {
                        log::warn!(
                            "⏳ Model {} overloaded, retrying in {}ms: {}",
                            model,
                            delay.as_millis(),
                            failure.reason()
                        );
                        sleeper.sleep(delay).await;
                        attempt += 1;
                    }
                    NextStep::NextModel => {
                        log::warn!("➡️ Abandoning model {}: {}", model, failure.reason());
                        break;
                    }
                }
            }
        }

        log::error!("❌ All models exhausted, no analysis produced");
        InvocationResult::Exhausted
    }
}

/// Parses the model output into a JSON object. Structured output should
/// be plain JSON, but a drifting model sometimes wraps it in prose or a
/// code fence, so a brace-delimited substring is tried as a repair pass.
fn parse_payload(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&trimmed[start..=end])
        .ok()
        .filter(Value::is_object)
}
