//! LLM enrichment: prompt construction, response parsing, and a bounded
//! retry wrapper around the completion service.

mod parser;

pub use parser::{build_prompt, parse_review, ProfileReview};

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// Black-box text completion capability.
pub trait CompletionClient: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Failures surfaced by the completion service.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion transport failed: {0}")]
    Transport(String),
    #[error("completion service returned {status}: {detail}")]
    Service { status: u16, detail: String },
    #[error("completion service returned no text")]
    EmptyResponse,
}

/// Bounded exponential backoff applied to transient completion failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following the given 0-based attempt: doubles
    /// from the initial delay, clamped at the cap.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay)
    }

    /// Run `operation` until it succeeds or the attempt budget is spent; the
    /// final error surfaces unchanged.
    pub fn run<T>(
        &self,
        mut operation: impl FnMut() -> Result<T, CompletionError>,
    ) -> Result<T, CompletionError> {
        let mut attempt = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if attempt + 1 < self.max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(attempt = attempt + 1, ?delay, %error, "completion call failed, retrying");
                    if !delay.is_zero() {
                        thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Formats a profile into a review request and parses the typed result.
pub struct EnrichmentClient<C> {
    llm: Arc<C>,
    retry: RetryPolicy,
}

impl<C: CompletionClient> EnrichmentClient<C> {
    pub fn new(llm: Arc<C>, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// One review round-trip. Every failure from the model call is retried
    /// per the policy before surfacing to the caller.
    pub fn review(&self, profile_json: &str) -> Result<ProfileReview, CompletionError> {
        let prompt = build_prompt(profile_json);
        let content = self.retry.run(|| self.llm.generate(&prompt))?;
        Ok(parse_review(&content))
    }
}
