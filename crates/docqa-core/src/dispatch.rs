//! Bounded blocking retry around an external answer generator.
//!
//! The generator signals "busy, ask again" by returning a fixed sentinel
//! string instead of an error. [`Dispatcher::dispatch`] treats that string
//! as a transient failure: it sleeps for the backoff interval and calls
//! again, up to [`RetryPolicy::max_attempts`] calls in total.
//!
//! # Outcomes
//!
//! | Generator result | Outcome | Retried |
//! |---|---|---|
//! | `Ok(Some(sentinel))` | backoff, then retry | yes |
//! | `Ok(Some(text))` | [`DispatchOutcome::Answered`] | no |
//! | `Ok(None)` | [`DispatchOutcome::Rejected`] | no |
//! | `Err(e)` | [`DispatchOutcome::Failed`] with fallback text | no |
//!
//! Running out of attempts yields [`DispatchOutcome::Exhausted`]. A
//! [`CancelToken`] is checked at each backoff boundary only; an in-flight
//! call is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

/// Sentinel the generator returns when it wants to be called again.
pub const DEFAULT_SENTINEL: &str = "Please try again later.";

/// Text used as the answer when a call fails and nothing better is known.
pub const FALLBACK_PLACEHOLDER: &str = "An answer could not be generated for this question.";

/// Sampling parameters passed through to the generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 800,
        }
    }
}

/// An external service that turns a prompt into answer text.
///
/// `Ok(None)` means the service refused the prompt on policy grounds.
pub trait Generator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Option<String>>;
}

/// Blocking wait between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared flag that stops a dispatch at its next backoff.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How the dispatcher reacts to the sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Exact text that means "try again".
    pub sentinel: String,
    /// Wait between attempts.
    pub backoff: Duration,
    /// Total calls allowed. `0` means no limit.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            backoff: Duration::from_secs(5),
            max_attempts: 5,
        }
    }
}

/// Terminal result of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The generator produced text other than the sentinel.
    Answered(String),
    /// The generator refused the prompt.
    Rejected,
    /// Every allowed attempt returned the sentinel.
    Exhausted { attempts: u32 },
    /// The generator call errored.
    Failed { error: String, fallback: String },
    /// Cancelled at a backoff boundary.
    Cancelled,
}

impl DispatchOutcome {
    /// Text to show for this outcome, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            DispatchOutcome::Answered(text) => Some(text),
            DispatchOutcome::Failed { fallback, .. } => Some(fallback),
            _ => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, DispatchOutcome::Answered(_))
    }
}

/// Calls a [`Generator`] under a [`RetryPolicy`].
pub struct Dispatcher {
    policy: RetryPolicy,
    params: GenerationParams,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancelToken,
}

impl Dispatcher {
    pub fn new(policy: RetryPolicy, params: GenerationParams) -> Self {
        Self {
            policy,
            params,
            sleeper: Arc::new(ThreadSleeper),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Send `prompt` until it is answered, refused, fails, or runs out of
    /// attempts.
    ///
    /// `fallback` is the best text known so far; on error it becomes the
    /// outcome text, or [`FALLBACK_PLACEHOLDER`] when `None`.
    pub fn dispatch(
        &self,
        generator: &dyn Generator,
        prompt: &str,
        fallback: Option<&str>,
    ) -> DispatchOutcome {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::debug!(
                generator = generator.name(),
                attempt,
                prompt_chars = prompt.chars().count(),
                "dispatching prompt"
            );

            match generator.generate(prompt, &self.params) {
                Ok(Some(text)) if text == self.policy.sentinel => {
                    if self.policy.max_attempts != 0 && attempt >= self.policy.max_attempts {
                        tracing::warn!(attempts = attempt, "generator still busy, giving up");
                        return DispatchOutcome::Exhausted { attempts: attempt };
                    }
                    if self.cancel.is_cancelled() {
                        return DispatchOutcome::Cancelled;
                    }
                    tracing::info!(
                        attempt,
                        backoff_secs = self.policy.backoff.as_secs_f64(),
                        "generator busy, retrying"
                    );
                    self.sleeper.sleep(self.policy.backoff);
                    if self.cancel.is_cancelled() {
                        return DispatchOutcome::Cancelled;
                    }
                }
                Ok(Some(text)) => return DispatchOutcome::Answered(text),
                Ok(None) => {
                    tracing::warn!(generator = generator.name(), "prompt rejected by policy");
                    return DispatchOutcome::Rejected;
                }
                Err(e) => {
                    tracing::warn!(generator = generator.name(), "generation failed: {:#}", e);
                    return DispatchOutcome::Failed {
                        error: format!("{:#}", e),
                        fallback: fallback.unwrap_or(FALLBACK_PLACEHOLDER).to_string(),
                    };
                }
            }
        }
    }
}
