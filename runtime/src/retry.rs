//! Bounded retry with remediation.
//!
//! Some persistence failures are recoverable by fixing something first: a
//! draft insert that references a missing owner record succeeds once the
//! owner exists. This module runs that loop as a small explicit state
//! machine:
//!
//! ```text
//! Attempt ──ok──────────────────────────────▶ Done
//!    │
//!    ├─error, not remediable ───────────────▶ Fail
//!    ├─error, remediable, attempts left ───▶ Remediate ──▶ Attempt
//!    └─error, remediable, cap reached ─────▶ GiveUp
//! ```
//!
//! # Example
//!
//! ```rust
//! use event_wizard_runtime::retry::{RetryPolicy, retry_with_remediation};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = RetryPolicy::builder()
//!     .max_attempts(3)
//!     .initial_delay(Duration::ZERO)
//!     .build();
//!
//! let remediated = AtomicUsize::new(0);
//! let value = retry_with_remediation(
//!     &policy,
//!     || async {
//!         if remediated.load(Ordering::SeqCst) == 0 {
//!             Err("missing owner".to_string())
//!         } else {
//!             Ok(42)
//!         }
//!     },
//!     |err: &String| err.contains("owner"),
//!     || async {
//!         remediated.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     },
//! )
//! .await?;
//!
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Retry policy for the remediation loop.
///
/// # Default Values
///
/// - `max_attempts`: 3 (total, including the first)
/// - `initial_delay`: 50ms
/// - `max_delay`: 2 seconds
/// - `multiplier`: 2.0 (delay doubles each retry)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first. Never below 1.
    pub max_attempts: u32,
    /// Delay after the first remediation
    pub initial_delay: Duration,
    /// Cap for the exponential backoff
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

/// What the loop does after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Fix the cause, then attempt again
    Remediate,
    /// Remediable, but the attempt cap is reached
    GiveUp,
    /// Not remediable; surface immediately
    Fail,
}

impl RetryPolicy {
    /// Create a new policy builder.
    #[must_use]
    pub const fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            max_attempts: None,
            initial_delay: None,
            max_delay: None,
            multiplier: None,
        }
    }

    /// Decide the transition after attempt number `attempt` (1-based) failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use event_wizard_runtime::retry::{Decision, RetryPolicy};
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.decide(1, true), Decision::Remediate);
    /// assert_eq!(policy.decide(3, true), Decision::GiveUp);
    /// assert_eq!(policy.decide(1, false), Decision::Fail);
    /// ```
    #[must_use]
    pub fn decide(&self, attempt: u32, remediable: bool) -> Decision {
        if !remediable {
            Decision::Fail
        } else if attempt >= self.max_attempts.max(1) {
            Decision::GiveUp
        } else {
            Decision::Remediate
        }
    }

    /// Calculate the pause after the remediation that follows attempt `attempt`.
    ///
    /// `initial_delay * multiplier^(attempt - 1)`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);

        // Note: Precision loss acceptable for delays (well below 2^52 ms)
        #[allow(clippy::cast_precision_loss)]
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let delay = Duration::from_millis(delay_ms.max(0.0) as u64);

        delay.min(self.max_delay)
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    max_attempts: Option<u32>,
    initial_delay: Option<Duration>,
    max_delay: Option<Duration>,
    multiplier: Option<f64>,
}

impl RetryPolicyBuilder {
    /// Set the total number of attempts.
    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set the delay after the first remediation.
    #[must_use]
    pub const fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = Some(delay);
        self
    }

    /// Set maximum delay (cap for exponential backoff).
    #[must_use]
    pub const fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set multiplier for exponential backoff.
    #[must_use]
    pub const fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Build the [`RetryPolicy`].
    #[must_use]
    pub fn build(self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            initial_delay: self.initial_delay.unwrap_or(defaults.initial_delay),
            max_delay: self.max_delay.unwrap_or(defaults.max_delay),
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
        }
    }
}

/// Why the remediation loop stopped without a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryFailure<E> {
    /// The error is outside the remediable class
    #[error("{0}")]
    Fatal(E),

    /// Every allowed attempt failed with a remediable error
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error of the final attempt
        last: E,
    },

    /// The remediation step itself failed
    #[error("remediation failed: {0}")]
    RemediationFailed(E),
}

impl<E> RetryFailure<E> {
    /// The underlying error, whichever way the loop stopped.
    pub fn into_inner(self) -> E {
        match self {
            Self::Fatal(err) | Self::RemediationFailed(err) | Self::Exhausted { last: err, .. } => {
                err
            },
        }
    }
}

enum Phase<E> {
    Attempt,
    Remediate(E),
}

/// Run `operation`, remediating and retrying remediable failures.
///
/// - `is_remediable` classifies an error
/// - `remediate` fixes the cause; it runs once per remediable failure
///
/// # Errors
///
/// - [`RetryFailure::Fatal`]: a non-remediable error (returned at once)
/// - [`RetryFailure::Exhausted`]: `policy.max_attempts` attempts all failed
/// - [`RetryFailure::RemediationFailed`]: `remediate` returned an error
pub async fn retry_with_remediation<Op, OpFut, Rem, RemFut, P, T, E>(
    policy: &RetryPolicy,
    mut operation: Op,
    is_remediable: P,
    mut remediate: Rem,
) -> Result<T, RetryFailure<E>>
where
    Op: FnMut() -> OpFut,
    OpFut: Future<Output = Result<T, E>>,
    Rem: FnMut() -> RemFut,
    RemFut: Future<Output = Result<(), E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 1;
    let mut phase = Phase::Attempt;

    loop {
        phase = match phase {
            Phase::Attempt => match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "Operation succeeded after remediation");
                    }
                    return Ok(value);
                },
                Err(err) => match policy.decide(attempt, is_remediable(&err)) {
                    Decision::Fail => return Err(RetryFailure::Fatal(err)),
                    Decision::GiveUp => {
                        tracing::error!(attempt, error = %err, "Giving up after max attempts");
                        return Err(RetryFailure::Exhausted {
                            attempts: attempt,
                            last: err,
                        });
                    },
                    Decision::Remediate => Phase::Remediate(err),
                },
            },
            Phase::Remediate(err) => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "Remediable failure, remediating before retry"
                );
                remediate().await.map_err(RetryFailure::RemediationFailed)?;
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                attempt += 1;
                Phase::Attempt
            },
        };
    }
}
