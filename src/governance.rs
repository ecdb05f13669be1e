//! Per-node resilience configuration: timeout, retry, and fallback.

use std::sync::Arc;
use std::time::Duration;

use crate::traits::FallbackStrategy;

/// Control knobs applied to a single node by the scheduler and the
/// [`crate::resilient::ResilientProcessor`] decorator.
///
/// Governance applies in a fixed order: per-node timeout first, fallback
/// second, so a fallback can catch a timeout as well as an intrinsic
/// processor failure. Retry is orthogonal to both: it wraps the raw
/// processor at compile time, inside whatever timeout the scheduler later
/// enforces around the whole (possibly several-attempt) call.
pub struct Governance<Req> {
    /// Wall-clock budget for the node's composite task. `None` means no
    /// per-node timeout is enforced.
    pub timeout: Option<Duration>,
    /// Number of retries beyond the first attempt. `0` disables the retry
    /// decorator entirely.
    pub max_retries: u32,
    /// Sleep interval between retry attempts.
    pub retry_backoff: Duration,
    /// Substitute-value producer invoked on any unrecovered task error.
    pub fallback: Option<Arc<dyn FallbackStrategy<Req>>>,
}

// Derived `Clone` would require `Req: Clone`, which none of the fields
// actually need: `Arc<dyn FallbackStrategy<Req>>` is `Clone` regardless of
// whether `Req` is.
impl<Req> Clone for Governance<Req> {
    fn clone(&self) -> Self {
        Self {
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
            fallback: self.fallback.clone(),
        }
    }
}

impl<Req> Default for Governance<Req> {
    fn default() -> Self {
        Self {
            timeout: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(0),
            fallback: None,
        }
    }
}

impl<Req> Governance<Req> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackStrategy<Req>>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}
