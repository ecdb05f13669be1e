//! Synchronous bounded-retry decorator wrapping a raw [`Processor`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::error::DagResult;
use crate::node::NodeId;
use crate::traits::Processor;
use crate::value::{UpstreamInputView, Value};

/// Wraps a processor with synchronous bounded retry. Attempts
/// `1 + max_retries` times, sleeping `backoff` between attempts, and raises
/// the last captured error on exhaustion.
///
/// Unaware of timeouts: the scheduler enforces those independently, around
/// the whole (possibly multi-attempt) call this decorator makes.
pub struct ResilientProcessor<Req> {
    node_id: NodeId,
    inner: std::sync::Arc<dyn Processor<Req>>,
    max_retries: u32,
    backoff: Duration,
}

impl<Req> ResilientProcessor<Req> {
    pub fn new(
        node_id: impl Into<NodeId>,
        inner: std::sync::Arc<dyn Processor<Req>>,
        max_retries: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            inner,
            max_retries,
            backoff,
        }
    }
}

#[async_trait]
impl<Req: Send + Sync> Processor<Req> for ResilientProcessor<Req> {
    async fn process(&self, request: &Req, upstream: &UpstreamInputView) -> DagResult<Value> {
        let attempts = 1 + self.max_retries;
        let mut last_err = None;
        for attempt in 1..=attempts {
            match self.inner.process(request, upstream).await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    warn!(node = %self.node_id, attempt, attempts, error = %e, "processor attempt failed");
                    last_err = Some(e);
                    if attempt < attempts && !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
        Err(last_err.expect("at least one attempt always runs"))
    }
}
