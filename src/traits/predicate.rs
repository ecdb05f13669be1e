use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::DagResult;
use crate::value::UpstreamInputView;

/// Gates traversal of a single edge. Evaluated against the request and the
/// view of the edge's source node's results accumulated so far.
#[async_trait]
pub trait EdgePredicate<Req>: Send + Sync {
    async fn evaluate(&self, request: &Req, upstream: &UpstreamInputView) -> DagResult<bool>;
}

type PredicateFuture = Pin<Box<dyn Future<Output = DagResult<bool>> + Send>>;

/// Adapts a closure into an [`EdgePredicate`].
pub struct PredicateFn<F>(F);

impl<F> PredicateFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<Req, F> EdgePredicate<Req> for PredicateFn<F>
where
    Req: Send + Sync,
    F: Fn(&Req, &UpstreamInputView) -> PredicateFuture + Send + Sync,
{
    async fn evaluate(&self, request: &Req, upstream: &UpstreamInputView) -> DagResult<bool> {
        (self.0)(request, upstream).await
    }
}

/// Always-true predicate, the default for an edge registered without one.
pub struct AlwaysTrue;

#[async_trait]
impl<Req: Send + Sync> EdgePredicate<Req> for AlwaysTrue {
    async fn evaluate(&self, _request: &Req, _upstream: &UpstreamInputView) -> DagResult<bool> {
        Ok(true)
    }
}
