use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::DagResult;
use crate::value::{UpstreamInputView, Value};

/// A node's unit of work: given the original request and the results of its
/// parents, produce this node's value.
#[async_trait]
pub trait Processor<Req>: Send + Sync {
    async fn process(&self, request: &Req, upstream: &UpstreamInputView) -> DagResult<Value>;
}

type ProcessorFuture = Pin<Box<dyn Future<Output = DagResult<Value>> + Send>>;

/// Adapts a closure into a [`Processor`].
pub struct ProcessorFn<F>(F);

impl<F> ProcessorFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<Req, F> Processor<Req> for ProcessorFn<F>
where
    Req: Send + Sync,
    F: Fn(&Req, &UpstreamInputView) -> ProcessorFuture + Send + Sync,
{
    async fn process(&self, request: &Req, upstream: &UpstreamInputView) -> DagResult<Value> {
        (self.0)(request, upstream).await
    }
}
