use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::{DagError, DagResult};
use crate::value::{UpstreamInputView, Value};

/// Produces a substitute value for a node whose task failed. Always called
/// with an empty [`UpstreamInputView`] per the fallback-input contract:
/// parent data is generally unavailable or incoherent on cascade failure.
#[async_trait]
pub trait FallbackStrategy<Req>: Send + Sync {
    async fn recover(&self, request: &Req, upstream: &UpstreamInputView, cause: &DagError) -> DagResult<Value>;
}

type FallbackFuture = Pin<Box<dyn Future<Output = DagResult<Value>> + Send>>;

/// Adapts a closure into a [`FallbackStrategy`].
pub struct FallbackFn<F>(F);

impl<F> FallbackFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<Req, F> FallbackStrategy<Req> for FallbackFn<F>
where
    Req: Send + Sync,
    F: Fn(&Req, &UpstreamInputView, &DagError) -> FallbackFuture + Send + Sync,
{
    async fn recover(&self, request: &Req, upstream: &UpstreamInputView, cause: &DagError) -> DagResult<Value> {
        (self.0)(request, upstream, cause).await
    }
}
