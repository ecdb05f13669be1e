use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::DagResult;
use crate::node::NodeId;
use crate::value::Value;

/// Collapses the set of successful node values into the caller's final
/// result. Invoked once per [`crate::engine::Engine::apply`] call.
#[async_trait]
pub trait TerminalStrategy<Req, Res>: Send + Sync {
    async fn finish(&self, request: &Req, results: &HashMap<NodeId, Value>) -> DagResult<Res>;
}

type TerminalFuture<Res> = Pin<Box<dyn Future<Output = DagResult<Res>> + Send>>;

/// Adapts a closure into a [`TerminalStrategy`].
pub struct TerminalFn<F>(F);

impl<F> TerminalFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<Req, Res, F> TerminalStrategy<Req, Res> for TerminalFn<F>
where
    Req: Send + Sync,
    Res: Send + Sync,
    F: Fn(&Req, &HashMap<NodeId, Value>) -> TerminalFuture<Res> + Send + Sync,
{
    async fn finish(&self, request: &Req, results: &HashMap<NodeId, Value>) -> DagResult<Res> {
        (self.0)(request, results).await
    }
}
