//! The two-method public surface: compile a configuration, then apply it to
//! requests any number of times.

use std::sync::Arc;

use crate::compiler::Compiler;
use crate::error::DagResult;
use crate::graph::GraphConfig;
use crate::plan::ExecutionPlan;
use crate::scheduler::Scheduler;

/// A compiled DAG, ready to be applied to requests. Cheap to clone: the
/// compiled plan is held behind an `Arc` and shared across invocations.
pub struct Engine<Req, Res> {
    plan: Arc<ExecutionPlan<Req, Res>>,
}

impl<Req, Res> Engine<Req, Res>
where
    Req: Send + Sync + 'static,
    Res: Send + Sync + 'static,
{
    /// Compile `config` into an execution plan. Fails eagerly on cycles or
    /// a structurally incomplete configuration (no worker pool, no terminal
    /// strategy) — never at `apply` time.
    pub fn new(config: GraphConfig<Req, Res>) -> DagResult<Self> {
        let plan = Compiler::compile(config)?;
        Ok(Self { plan: Arc::new(plan) })
    }

    /// Run the compiled graph against `request`, returning the terminal
    /// strategy's single result or the first unrecovered error.
    pub async fn apply(&self, request: Req) -> DagResult<Res> {
        let scheduler = Scheduler::new(self.plan.clone());
        scheduler.run(Arc::new(request)).await
    }
}

impl<Req, Res> Clone for Engine<Req, Res> {
    fn clone(&self) -> Self {
        Self { plan: self.plan.clone() }
    }
}
