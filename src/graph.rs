//! The mutable configuration surface: accumulates nodes, edges and
//! governance until the engine compiles it into an [`crate::plan::ExecutionPlan`].

use std::sync::Arc;
use std::time::Duration;

use crate::edge::Edge;
use crate::error::{DagError, DagResult};
use crate::governance::Governance;
use crate::node::{NodeEntryDef, NodeId};
use crate::pool::WorkerPool;
use crate::traits::{EdgePredicate, Processor, TerminalStrategy};

const DEFAULT_GLOBAL_TIMEOUT: Duration = Duration::from_secs(60);

/// Accumulator for a graph's structure and runtime configuration. Chainable
/// and validated eagerly when [`crate::engine::Engine::new`] compiles it.
pub struct GraphConfig<Req, Res> {
    pub(crate) nodes: Vec<NodeEntryDef<Req>>,
    pub(crate) edges: Vec<Edge<Req>>,
    pub(crate) terminal_strategy: Option<Arc<dyn TerminalStrategy<Req, Res>>>,
    pub(crate) default_governance: Option<Governance<Req>>,
    pub(crate) global_timeout: Duration,
    pub(crate) worker_pool: Option<Arc<dyn WorkerPool>>,
}

impl<Req, Res> Default for GraphConfig<Req, Res> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            terminal_strategy: None,
            default_governance: None,
            global_timeout: DEFAULT_GLOBAL_TIMEOUT,
            worker_pool: None,
        }
    }
}

impl<Req, Res> GraphConfig<Req, Res> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node without explicit governance. `default_governance`,
    /// if set by the time the graph compiles, will be applied to it then.
    pub fn add_node(mut self, id: impl Into<NodeId>, processor: Arc<dyn Processor<Req>>) -> Self {
        self.nodes.push(NodeEntryDef::new(id, processor));
        self
    }

    /// Register a node with explicit governance, overriding any default.
    pub fn add_node_with_governance(
        mut self,
        id: impl Into<NodeId>,
        processor: Arc<dyn Processor<Req>>,
        governance: Governance<Req>,
    ) -> Self {
        self.nodes.push(NodeEntryDef::new(id, processor).with_governance(governance));
        self
    }

    /// Declare a dependency with the default (always-true) predicate.
    pub fn add_route(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges.push(Edge::new(from, to));
        self
    }

    /// Declare a dependency gated by `predicate`.
    pub fn add_route_with_predicate(
        mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        predicate: Arc<dyn EdgePredicate<Req>>,
    ) -> Self {
        self.edges.push(Edge::new(from, to).with_predicate(predicate));
        self
    }

    pub fn terminal_strategy(mut self, strategy: Arc<dyn TerminalStrategy<Req, Res>>) -> Self {
        self.terminal_strategy = Some(strategy);
        self
    }

    pub fn default_governance(mut self, governance: Governance<Req>) -> Self {
        self.default_governance = Some(governance);
        self
    }

    pub fn global_timeout(mut self, timeout: Duration) -> Self {
        self.global_timeout = timeout;
        self
    }

    pub fn worker_pool(mut self, pool: Arc<dyn WorkerPool>) -> Self {
        self.worker_pool = Some(pool);
        self
    }

    /// Structural checks that don't require the full compiler: presence of
    /// mandatory collaborators. Called by [`crate::compiler::Compiler::compile`]
    /// before the topological pass.
    pub(crate) fn validate_structure(&self) -> DagResult<()> {
        if self.worker_pool.is_none() {
            return Err(DagError::compile("no worker pool configured"));
        }
        if self.terminal_strategy.is_none() {
            return Err(DagError::compile("no terminal strategy configured"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_worker_pool_and_terminal_strategy() {
        let cfg: GraphConfig<(), ()> = GraphConfig::new();
        assert!(cfg.validate_structure().is_err());
    }
}
