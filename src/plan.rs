//! The immutable, compiled representation produced by [`crate::compiler::Compiler`]
//! and shared across every invocation of an [`crate::engine::Engine`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::edge::edge_key;
use crate::governance::Governance;
use crate::node::NodeId;
use crate::pool::WorkerPool;
use crate::traits::{EdgePredicate, Processor, TerminalStrategy};

/// A compiled, frozen graph. Construct via [`crate::compiler::Compiler::compile`];
/// never mutated afterward. Cheaply `Arc`-shared across concurrent calls to
/// [`crate::engine::Engine::apply`].
pub struct ExecutionPlan<Req, Res> {
    pub(crate) all_nodes: Vec<NodeId>,
    /// child -> parents, in edge-insertion order.
    pub(crate) parents: HashMap<NodeId, Vec<NodeId>>,
    /// Already retry-decorated where governance called for it.
    pub(crate) processors: HashMap<NodeId, Arc<dyn Processor<Req>>>,
    pub(crate) governance: HashMap<NodeId, Governance<Req>>,
    pub(crate) edge_predicates: HashMap<String, Arc<dyn EdgePredicate<Req>>>,
    pub(crate) global_timeout: Duration,
    pub(crate) terminal_strategy: Arc<dyn TerminalStrategy<Req, Res>>,
    pub(crate) worker_pool: Arc<dyn WorkerPool>,
}

impl<Req, Res> ExecutionPlan<Req, Res> {
    pub fn parents_of(&self, node: &str) -> &[NodeId] {
        self.parents.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn predicate_for(&self, from: &str, to: &str) -> Option<&Arc<dyn EdgePredicate<Req>>> {
        self.edge_predicates.get(&edge_key(from, to))
    }

    pub fn governance_for(&self, node: &str) -> Option<&Governance<Req>> {
        self.governance.get(node)
    }

    pub fn processor_for(&self, node: &str) -> Option<&Arc<dyn Processor<Req>>> {
        self.processors.get(node)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.all_nodes
    }
}
